use std::future::Future;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::{Message, Value};

/// A method call to be performed over a [`Connection`].
///
/// The values of the body are only checked against the signature once the
/// call is marshaled.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct MethodCall<'a> {
    /// The bus name to send the call to.
    pub destination: &'a str,
    /// The object path to call the method on.
    pub path: &'a str,
    /// The interface of the method.
    pub interface: &'a str,
    /// The name of the method.
    pub member: &'a str,
    /// The signature of the body.
    pub signature: &'a str,
    /// The arguments to the method.
    pub body: &'a [Value],
}

impl<'a> MethodCall<'a> {
    /// Construct a new method call without any arguments.
    pub fn new(destination: &'a str, path: &'a str, interface: &'a str, member: &'a str) -> Self {
        Self {
            destination,
            path,
            interface,
            member,
            signature: "",
            body: &[],
        }
    }

    /// Modify the body of the method call.
    #[must_use]
    pub fn with_body(self, signature: &'a str, body: &'a [Value]) -> Self {
        Self {
            signature,
            body,
            ..self
        }
    }

    /// Build the message for this call using the given serial.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{MethodCall, MessageType, Value};
    ///
    /// let body = [Value::from("org.example.Service")];
    ///
    /// let call = MethodCall::new(
    ///     "org.freedesktop.DBus",
    ///     "/org/freedesktop/DBus",
    ///     "org.freedesktop.DBus",
    ///     "GetNameOwner",
    /// )
    /// .with_body("s", &body);
    ///
    /// let m = call.to_message(7);
    /// assert_eq!(m.message_type(), MessageType::METHOD_CALL);
    /// assert_eq!(m.serial(), 7);
    /// assert_eq!(m.member(), Some("GetNameOwner"));
    /// assert_eq!(m.signature(), "s");
    /// ```
    pub fn to_message(&self, serial: u32) -> Message {
        Message::method_call(self.path, self.member, serial)
            .with_destination(self.destination)
            .with_interface(self.interface)
            .with_body(self.signature, self.body.to_vec())
    }
}

/// The transport a [`Client`] performs its calls over.
///
/// Implementations own the socket, authentication and the read loop. A
/// method call is a full round trip, and an error reply must be returned as
/// an error constructed through [`Error::remote`], which is what
/// [`Message::into_reply`] does.
///
/// [`Client`]: crate::Client
/// [`Error::remote`]: crate::Error::remote
pub trait Connection {
    /// The stream of inbound messages used by signal subscriptions.
    type Signals: SignalStream;

    /// Perform a method call and wait for its reply.
    fn call(&self, call: MethodCall<'_>) -> impl Future<Output = Result<Vec<Value>>>;

    /// Acquire a stream of messages received from now on.
    fn signal_queue(&self) -> Self::Signals;
}

/// A stream of inbound messages.
pub trait SignalStream {
    /// Receive the next message, or `None` if the connection has closed.
    fn recv(&mut self) -> impl Future<Output = Option<Message>>;
}

impl SignalStream for mpsc::Receiver<Message> {
    #[inline]
    fn recv(&mut self) -> impl Future<Output = Option<Message>> {
        mpsc::Receiver::recv(self)
    }
}

impl SignalStream for mpsc::UnboundedReceiver<Message> {
    #[inline]
    fn recv(&mut self) -> impl Future<Output = Option<Message>> {
        mpsc::UnboundedReceiver::recv(self)
    }
}
