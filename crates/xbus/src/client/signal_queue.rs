use tracing::trace;

use crate::proto::MessageType;
use crate::{Message, SignalStream, Value};

/// A queue of signals matching a single subscription.
///
/// Only available inside of the closure passed to
/// [`Client::subscribe_signal`], while the match rule is registered with the
/// bus.
///
/// [`Client::subscribe_signal`]: crate::Client::subscribe_signal
pub struct SignalQueue<S> {
    stream: S,
    sender: Box<str>,
    path: Box<str>,
    interface: Box<str>,
    member: Box<str>,
}

impl<S> SignalQueue<S> {
    pub(crate) fn new(stream: S, sender: &str, path: &str, interface: &str, member: &str) -> Self {
        Self {
            stream,
            sender: sender.into(),
            path: path.into(),
            interface: interface.into(),
            member: member.into(),
        }
    }

    /// The unique name of the connection signals are accepted from.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// The object path signals are accepted from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The interface of the signal.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// The name of the signal.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The match rule registered with the bus for this queue.
    pub fn rule(&self) -> String {
        format!(
            "type='signal',sender='{}',path='{}',interface='{}',member='{}'",
            self.sender, self.path, self.interface, self.member
        )
    }

    fn matches(&self, message: &Message) -> bool {
        message.message_type() == MessageType::SIGNAL
            && message.sender() == Some(&*self.sender)
            && message.path() == Some(&*self.path)
            && message.interface() == Some(&*self.interface)
            && message.member() == Some(&*self.member)
    }
}

impl<S> SignalQueue<S>
where
    S: SignalStream,
{
    /// Wait for the next matching signal and return its arguments.
    ///
    /// Other messages received in the meantime are discarded. Returns `None`
    /// once the connection has closed.
    pub async fn next(&mut self) -> Option<Vec<Value>> {
        loop {
            let message = self.stream.recv().await?;

            if self.matches(&message) {
                return Some(message.into_body());
            }

            trace!(
                message_type = ?message.message_type(),
                sender = message.sender(),
                member = message.member(),
                "dropping message"
            );
        }
    }
}
