use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::org_freedesktop_dbus::{
    self as bus, INTROSPECTABLE, NameFlag, NameReply, PROPERTIES, ReleaseNameReply,
};
use crate::{
    ClientBuilder, Connection, Dict, MethodCall, Proxy, Reply, Schema, SignalQueue, Value, Variant,
};

type Cache = HashMap<(Box<str>, Box<str>), Arc<OnceCell<Arc<Schema>>>>;

/// A D-Bus client performing calls over a [`Connection`].
///
/// Signatures of method calls are inferred through introspection unless
/// they are provided, and the introspection data of each object is fetched
/// once and then cached for the lifetime of the client.
///
/// # Examples
///
/// ```
/// use xbus::{Client, Connection, Message, MethodCall, Reply, Result, Value};
/// use tokio::sync::mpsc;
///
/// struct Echo;
///
/// impl Connection for Echo {
///     type Signals = mpsc::UnboundedReceiver<Message>;
///
///     async fn call(&self, call: MethodCall<'_>) -> Result<Vec<Value>> {
///         Ok(call.body.to_vec())
///     }
///
///     fn signal_queue(&self) -> Self::Signals {
///         mpsc::unbounded_channel().1
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")] async fn main() -> Result<()> {
/// let client = Client::new(Echo);
///
/// let reply = client
///     .call("org.example", "/", "org.example.Echo", "Echo", &[Value::from("hi")], Some("s"))
///     .await?;
///
/// assert_eq!(reply, Reply::Single(Value::from("hi")));
/// # Ok(()) }
/// ```
pub struct Client<C> {
    connection: C,
    infer_signatures: bool,
    cache: Mutex<Cache>,
}

impl<C> Client<C>
where
    C: Connection,
{
    /// Construct a new client with the default configuration.
    ///
    /// See [`ClientBuilder`] to configure the client.
    pub fn new(connection: C) -> Self {
        Self::from_parts(connection, true, HashMap::new())
    }

    /// Construct a [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(super) fn from_parts(connection: C, infer_signatures: bool, cache: Cache) -> Self {
        Self {
            connection,
            infer_signatures,
            cache: Mutex::new(cache),
        }
    }

    /// Access the underlying connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Construct a proxy for an interface on an object.
    pub fn proxy(&self, name: &str, path: &str, interface: &str) -> Proxy<'_, C> {
        Proxy::new(self, name, path, interface)
    }

    /// Construct a proxy for the bus itself.
    pub fn bus(&self) -> Proxy<'_, C> {
        Proxy::new(self, bus::DESTINATION, bus::PATH, bus::INTERFACE)
    }

    /// Get the introspection data for the object at `path` owned by `name`.
    ///
    /// The first call for an object fetches and caches the data, and any
    /// calls for the same object made while that is in progress wait for it
    /// to complete. If fetching fails, a later call will try again.
    pub async fn introspect(&self, name: &str, path: &str) -> Result<Arc<Schema>> {
        let cell = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.entry((name.into(), path.into())).or_default().clone()
        };

        let schema = cell
            .get_or_try_init(|| async {
                debug!(destination = name, path, "introspecting");

                let call = MethodCall::new(name, path, INTROSPECTABLE, "Introspect");
                let values = self.send(call).await?;

                let Some(Value::String(xml)) = values.first() else {
                    return Err(Error::new(ErrorKind::UnexpectedReply));
                };

                Ok::<_, Error>(Arc::new(Schema::from_xml(xml)?))
            })
            .await?;

        Ok(schema.clone())
    }

    /// Call a method.
    ///
    /// If `signature` is `None` it is inferred from the introspected input
    /// arguments of the method.
    ///
    /// # Errors
    ///
    /// Errors if the signature could not be inferred, if the parameters don't
    /// match the signature, or if the remote side responded with an error.
    pub async fn call(
        &self,
        name: &str,
        path: &str,
        interface: &str,
        method: &str,
        params: &[Value],
        signature: Option<&str>,
    ) -> Result<Reply> {
        let schema;

        let signature = match signature {
            Some(signature) => signature,
            None => {
                if !self.infer_signatures {
                    return Err(Error::new(ErrorKind::MissingSignature));
                }

                schema = self.introspect(name, path).await?;

                let Some(i) = schema.interface(interface) else {
                    return Err(Error::new(ErrorKind::UnknownInterface(interface.into())));
                };

                let Some(m) = i.method(method) else {
                    return Err(Error::new(ErrorKind::UnknownMethod(method.into())));
                };

                m.input_signature()
            }
        };

        let call = MethodCall::new(name, path, interface, method).with_body(signature, params);
        let values = self.send(call).await?;
        Ok(Reply::from(values))
    }

    /// Get the value of a property.
    pub async fn get_property(
        &self,
        name: &str,
        path: &str,
        interface: &str,
        property: &str,
    ) -> Result<Value> {
        let body = [Value::from(interface), Value::from(property)];
        let call = MethodCall::new(name, path, PROPERTIES, "Get").with_body("ss", &body);

        let Ok([Value::Variant(variant)]) = <[Value; 1]>::try_from(self.send(call).await?) else {
            return Err(Error::new(ErrorKind::UnexpectedReply));
        };

        Ok(variant.into_value())
    }

    /// Set the value of a property.
    ///
    /// The type of the value is taken from the introspection data of the
    /// object.
    pub async fn set_property(
        &self,
        name: &str,
        path: &str,
        interface: &str,
        property: &str,
        value: Value,
    ) -> Result<()> {
        let schema = self.introspect(name, path).await?;

        let Some(i) = schema.interface(interface) else {
            return Err(Error::new(ErrorKind::UnknownInterface(interface.into())));
        };

        let Some(p) = i.property(property) else {
            return Err(Error::new(ErrorKind::UnknownProperty(property.into())));
        };

        let value = Variant::new(p.ty().to_string(), value);
        let body = [Value::from(interface), Value::from(property), Value::from(value)];
        let call = MethodCall::new(name, path, PROPERTIES, "Set").with_body("ssv", &body);
        self.send(call).await?;
        Ok(())
    }

    /// Get the values of all properties of an interface.
    pub async fn get_all_properties(
        &self,
        name: &str,
        path: &str,
        interface: &str,
    ) -> Result<Dict> {
        let body = [Value::from(interface)];
        let call = MethodCall::new(name, path, PROPERTIES, "GetAll").with_body("s", &body);

        let Ok([Value::Dict(dict)]) = <[Value; 1]>::try_from(self.send(call).await?) else {
            return Err(Error::new(ErrorKind::UnexpectedReply));
        };

        Ok(dict)
    }

    /// Get the unique name of the connection owning a well-known name.
    pub async fn get_name_owner(&self, name: &str) -> Result<String> {
        let body = [Value::from(name)];

        let Ok([Value::String(owner)]) =
            <[Value; 1]>::try_from(self.bus_call("GetNameOwner", "s", &body).await?)
        else {
            return Err(Error::new(ErrorKind::UnexpectedReply));
        };

        Ok(owner)
    }

    /// Register a match rule with the bus.
    pub async fn add_match(&self, rule: &str) -> Result<()> {
        debug!(rule, "adding match");
        self.bus_call("AddMatch", "s", &[Value::from(rule)]).await?;
        Ok(())
    }

    /// Remove a match rule previously registered with the bus.
    pub async fn remove_match(&self, rule: &str) -> Result<()> {
        debug!(rule, "removing match");
        self.bus_call("RemoveMatch", "s", &[Value::from(rule)]).await?;
        Ok(())
    }

    /// Receive signals emitted by an object for the duration of `body`.
    ///
    /// A well-known `name` is resolved to the unique name of its owner,
    /// since that is what the bus uses as the sender of signals. A match
    /// rule is registered with the bus before `body` is called, and removed
    /// once it completes regardless of whether it succeeded or not.
    ///
    /// # Errors
    ///
    /// Errors if the subscription could not be set up or torn down, or if
    /// `body` errors. An error from `body` takes precedence over an error
    /// removing the match rule.
    ///
    /// # Cancellation
    ///
    /// The match rule is removed by a method call made after `body` returns.
    /// If the returned future is dropped before then, or `body` panics, the
    /// rule stays registered with the bus until the connection closes. It can
    /// be removed manually with [`Client::remove_match`] using the rule of the
    /// [`SignalQueue`].
    pub async fn subscribe_signal<T, F>(
        &self,
        name: &str,
        path: &str,
        interface: &str,
        signal: &str,
        body: F,
    ) -> Result<T>
    where
        F: AsyncFnOnce(&mut SignalQueue<C::Signals>) -> Result<T>,
    {
        let sender = if name.starts_with(':') {
            name.to_owned()
        } else {
            self.get_name_owner(name).await?
        };

        // Acquired before the rule is added so no matching signal is missed.
        let mut queue = SignalQueue::new(
            self.connection.signal_queue(),
            &sender,
            path,
            interface,
            signal,
        );

        let rule = queue.rule();
        self.add_match(&rule).await?;

        let result = body(&mut queue).await;
        let removed = self.remove_match(&rule).await;

        match (result, removed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(..), Err(error)) => Err(error),
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(remove_error)) => {
                warn!(rule, error = %remove_error, "failed to remove match");
                Err(error)
            }
        }
    }

    /// Request ownership of a well-known name.
    pub async fn request_name(&self, name: &str, flags: NameFlag) -> Result<NameReply> {
        let body = [Value::from(name), Value::Uint32(flags.get())];

        let Ok([Value::Uint32(reply)]) =
            <[Value; 1]>::try_from(self.bus_call("RequestName", "su", &body).await?)
        else {
            return Err(Error::new(ErrorKind::UnexpectedReply));
        };

        Ok(NameReply::new(reply))
    }

    /// Release ownership of a well-known name.
    pub async fn release_name(&self, name: &str) -> Result<ReleaseNameReply> {
        let body = [Value::from(name)];

        let Ok([Value::Uint32(reply)]) =
            <[Value; 1]>::try_from(self.bus_call("ReleaseName", "s", &body).await?)
        else {
            return Err(Error::new(ErrorKind::UnexpectedReply));
        };

        Ok(ReleaseNameReply::new(reply))
    }

    async fn bus_call(&self, member: &str, signature: &str, body: &[Value]) -> Result<Vec<Value>> {
        let call = MethodCall::new(bus::DESTINATION, bus::PATH, bus::INTERFACE, member)
            .with_body(signature, body);

        self.send(call).await
    }

    async fn send(&self, call: MethodCall<'_>) -> Result<Vec<Value>> {
        debug!(
            destination = call.destination,
            path = call.path,
            interface = call.interface,
            member = call.member,
            signature = call.signature,
            "calling"
        );

        self.connection.call(call).await
    }
}
