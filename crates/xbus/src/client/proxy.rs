use std::sync::Arc;

use crate::error::Result;
use crate::{Client, Connection, Dict, Reply, Schema, SignalQueue, Value};

/// A handle to a single interface on an object.
///
/// Constructed through [`Client::proxy`] or [`Client::bus`], and forwards all
/// calls to the client it was created from.
pub struct Proxy<'a, C> {
    client: &'a Client<C>,
    name: Box<str>,
    path: Box<str>,
    interface: Box<str>,
}

impl<'a, C> Proxy<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: &str, path: &str, interface: &str) -> Self {
        Self {
            client,
            name: name.into(),
            path: path.into(),
            interface: interface.into(),
        }
    }

    /// The bus name of the object.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path of the object.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The interface this proxy calls.
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl<C> Proxy<'_, C>
where
    C: Connection,
{
    /// See [`Client::introspect`].
    pub async fn introspect(&self) -> Result<Arc<Schema>> {
        self.client.introspect(&self.name, &self.path).await
    }

    /// See [`Client::call`].
    pub async fn call(
        &self,
        method: &str,
        params: &[Value],
        signature: Option<&str>,
    ) -> Result<Reply> {
        self.client
            .call(
                &self.name,
                &self.path,
                &self.interface,
                method,
                params,
                signature,
            )
            .await
    }

    /// See [`Client::get_property`].
    pub async fn get_property(&self, property: &str) -> Result<Value> {
        self.client
            .get_property(&self.name, &self.path, &self.interface, property)
            .await
    }

    /// See [`Client::set_property`].
    pub async fn set_property(&self, property: &str, value: Value) -> Result<()> {
        self.client
            .set_property(&self.name, &self.path, &self.interface, property, value)
            .await
    }

    /// See [`Client::get_all_properties`].
    pub async fn get_all_properties(&self) -> Result<Dict> {
        self.client
            .get_all_properties(&self.name, &self.path, &self.interface)
            .await
    }

    /// See [`Client::subscribe_signal`].
    pub async fn subscribe_signal<T, F>(&self, signal: &str, body: F) -> Result<T>
    where
        F: AsyncFnOnce(&mut SignalQueue<C::Signals>) -> Result<T>,
    {
        self.client
            .subscribe_signal(&self.name, &self.path, &self.interface, signal, body)
            .await
    }
}
