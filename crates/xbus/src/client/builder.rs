use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::Result;
use crate::{Client, Connection, Schema};

/// Builder of a [`Client`].
pub struct ClientBuilder {
    preload: Vec<(Box<str>, Box<str>, String)>,
    infer_signatures: bool,
}

impl ClientBuilder {
    /// Construct a new [`ClientBuilder`] with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::ClientBuilder;
    ///
    /// let c = ClientBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            preload: Vec::new(),
            infer_signatures: true,
        }
    }

    /// Seed the introspection cache of the client with a document describing
    /// the object at `path` owned by `name`.
    ///
    /// The object will never be introspected over the connection. The
    /// document is parsed once the client is built.
    pub fn preload(
        &mut self,
        name: impl Into<Box<str>>,
        path: impl Into<Box<str>>,
        xml: impl Into<String>,
    ) -> &mut Self {
        self.preload.push((name.into(), path.into(), xml.into()));
        self
    }

    /// Whether method calls without an explicit signature should look up the
    /// signature through introspection (default), or fail.
    pub fn infer_signatures(&mut self, infer_signatures: bool) -> &mut Self {
        self.infer_signatures = infer_signatures;
        self
    }

    /// Construct a [`Client`] over the given connection with the current
    /// configuration.
    ///
    /// # Errors
    ///
    /// Errors if any preloaded document is not valid introspection data.
    pub fn build<C>(&self, connection: C) -> Result<Client<C>>
    where
        C: Connection,
    {
        let mut cache = HashMap::with_capacity(self.preload.len());

        for (name, path, xml) in &self.preload {
            let schema = Arc::new(Schema::from_xml(xml)?);
            let cell = Arc::new(OnceCell::new_with(Some(schema)));
            cache.insert((name.clone(), path.clone()), cell);
        }

        Ok(Client::from_parts(
            connection,
            self.infer_signatures,
            cache,
        ))
    }
}

impl Default for ClientBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
