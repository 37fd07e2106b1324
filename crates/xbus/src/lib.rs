//! D-Bus marshaling and an introspection-driven client.
//!
//! This crate does not speak to a socket by itself. It encodes and decodes
//! complete [`Message`] buffers, and builds the client protocol on top of any
//! [`Connection`] which can perform a method call round trip and hand out a
//! stream of inbound messages.
//!
//! # Examples
//!
//! ```
//! use xbus::{Message, Value};
//!
//! let message = Message::method_call("/org/freedesktop/DBus", "Hello", 1)
//!     .with_destination("org.freedesktop.DBus")
//!     .with_interface("org.freedesktop.DBus");
//!
//! let (bytes, fds) = message.marshal()?;
//! assert!(fds.is_empty());
//!
//! let (decoded, tail, _) = Message::unmarshal(&bytes, &[])?;
//! assert_eq!(decoded, message);
//! assert!(tail.is_empty());
//!
//! let message = Message::signal("/org/example", "org.example.Counter", "Changed", 2)
//!     .with_body("u", vec![Value::Uint32(42)]);
//!
//! let (bytes, _) = message.marshal()?;
//! let (decoded, _, _) = Message::unmarshal(&bytes, &[])?;
//! assert_eq!(decoded.body(), &[Value::Uint32(42)]);
//! # Ok::<_, xbus::Error>(())
//! ```

#![allow(clippy::module_inception)]

#[doc(inline)]
pub use xbus_core::proto;
#[doc(inline)]
pub use xbus_core::signature;

#[doc(inline)]
pub use self::proto::{Endianness, Flags, HeaderField, MessageType};

#[doc(inline)]
pub use self::signature::{SignatureError, TypeNode};

pub use self::error::{Error, Result};
mod error;

mod frame;

pub use self::buf::{Reader, Writer};
pub mod buf;

pub use self::value::{Dict, Value, Variant};
mod value;

pub use self::message::Message;
mod message;

pub use self::connection::{Connection, MethodCall, SignalStream};
mod connection;

pub use self::schema::{
    Access, ArgumentSchema, InterfaceSchema, MethodSchema, PropertySchema, Schema, SignalSchema,
};
mod schema;

pub use self::client::{Client, ClientBuilder, Proxy, Reply, SignalQueue};
mod client;

pub mod org_freedesktop_dbus;
