//! The introspection-driven client.

pub use self::builder::ClientBuilder;
mod builder;

pub use self::client::Client;
mod client;

pub use self::proxy::Proxy;
mod proxy;

pub use self::reply::Reply;
mod reply;

pub use self::signal_queue::SignalQueue;
mod signal_queue;
