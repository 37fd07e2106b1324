#[cfg(test)]
mod tests;

pub use self::message::Message;
mod message;
