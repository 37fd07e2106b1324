//! Core types for the D-Bus protocol.
//!
//! This is split up into a separate crate so that the signature grammar can be
//! shared between the introspection parser and the marshaling engine.

#![allow(clippy::module_inception)]

#[macro_use]
mod macros;

pub mod proto;

pub mod signature;
