//! Dynamically typed values.

pub use self::dict::Dict;
mod dict;

pub use self::variant::Variant;
mod variant;

use std::os::fd::RawFd;

/// A dynamically typed D-Bus value.
///
/// The shape of a value is checked against a [`TypeNode`] when it is written,
/// so for example both [`Value::String`] and [`Value::ObjectPath`] can be
/// written where the type is a string or an object path.
///
/// [`TypeNode`]: crate::TypeNode
///
/// # Examples
///
/// ```
/// use xbus::{Dict, Value};
///
/// let value = Value::from("hello");
/// assert_eq!(value.as_str(), Some("hello"));
///
/// let mut dict = Dict::new();
/// dict.insert(Value::from("answer"), Value::from(42u32));
/// let value = Value::from(dict);
/// assert_eq!(value.type_name(), "dict");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `y`
    Byte(u8),
    /// `b`
    Bool(bool),
    /// `n`
    Int16(i16),
    /// `q`
    Uint16(u16),
    /// `i`
    Int32(i32),
    /// `u`
    Uint32(u32),
    /// `x`
    Int64(i64),
    /// `t`
    Uint64(u64),
    /// `d`
    Double(f64),
    /// `s`
    String(String),
    /// `o`
    ObjectPath(String),
    /// `g`
    Signature(String),
    /// `h`, the file descriptor itself rather than its index in the message.
    UnixFd(RawFd),
    /// An array of values which all share the same type.
    Array(Vec<Value>),
    /// An array of dict entries.
    Dict(Dict),
    /// A struct or a dict entry outside of a dict.
    Struct(Vec<Value>),
    /// A value carrying its own signature.
    Variant(Box<Variant>),
}

impl Value {
    /// A short human readable name of the kind of value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Byte(..) => "byte",
            Value::Bool(..) => "boolean",
            Value::Int16(..) => "int16",
            Value::Uint16(..) => "uint16",
            Value::Int32(..) => "int32",
            Value::Uint32(..) => "uint32",
            Value::Int64(..) => "int64",
            Value::Uint64(..) => "uint64",
            Value::Double(..) => "double",
            Value::String(..) => "string",
            Value::ObjectPath(..) => "object path",
            Value::Signature(..) => "signature",
            Value::UnixFd(..) => "unix fd",
            Value::Array(..) => "array",
            Value::Dict(..) => "dict",
            Value::Struct(..) => "struct",
            Value::Variant(..) => "variant",
        }
    }

    /// Access the value as a string slice if it is a string, object path or
    /// signature.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::ObjectPath(s) | Value::Signature(s) => Some(s),
            _ => None,
        }
    }

    /// Access the value as an unsigned 32-bit integer.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::Uint32(n) => Some(n),
            _ => None,
        }
    }

    /// Access the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Access the value as a variant.
    pub fn as_variant(&self) -> Option<&Variant> {
        match self {
            Value::Variant(variant) => Some(variant),
            _ => None,
        }
    }

    /// Access the value as a dict.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl PartialEq<str> for Value {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

macro_rules! impl_from {
    ($($ty:ty, $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    }
}

impl_from! {
    u8, Byte,
    bool, Bool,
    i16, Int16,
    u16, Uint16,
    i32, Int32,
    u32, Uint32,
    i64, Int64,
    u64, Uint64,
    f64, Double,
    String, String,
    Dict, Dict,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<Variant> for Value {
    #[inline]
    fn from(value: Variant) -> Self {
        Value::Variant(Box::new(value))
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}
