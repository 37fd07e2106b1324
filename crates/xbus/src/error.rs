use std::error;
use std::fmt;
use std::str::Utf8Error;

use crate::proto::{HeaderField, Type};
use crate::signature::SignatureError;

/// Result alias using an [`Error`] as the error type by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error raised by this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Self { kind }
    }

    /// Construct an error reply received from a remote peer.
    ///
    /// This is what a [`Connection`] should return when a call is answered
    /// with an error message.
    ///
    /// [`Connection`]: crate::Connection
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::Error;
    ///
    /// let error = Error::remote("org.freedesktop.DBus.Error.ServiceUnknown", "no such name");
    /// assert_eq!(error.remote_name(), Some("org.freedesktop.DBus.Error.ServiceUnknown"));
    /// assert_eq!(error.remote_message(), Some("no such name"));
    /// ```
    pub fn remote(name: impl Into<Box<str>>, message: impl Into<Box<str>>) -> Self {
        Self::new(ErrorKind::RemoteError(name.into(), message.into()))
    }

    /// The name of the remote error, if this error was raised remotely.
    pub fn remote_name(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::RemoteError(name, _) => Some(&**name),
            _ => None,
        }
    }

    /// The message of the remote error, if this error was raised remotely.
    pub fn remote_message(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::RemoteError(_, message) => Some(&**message),
            _ => None,
        }
    }

    /// Test if the error was caused by an invalid signature.
    pub fn is_signature(&self) -> bool {
        matches!(self.kind, ErrorKind::Signature(..))
    }

    /// Test if the number of values did not match the number of types in a
    /// signature.
    pub fn is_arity_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::ArityMismatch { .. })
    }

    /// Test if a value did not have the shape required by its type.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeMismatch { .. })
    }

    /// Test if decoding ran out of data.
    pub fn is_buffer_underflow(&self) -> bool {
        matches!(self.kind, ErrorKind::BufferUnderflow)
    }

    /// Test if an interface, method or property was missing from the
    /// introspection data of an object.
    pub fn is_unknown_member(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UnknownInterface(..)
                | ErrorKind::UnknownMethod(..)
                | ErrorKind::UnknownProperty(..)
        )
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<SignatureError> for Error {
    #[inline]
    fn from(error: SignatureError) -> Self {
        Self::new(ErrorKind::Signature(error))
    }
}

impl From<Utf8Error> for Error {
    #[inline]
    fn from(error: Utf8Error) -> Self {
        Self::new(ErrorKind::Utf8Error(error))
    }
}

impl From<xbus_xml::Error> for Error {
    #[inline]
    fn from(error: xbus_xml::Error) -> Self {
        Self::new(ErrorKind::Xml(error))
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ErrorKind::Signature(..) => write!(f, "Signature error"),
            ErrorKind::Utf8Error(..) => write!(f, "UTF-8 error"),
            ErrorKind::Xml(..) => write!(f, "Introspection error"),
            ErrorKind::BufferUnderflow => write!(f, "Buffer underflow"),
            ErrorKind::NotNullTerminated => write!(f, "String is not null terminated"),
            ErrorKind::InvalidBoolean(value) => {
                write!(f, "Invalid boolean value {value}, expected 0 or 1")
            }
            ErrorKind::InvalidEndianness(marker) => {
                write!(f, "Invalid endianness marker {marker:#04x}")
            }
            ErrorKind::InvalidMessageType(ty) => write!(f, "Invalid message type {ty}"),
            ErrorKind::UnsupportedVersion(version) => {
                write!(f, "Unsupported protocol version {version}")
            }
            ErrorKind::HeaderFieldTypeMismatch {
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Header field {field:?} has signature {actual:?}, expected {expected:?}"
                )
            }
            ErrorKind::ArrayTooLong(length) => {
                write!(f, "Array of length {length} is too long (max is 67108864)")
            }
            ErrorKind::BodyTooLong(length) => {
                write!(f, "Body of length {length} is too long (max is 134217728)")
            }
            ErrorKind::MalformedContainer => write!(f, "Malformed container"),
            ErrorKind::VariantTooDeep => write!(f, "Exceeded maximum variant recursion"),
            ErrorKind::ArityMismatch { expected, actual } => {
                write!(f, "Expected {expected} values, but got {actual}")
            }
            ErrorKind::TypeMismatch { expected, actual } => {
                write!(f, "Expected value of type {expected:?}, but got {actual}")
            }
            ErrorKind::MissingFileDescriptor(index) => {
                write!(f, "Missing file descriptor at index {index}")
            }
            ErrorKind::RemoteError(name, message) => write!(f, "{name}: {message}"),
            ErrorKind::MissingSignature => {
                write!(f, "Missing signature and signature inference is disabled")
            }
            ErrorKind::UnknownInterface(name) => write!(f, "Unknown interface {name}"),
            ErrorKind::UnknownMethod(name) => write!(f, "Unknown method {name}"),
            ErrorKind::UnknownProperty(name) => write!(f, "Unknown property {name}"),
            ErrorKind::UnexpectedReply => write!(f, "Unexpected reply"),
            ErrorKind::NotBasicType(t) => write!(f, "Type {t:?} is not a basic type"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Signature(error) => Some(error),
            ErrorKind::Utf8Error(error) => Some(error),
            ErrorKind::Xml(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ErrorKind {
    Signature(SignatureError),
    Utf8Error(Utf8Error),
    Xml(xbus_xml::Error),
    BufferUnderflow,
    NotNullTerminated,
    InvalidBoolean(u32),
    InvalidEndianness(u8),
    InvalidMessageType(u8),
    UnsupportedVersion(u8),
    HeaderFieldTypeMismatch {
        field: HeaderField,
        expected: &'static str,
        actual: Box<str>,
    },
    ArrayTooLong(u32),
    BodyTooLong(u32),
    MalformedContainer,
    VariantTooDeep,
    ArityMismatch {
        expected: usize,
        actual: usize,
    },
    TypeMismatch {
        expected: Box<str>,
        actual: &'static str,
    },
    MissingFileDescriptor(u32),
    RemoteError(Box<str>, Box<str>),
    MissingSignature,
    UnknownInterface(Box<str>),
    UnknownMethod(Box<str>),
    UnknownProperty(Box<str>),
    UnexpectedReply,
    NotBasicType(Type),
}
