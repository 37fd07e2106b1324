use std::fmt;

use crate::proto::Type;

use super::{SignatureError, SignatureErrorKind, parse};

/// A single complete type parsed from a signature.
///
/// # Examples
///
/// ```
/// use xbus_core::proto::Type;
/// use xbus_core::signature::TypeNode;
///
/// let node = TypeNode::parse_single("a(us)")?;
///
/// let TypeNode::Array(element) = &node else {
///     panic!("expected array");
/// };
///
/// assert_eq!(element.alignment(), 8);
/// assert_eq!(node.alignment(), 4);
/// assert_eq!(node.to_string(), "a(us)");
/// # Ok::<_, xbus_core::signature::SignatureError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// A basic type such as an integer or a string.
    Basic(Type),
    /// An array of the given element type.
    Array(Box<TypeNode>),
    /// A struct with the given fields.
    Struct(Box<[TypeNode]>),
    /// A dict entry with a basic key and a value. Only valid as the element
    /// type of an array.
    DictEntry(Box<TypeNode>, Box<TypeNode>),
    /// A variant, which carries its own signature on the wire.
    Variant,
}

impl TypeNode {
    /// Parse a signature which must contain exactly one complete type.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus_core::signature::TypeNode;
    ///
    /// assert!(TypeNode::parse_single("a{sv}").is_ok());
    /// assert!(TypeNode::parse_single("").is_err());
    /// assert!(TypeNode::parse_single("ss").is_err());
    /// ```
    pub fn parse_single(signature: &str) -> Result<Self, SignatureError> {
        let types = Vec::from(parse(signature)?);
        let count = types.len();

        let Ok([node]) = <[TypeNode; 1]>::try_from(types) else {
            return Err(SignatureError::new(SignatureErrorKind::ExpectedSingleType(
                count,
            )));
        };

        Ok(node)
    }

    /// The alignment in bytes which values of this type start at.
    pub fn alignment(&self) -> usize {
        match self {
            TypeNode::Basic(t) => t.alignment(),
            TypeNode::Array(..) => 4,
            TypeNode::Struct(..) | TypeNode::DictEntry(..) => 8,
            TypeNode::Variant => 1,
        }
    }

    /// Test if the type is basic.
    #[inline]
    pub fn is_basic(&self) -> bool {
        matches!(self, TypeNode::Basic(..))
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Basic(t) => write!(f, "{}", char::from(t.get())),
            TypeNode::Array(element) => write!(f, "a{element}"),
            TypeNode::Struct(fields) => {
                write!(f, "(")?;

                for field in fields.iter() {
                    field.fmt(f)?;
                }

                write!(f, ")")
            }
            TypeNode::DictEntry(key, value) => write!(f, "{{{key}{value}}}"),
            TypeNode::Variant => write!(f, "v"),
        }
    }
}
