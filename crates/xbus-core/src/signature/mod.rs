//! The D-Bus type signature grammar.

#[cfg(test)]
mod tests;

pub use self::parser::parse;
mod parser;

pub use self::type_node::TypeNode;
mod type_node;

pub use self::signature_error::{SignatureError, SignatureErrorKind};
mod signature_error;

/// The maximum size of a signature.
pub const MAX_SIGNATURE: usize = 255;

/// The maximum individual container depth.
pub const MAX_CONTAINER_DEPTH: usize = 32;

/// Calculate padding with the assumption that alignment is a power of two.
///
/// # Examples
///
/// ```
/// use xbus_core::signature::padding_to;
///
/// assert_eq!(padding_to(8, 13), 3);
/// assert_eq!(padding_to(4, 8), 0);
/// assert_eq!(padding_to(1, 7), 0);
/// ```
#[inline(always)]
pub const fn padding_to(align: usize, len: usize) -> usize {
    let mask = align - 1;
    (align - (len & mask)) & mask
}
