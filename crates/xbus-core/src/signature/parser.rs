use crate::proto::Type;

use super::{MAX_CONTAINER_DEPTH, MAX_SIGNATURE, SignatureError, SignatureErrorKind, TypeNode};

use SignatureErrorKind::*;

/// Parse a signature into the sequence of complete types it describes.
///
/// The whole signature must be consumed for parsing to succeed.
///
/// # Examples
///
/// ```
/// use xbus_core::proto::Type;
/// use xbus_core::signature::{parse, TypeNode};
///
/// let types = parse("sa{sv}")?;
///
/// assert_eq!(types.len(), 2);
/// assert_eq!(types[0], TypeNode::Basic(Type::STRING));
/// assert_eq!(types[1].to_string(), "a{sv}");
///
/// assert!(parse("a(").is_err());
/// assert!(parse("a()").is_err());
/// assert!(parse("a{yyy}").is_err());
/// assert!(parse("X").is_err());
/// # Ok::<_, xbus_core::signature::SignatureError>(())
/// ```
pub fn parse(signature: &str) -> Result<Box<[TypeNode]>, SignatureError> {
    let bytes = signature.as_bytes();

    if bytes.len() > MAX_SIGNATURE {
        return Err(SignatureError::new(SignatureTooLong));
    }

    let mut parser = Parser {
        bytes,
        arrays: 0,
        structs: 0,
    };

    let mut types = Vec::new();

    while let Some(b) = parser.next() {
        types.push(parser.parse_type(b)?);
    }

    Ok(types.into())
}

struct Parser<'a> {
    bytes: &'a [u8],
    arrays: usize,
    structs: usize,
}

impl Parser<'_> {
    #[inline]
    fn next(&mut self) -> Option<u8> {
        let (&b, rest) = self.bytes.split_first()?;
        self.bytes = rest;
        Some(b)
    }

    /// Parse a single complete type starting with the already consumed type
    /// code `b`.
    fn parse_type(&mut self, b: u8) -> Result<TypeNode, SignatureError> {
        let t = Type::new(b);

        let node = match t {
            Type::VARIANT => TypeNode::Variant,
            Type::ARRAY => self.parse_array()?,
            Type::OPEN_PAREN => self.parse_struct()?,
            Type::CLOSE_PAREN => return Err(SignatureError::new(StructEndedButNotStarted)),
            Type::OPEN_BRACE => return Err(SignatureError::new(DictEntryNotInsideArray)),
            Type::CLOSE_BRACE => return Err(SignatureError::new(DictEndedButNotStarted)),
            t if t.is_basic() => TypeNode::Basic(t),
            t => return Err(SignatureError::new(UnknownTypeCode(t))),
        };

        Ok(node)
    }

    fn parse_array(&mut self) -> Result<TypeNode, SignatureError> {
        if self.arrays == MAX_CONTAINER_DEPTH {
            return Err(SignatureError::new(ExceededMaximumArrayRecursion));
        }

        self.arrays += 1;

        let element = match self.next().map(Type::new) {
            None | Some(Type::CLOSE_PAREN | Type::CLOSE_BRACE) => {
                return Err(SignatureError::new(MissingArrayElementType));
            }
            Some(Type::OPEN_BRACE) => self.parse_dict_entry()?,
            Some(t) => self.parse_type(t.get())?,
        };

        self.arrays -= 1;
        Ok(TypeNode::Array(Box::new(element)))
    }

    fn parse_struct(&mut self) -> Result<TypeNode, SignatureError> {
        if self.structs == MAX_CONTAINER_DEPTH {
            return Err(SignatureError::new(ExceededMaximumStructRecursion));
        }

        self.structs += 1;

        let mut fields = Vec::new();

        loop {
            match self.next() {
                None => return Err(SignatureError::new(StructStartedButNotEnded)),
                Some(b')') => break,
                Some(b) => fields.push(self.parse_type(b)?),
            }
        }

        if fields.is_empty() {
            return Err(SignatureError::new(StructHasNoFields));
        }

        self.structs -= 1;
        Ok(TypeNode::Struct(fields.into()))
    }

    fn parse_dict_entry(&mut self) -> Result<TypeNode, SignatureError> {
        let key = match self.next() {
            None => return Err(SignatureError::new(DictStartedButNotEnded)),
            Some(b'}') => return Err(SignatureError::new(DictEntryHasNoFields)),
            Some(b) => self.parse_type(b)?,
        };

        if !matches!(key, TypeNode::Basic(..)) {
            return Err(SignatureError::new(DictKeyMustBeBasicType));
        }

        let value = match self.next() {
            None => return Err(SignatureError::new(DictStartedButNotEnded)),
            Some(b'}') => return Err(SignatureError::new(DictEntryHasOnlyOneField)),
            Some(b) => self.parse_type(b)?,
        };

        match self.next() {
            None => Err(SignatureError::new(DictStartedButNotEnded)),
            Some(b'}') => Ok(TypeNode::DictEntry(Box::new(key), Box::new(value))),
            Some(..) => Err(SignatureError::new(DictEntryHasTooManyFields)),
        }
    }
}
