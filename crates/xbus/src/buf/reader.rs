use std::os::fd::RawFd;
use std::str;

use crate::error::{Error, ErrorKind, Result};
use crate::frame::Frame;
use crate::proto::{Endianness, Type};
use crate::signature::{self, TypeNode, padding_to};
use crate::{Dict, Value, Variant};

use super::{MAX_ARRAY_LENGTH, MAX_VARIANT_DEPTH};

/// A reader decoding values out of a borrowed buffer.
///
/// Alignment is computed relative to the start of the buffer, so the buffer
/// should start at an 8-byte boundary of the message it is part of.
///
/// # Examples
///
/// ```
/// use xbus::{Endianness, Reader, Value};
///
/// let data = [7, 0, 0, 0, b'f', b'o', b'o', b' ', b'b', b'a', b'r', 0];
/// let mut reader = Reader::new(&data, &[], Endianness::LITTLE);
///
/// let values = reader.unmarshal("s")?;
/// assert_eq!(values, [Value::from("foo bar")]);
/// assert!(reader.is_empty());
/// # Ok::<_, xbus::Error>(())
/// ```
pub struct Reader<'a> {
    data: &'a [u8],
    fds: &'a [RawFd],
    endianness: Endianness,
    at: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    /// Construct a new reader over `data`, where file descriptors are looked
    /// up in `fds`.
    pub fn new(data: &'a [u8], fds: &'a [RawFd], endianness: Endianness) -> Self {
        Self {
            data,
            fds,
            endianness,
            at: 0,
            depth: 0,
        }
    }

    /// Get the endianness of the reader.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.at
    }

    /// Data which has not been read yet.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.at..).unwrap_or_default()
    }

    /// Test if all data has been read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.at >= self.data.len()
    }

    /// Skip padding up until the given power-of-two alignment.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Endianness, Reader, Value};
    ///
    /// let data = [1, 0, 0, 0, 2];
    /// let mut reader = Reader::new(&data, &[], Endianness::LITTLE);
    ///
    /// assert_eq!(reader.unmarshal("y")?, [Value::Byte(1)]);
    /// reader.align(4)?;
    /// assert_eq!(reader.position(), 4);
    /// assert!(reader.align(8).is_err());
    /// # Ok::<_, xbus::Error>(())
    /// ```
    pub fn align(&mut self, align: usize) -> Result<()> {
        self.advance(padding_to(align, self.at))
    }

    pub(crate) fn advance(&mut self, n: usize) -> Result<()> {
        let at = self.at + n;

        if at > self.data.len() {
            return Err(Error::new(ErrorKind::BufferUnderflow));
        }

        self.at = at;
        Ok(())
    }

    /// Align to and load a frame.
    pub(crate) fn load<T>(&mut self) -> Result<T>
    where
        T: Frame,
    {
        self.align(T::SIZE)?;

        let Some(value) = T::load(self.remaining(), self.endianness) else {
            return Err(Error::new(ErrorKind::BufferUnderflow));
        };

        self.at += T::SIZE;
        Ok(value)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let Some(bytes) = self.data.get(self.at..self.at + len) else {
            return Err(Error::new(ErrorKind::BufferUnderflow));
        };

        self.at += len;
        Ok(bytes)
    }

    /// Read string data of the given length followed by a NUL terminator.
    fn read_terminated(&mut self, len: usize) -> Result<&'a str> {
        let bytes = self.read_bytes(len)?;

        if self.load::<u8>()? != 0 {
            return Err(Error::new(ErrorKind::NotNullTerminated));
        }

        Ok(str::from_utf8(bytes)?)
    }

    fn read_str(&mut self) -> Result<&'a str> {
        let len = self.load::<u32>()? as usize;
        self.read_terminated(len)
    }

    fn read_signature(&mut self) -> Result<&'a str> {
        let len = self.load::<u8>()? as usize;
        self.read_terminated(len)
    }

    /// Read a single value of the given type.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Endianness, Reader, TypeNode, Value};
    ///
    /// let ty = TypeNode::parse_single("(yu)")?;
    ///
    /// let data = [1, 0, 0, 0, 2, 0, 0, 0];
    /// let mut reader = Reader::new(&data, &[], Endianness::LITTLE);
    ///
    /// let value = reader.read(&ty)?;
    /// assert_eq!(value, Value::Struct(vec![Value::Byte(1), Value::Uint32(2)]));
    /// # Ok::<_, xbus::Error>(())
    /// ```
    pub fn read(&mut self, ty: &TypeNode) -> Result<Value> {
        let value = match ty {
            TypeNode::Basic(t) => self.read_basic(*t)?,
            TypeNode::Array(element) => self.read_array(element)?,
            TypeNode::Struct(fields) => {
                self.align(8)?;
                let mut values = Vec::with_capacity(fields.len());

                for field in fields.iter() {
                    values.push(self.read(field)?);
                }

                Value::Struct(values)
            }
            TypeNode::DictEntry(key, value) => {
                self.align(8)?;
                let key = self.read(key)?;
                let value = self.read(value)?;
                Value::Struct(vec![key, value])
            }
            TypeNode::Variant => Value::Variant(Box::new(self.read_variant()?)),
        };

        Ok(value)
    }

    fn read_basic(&mut self, t: Type) -> Result<Value> {
        let value = match t {
            Type::BYTE => Value::Byte(self.load()?),
            Type::BOOLEAN => match self.load::<u32>()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => return Err(Error::new(ErrorKind::InvalidBoolean(other))),
            },
            Type::INT16 => Value::Int16(self.load()?),
            Type::UINT16 => Value::Uint16(self.load()?),
            Type::INT32 => Value::Int32(self.load()?),
            Type::UINT32 => Value::Uint32(self.load()?),
            Type::INT64 => Value::Int64(self.load()?),
            Type::UINT64 => Value::Uint64(self.load()?),
            Type::DOUBLE => Value::Double(self.load()?),
            Type::STRING => Value::String(self.read_str()?.to_owned()),
            Type::OBJECT_PATH => Value::ObjectPath(self.read_str()?.to_owned()),
            Type::SIGNATURE => {
                let s = self.read_signature()?;
                signature::parse(s)?;
                Value::Signature(s.to_owned())
            }
            Type::UNIX_FD => {
                let index = self.load::<u32>()?;

                let Some(&fd) = self.fds.get(index as usize) else {
                    return Err(Error::new(ErrorKind::MissingFileDescriptor(index)));
                };

                Value::UnixFd(fd)
            }
            t => return Err(Error::new(ErrorKind::NotBasicType(t))),
        };

        Ok(value)
    }

    fn read_array(&mut self, element: &TypeNode) -> Result<Value> {
        let len = self.load::<u32>()?;

        if len > MAX_ARRAY_LENGTH {
            return Err(Error::new(ErrorKind::ArrayTooLong(len)));
        }

        // Padding to the first element is not part of the array length, and
        // is present even if the array is empty.
        self.align(element.alignment())?;

        let end = self.at + len as usize;

        if end > self.data.len() {
            return Err(Error::new(ErrorKind::BufferUnderflow));
        }

        let value = match element {
            TypeNode::DictEntry(key, value) => {
                let mut dict = Dict::new();

                while self.at < end {
                    self.align(8)?;
                    let key = self.read(key)?;
                    let value = self.read(value)?;
                    dict.insert(key, value);
                }

                Value::Dict(dict)
            }
            element => {
                let mut values = Vec::new();

                while self.at < end {
                    let at = self.at;
                    values.push(self.read(element)?);

                    // Every element must make progress towards the end.
                    if self.at == at {
                        return Err(Error::new(ErrorKind::MalformedContainer));
                    }
                }

                Value::Array(values)
            }
        };

        if self.at != end {
            return Err(Error::new(ErrorKind::MalformedContainer));
        }

        Ok(value)
    }

    /// Read a variant, which is a signature followed by a single value of
    /// that signature.
    pub fn read_variant(&mut self) -> Result<Variant> {
        if self.depth == MAX_VARIANT_DEPTH {
            return Err(Error::new(ErrorKind::VariantTooDeep));
        }

        let signature = self.read_signature()?;
        let ty = TypeNode::parse_single(signature)?;

        self.depth += 1;
        let value = self.read(&ty);
        self.depth -= 1;

        Ok(Variant::new(signature, value?))
    }

    /// Parse a signature and read one value for each complete type in it.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Endianness, Reader, Value};
    ///
    /// let data = [1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0];
    /// let mut reader = Reader::new(&data, &[], Endianness::LITTLE);
    ///
    /// let values = reader.unmarshal("bbb")?;
    /// assert_eq!(values, [Value::Bool(true), Value::Bool(false), Value::Bool(true)]);
    /// # Ok::<_, xbus::Error>(())
    /// ```
    pub fn unmarshal(&mut self, signature: &str) -> Result<Vec<Value>> {
        let types = signature::parse(signature)?;
        let mut values = Vec::with_capacity(types.len());

        for ty in types.iter() {
            values.push(self.read(ty)?);
        }

        Ok(values)
    }
}
