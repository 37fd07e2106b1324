use std::os::fd::RawFd;

use crate::error::{Error, ErrorKind, Result};
use crate::frame::Frame;
use crate::proto::{Endianness, Type};
use crate::signature::{self, TypeNode, padding_to};
use crate::{Value, Variant};

use super::{Alloc, MAX_ARRAY_LENGTH, MAX_VARIANT_DEPTH};

/// A writer encoding values into an owned buffer.
///
/// File descriptors are collected out of band, and their index in the
/// collected list is what ends up in the buffer.
///
/// # Examples
///
/// ```
/// use xbus::{Endianness, Value, Writer};
///
/// let mut writer = Writer::with_endianness(Endianness::LITTLE);
/// writer.marshal("yu", &[Value::Byte(1), Value::Uint32(2)])?;
///
/// assert_eq!(writer.get(), &[1, 0, 0, 0, 2, 0, 0, 0]);
/// # Ok::<_, xbus::Error>(())
/// ```
pub struct Writer {
    data: Vec<u8>,
    fds: Vec<RawFd>,
    endianness: Endianness,
    depth: usize,
}

impl Writer {
    /// Construct a new writer using native endianness.
    pub fn new() -> Self {
        Self::with_endianness(Endianness::NATIVE)
    }

    /// Construct a new writer using the specified endianness.
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            data: Vec::new(),
            fds: Vec::new(),
            endianness,
            depth: 0,
        }
    }

    /// Get the endianness of the writer.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The number of bytes written.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Test if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the bytes written so far.
    #[inline]
    pub fn get(&self) -> &[u8] {
        &self.data
    }

    /// Get the file descriptors collected so far.
    #[inline]
    pub fn fds(&self) -> &[RawFd] {
        &self.fds
    }

    /// Deconstruct the writer into the written bytes and the collected file
    /// descriptors.
    #[inline]
    pub fn into_parts(self) -> (Vec<u8>, Vec<RawFd>) {
        (self.data, self.fds)
    }

    /// Pad the buffer with zeros up until the given power-of-two alignment.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::Writer;
    ///
    /// let mut writer = Writer::new();
    /// writer.align(8);
    /// assert!(writer.is_empty());
    ///
    /// writer.marshal("y", &[xbus::Value::Byte(1)])?;
    /// writer.align(8);
    /// assert_eq!(writer.len(), 8);
    /// # Ok::<_, xbus::Error>(())
    /// ```
    pub fn align(&mut self, align: usize) {
        let padding = padding_to(align, self.data.len());
        self.data.resize(self.data.len() + padding, 0);
    }

    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Align to and store a frame.
    pub(crate) fn store<T>(&mut self, value: T)
    where
        T: Frame,
    {
        self.align(T::SIZE);
        self.data
            .extend_from_slice(value.to_bytes(self.endianness).as_ref());
    }

    /// Align to and allocate space for a frame which is written later using
    /// [`Writer::store_at`].
    pub(crate) fn alloc<T>(&mut self) -> Alloc<T>
    where
        T: Frame,
    {
        self.align(T::SIZE);
        let at = self.data.len();
        self.data.resize(at + T::SIZE, 0);
        Alloc::new(at)
    }

    /// Store a frame at a previously allocated location.
    pub(crate) fn store_at<T>(&mut self, at: Alloc<T>, value: T)
    where
        T: Frame,
    {
        let at = at.into_usize();
        let bytes = value.to_bytes(self.endianness);

        if let Some(slot) = self.data.get_mut(at..at + T::SIZE) {
            slot.copy_from_slice(bytes.as_ref());
        }
    }

    pub(crate) fn write_str(&mut self, s: &str) -> Result<()> {
        let Ok(len) = u32::try_from(s.len()) else {
            return Err(Error::new(ErrorKind::ArrayTooLong(u32::MAX)));
        };

        self.store(len);
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        Ok(())
    }

    pub(crate) fn write_signature(&mut self, s: &str) -> Result<()> {
        signature::parse(s)?;
        // Signatures are at most 255 bytes once they have been parsed.
        self.store(s.len() as u8);
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        Ok(())
    }

    /// Write a single value of the given type.
    ///
    /// # Errors
    ///
    /// Errors if the shape of the value doesn't fit the type, or if a struct
    /// has the wrong number of fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Endianness, TypeNode, Value, Writer};
    ///
    /// let ty = TypeNode::parse_single("ay")?;
    /// let mut writer = Writer::with_endianness(Endianness::BIG);
    /// writer.write(&ty, &Value::Array(vec![Value::Byte(1), Value::Byte(2)]))?;
    /// assert_eq!(writer.get(), &[0, 0, 0, 2, 1, 2]);
    ///
    /// assert!(writer.write(&ty, &Value::from("nope")).is_err());
    /// # Ok::<_, xbus::Error>(())
    /// ```
    pub fn write(&mut self, ty: &TypeNode, value: &Value) -> Result<()> {
        match (ty, value) {
            (TypeNode::Basic(t), value) => self.write_basic(*t, ty, value)?,
            (TypeNode::Array(element), Value::Array(values)) => {
                self.write_array(element, values.iter(), |w, element, value| {
                    w.write(element, value)
                })?;
            }
            (TypeNode::Array(element), Value::Dict(dict)) => {
                let TypeNode::DictEntry(k, v) = &**element else {
                    return Err(mismatch(ty, value));
                };

                self.write_array(element, dict.iter(), |w, _, (key, value)| {
                    w.align(8);
                    w.write(k, key)?;
                    w.write(v, value)
                })?;
            }
            (TypeNode::Struct(fields), Value::Struct(values)) => {
                if fields.len() != values.len() {
                    return Err(Error::new(ErrorKind::ArityMismatch {
                        expected: fields.len(),
                        actual: values.len(),
                    }));
                }

                self.align(8);

                for (field, value) in fields.iter().zip(values) {
                    self.write(field, value)?;
                }
            }
            (TypeNode::DictEntry(k, v), Value::Struct(values)) => {
                let [key, value] = values.as_slice() else {
                    return Err(Error::new(ErrorKind::ArityMismatch {
                        expected: 2,
                        actual: values.len(),
                    }));
                };

                self.align(8);
                self.write(k, key)?;
                self.write(v, value)?;
            }
            (TypeNode::Variant, Value::Variant(variant)) => {
                self.write_variant(variant)?;
            }
            (ty, value) => return Err(mismatch(ty, value)),
        }

        Ok(())
    }

    fn write_basic(&mut self, t: Type, ty: &TypeNode, value: &Value) -> Result<()> {
        match (t, value) {
            (Type::BYTE, Value::Byte(v)) => self.store(*v),
            (Type::BOOLEAN, Value::Bool(v)) => self.store(u32::from(*v)),
            (Type::INT16, Value::Int16(v)) => self.store(*v),
            (Type::UINT16, Value::Uint16(v)) => self.store(*v),
            (Type::INT32, Value::Int32(v)) => self.store(*v),
            (Type::UINT32, Value::Uint32(v)) => self.store(*v),
            (Type::INT64, Value::Int64(v)) => self.store(*v),
            (Type::UINT64, Value::Uint64(v)) => self.store(*v),
            (Type::DOUBLE, Value::Double(v)) => self.store(*v),
            (Type::STRING | Type::OBJECT_PATH, Value::String(s) | Value::ObjectPath(s)) => {
                self.write_str(s)?;
            }
            (Type::SIGNATURE, Value::Signature(s) | Value::String(s)) => {
                self.write_signature(s)?;
            }
            (Type::UNIX_FD, Value::UnixFd(fd)) => {
                let index = self.fds.len() as u32;
                self.fds.push(*fd);
                self.store(index);
            }
            _ => return Err(mismatch(ty, value)),
        }

        Ok(())
    }

    /// Write an array by reserving space for its length, writing elements in
    /// place, and patching the length in afterwards. This keeps the alignment
    /// of nested elements relative to the start of the buffer.
    fn write_array<I, F>(&mut self, element: &TypeNode, values: I, mut f: F) -> Result<()>
    where
        I: IntoIterator,
        F: FnMut(&mut Self, &TypeNode, I::Item) -> Result<()>,
    {
        let len = self.alloc::<u32>();
        self.align(element.alignment());
        let start = self.data.len();

        for value in values {
            f(self, element, value)?;
        }

        let Ok(length) = u32::try_from(self.data.len() - start) else {
            return Err(Error::new(ErrorKind::ArrayTooLong(u32::MAX)));
        };

        if length > MAX_ARRAY_LENGTH {
            return Err(Error::new(ErrorKind::ArrayTooLong(length)));
        }

        self.store_at(len, length);
        Ok(())
    }

    /// Write a variant, which is its signature followed by its value.
    ///
    /// Variants nest at most as deep as a [`Reader`] accepts.
    ///
    /// [`Reader`]: crate::Reader
    pub fn write_variant(&mut self, variant: &Variant) -> Result<()> {
        if self.depth == MAX_VARIANT_DEPTH {
            return Err(Error::new(ErrorKind::VariantTooDeep));
        }

        let ty = TypeNode::parse_single(variant.signature())?;
        self.write_signature(variant.signature())?;

        self.depth += 1;
        let result = self.write(&ty, variant.value());
        self.depth -= 1;
        result
    }

    /// Parse a signature and write one value for each complete type in it.
    ///
    /// Nothing is written if an error is raised.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Value, Writer};
    ///
    /// let mut writer = Writer::new();
    ///
    /// let error = writer.marshal("uu", &[Value::Uint32(1)]).unwrap_err();
    /// assert!(error.is_arity_mismatch());
    /// assert!(writer.is_empty());
    ///
    /// let error = writer.marshal("a(", &[]).unwrap_err();
    /// assert!(error.is_signature());
    /// ```
    pub fn marshal(&mut self, signature: &str, values: &[Value]) -> Result<()> {
        let types = signature::parse(signature)?;

        if types.len() != values.len() {
            return Err(Error::new(ErrorKind::ArityMismatch {
                expected: types.len(),
                actual: values.len(),
            }));
        }

        let len = self.data.len();
        let fds = self.fds.len();

        for (ty, value) in types.iter().zip(values) {
            if let Err(error) = self.write(ty, value) {
                self.data.truncate(len);
                self.fds.truncate(fds);
                return Err(error);
            }
        }

        Ok(())
    }
}

impl Default for Writer {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch(ty: &TypeNode, value: &Value) -> Error {
    Error::new(ErrorKind::TypeMismatch {
        expected: ty.to_string().into(),
        actual: value.type_name(),
    })
}
