//! Reading and writing values in the D-Bus wire format.


pub use self::reader::Reader;
mod reader;

pub use self::writer::Writer;
mod writer;

use std::marker::PhantomData;

/// The maximum length of an array in bytes.
pub(crate) const MAX_ARRAY_LENGTH: u32 = 1u32 << 26;

/// The maximum length of a body in bytes.
pub(crate) const MAX_BODY_LENGTH: u32 = 1u32 << 27;

/// The maximum number of variants nested inside of each other.
pub(crate) const MAX_VARIANT_DEPTH: usize = 64;

/// An allocated location in the buffer that can be written to later.
pub(crate) struct Alloc<T>(usize, PhantomData<T>);

impl<T> Alloc<T> {
    #[inline]
    pub(crate) fn new(at: usize) -> Self {
        Self(at, PhantomData)
    }

    #[inline]
    pub(crate) fn into_usize(self) -> usize {
        self.0
    }
}

impl<T> Clone for Alloc<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Alloc<T> {}
