use std::mem::size_of;

use crate::proto::Endianness;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A fixed-size number which can be stored and loaded from a buffer in either
/// byte order.
///
/// Every frame is aligned to its own size on the wire.
pub(crate) trait Frame: self::sealed::Sealed + Copy {
    /// The size and alignment of the frame.
    const SIZE: usize;

    /// The byte representation of the frame.
    type Bytes: AsRef<[u8]>;

    /// Load the frame from the start of `bytes`, returning `None` if there is
    /// not enough data.
    fn load(bytes: &[u8], endianness: Endianness) -> Option<Self>;

    /// Convert the frame into bytes using the given byte order.
    fn to_bytes(self, endianness: Endianness) -> Self::Bytes;
}

macro_rules! impl_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl self::sealed::Sealed for $ty {}

            impl Frame for $ty {
                const SIZE: usize = size_of::<$ty>();

                type Bytes = [u8; size_of::<$ty>()];

                #[inline]
                fn load(bytes: &[u8], endianness: Endianness) -> Option<Self> {
                    let bytes: Self::Bytes = bytes.get(..Self::SIZE)?.try_into().ok()?;

                    Some(match endianness {
                        Endianness::BIG => <$ty>::from_be_bytes(bytes),
                        _ => <$ty>::from_le_bytes(bytes),
                    })
                }

                #[inline]
                fn to_bytes(self, endianness: Endianness) -> Self::Bytes {
                    match endianness {
                        Endianness::BIG => self.to_be_bytes(),
                        _ => self.to_le_bytes(),
                    }
                }
            }
        )*
    }
}

impl_number!(u8, i16, u16, i32, u32, i64, u64, f64);
