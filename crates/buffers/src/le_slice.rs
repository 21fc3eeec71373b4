//! Typed views over little-endian byte slices.

use std::fmt;
use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width scalar that can be decoded from little-endian bytes at any
/// alignment.
///
/// Sealed: implemented for `u8`, `u16`, `u32`, `u64`, `f32` and `f64` only.
pub trait LeScalar: sealed::Sealed + Copy + 'static {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Decodes a value from the first `WIDTH` bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than `WIDTH`.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Decodes a value from `WIDTH` bytes starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `WIDTH` bytes. No alignment is required.
    unsafe fn read_le(ptr: *const u8) -> Self;

    /// Appends the little-endian encoding of `self` to `out`.
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! le_scalar {
    ($($ty:ty),*) => {$(
        impl sealed::Sealed for $ty {}

        impl LeScalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::WIDTH]);
                <$ty>::from_le_bytes(raw)
            }

            #[inline]
            unsafe fn read_le(ptr: *const u8) -> Self {
                <$ty>::from_le_bytes(ptr.cast::<[u8; std::mem::size_of::<$ty>()]>().read_unaligned())
            }

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    )*};
}

le_scalar!(u8, u16, u32, u64, f32, f64);

/// A read-only, non-owning array of `T` stored little-endian in a byte slice.
///
/// The view never copies and makes no alignment assumptions, so it can sit
/// directly on top of a serialized buffer. The element count is
/// `bytes.len() / T::WIDTH`; trailing bytes that do not form a whole element
/// are kept in [`byte_len`](Self::byte_len) but are not addressable.
///
/// # Example
///
/// ```
/// use tree_ensemble_buffers::LeSlice;
///
/// let bytes = [0x01, 0x00, 0xff, 0xff, 0x07];
/// let view: LeSlice<'_, u16> = LeSlice::new(&bytes);
/// assert_eq!(view.len(), 2);
/// assert_eq!(view.byte_len(), 5);
/// assert_eq!(view.iter().collect::<Vec<_>>(), vec![1, 0xffff]);
/// assert_eq!(view.get(2), None);
/// ```
pub struct LeSlice<'a, T> {
    bytes: &'a [u8],
    _marker: PhantomData<T>,
}

impl<T> Clone for LeSlice<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LeSlice<'_, T> {}

impl<T> Default for LeSlice<'_, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> LeSlice<'a, T> {
    /// Creates a view over `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    /// A view with no elements.
    pub fn empty() -> Self {
        Self::new(&[])
    }

    /// The raw bytes behind the view, including any partial trailing element.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length of the underlying byte slice.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

impl<'a, T: LeScalar> LeSlice<'a, T> {
    /// Number of whole elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / T::WIDTH
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`, or `None` if it is out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::WIDTH)?;
        let end = start.checked_add(T::WIDTH)?;
        self.bytes.get(start..end).map(T::from_le_slice)
    }

    /// Returns the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> T {
        debug_assert!(index < self.len());
        T::read_le(self.bytes.as_ptr().add(index * T::WIDTH))
    }

    /// Iterates over every whole element in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + 'a {
        self.bytes.chunks_exact(T::WIDTH).map(T::from_le_slice)
    }
}

impl<T: LeScalar + fmt::Debug> fmt::Debug for LeSlice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Encodes `values` as a contiguous little-endian byte vector.
///
/// # Example
///
/// ```
/// use tree_ensemble_buffers::to_le_bytes;
///
/// assert_eq!(to_le_bytes(&[1u16, 0x0203]), vec![0x01, 0x00, 0x03, 0x02]);
/// ```
pub fn to_le_bytes<T: LeScalar>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * T::WIDTH);
    for value in values {
        value.write_le(&mut out);
    }
    out
}
