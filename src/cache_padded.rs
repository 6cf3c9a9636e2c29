//! Cache-line padding with a configurable line size.
//!
//! [`CachePadded`] follows the shape of `crossbeam_utils::CachePadded`, but the
//! alignment is chosen by a [`CacheLine`] type parameter instead of being fixed
//! per target. This keeps the padding retunable without touching the ring
//! buffer itself:
//!
//! ```rust
//! use lock_free_spsc_ring::{CacheLine, CachePadded, Line128, Line64};
//! use std::mem::{align_of, size_of};
//!
//! assert_eq!(align_of::<CachePadded<u64>>(), 64);
//! assert_eq!(size_of::<CachePadded<u64, Line128>>(), Line128::SIZE);
//! assert_eq!(Line64::SIZE, 64);
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};

mod sealed {
    pub trait Sealed {}
}

/// A cache line size that values can be padded to.
///
/// Implemented by the zero-sized marker types [`Line32`], [`Line64`] and
/// [`Line128`]. Each marker carries the alignment it stands for, so a
/// zero-length array of it forces that alignment onto the containing struct.
pub trait CacheLine: sealed::Sealed + fmt::Debug + Copy + Send + Sync + 'static {
    /// Line size in bytes.
    const SIZE: usize;
}

/// 32-byte cache lines, found on some embedded cores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(align(32))]
pub struct Line32;

/// 64-byte cache lines, the common case on x86-64 and most ARM cores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(align(64))]
pub struct Line64;

/// 128-byte lines. Covers adjacent-line prefetch on x86-64 and the large
/// lines of Apple silicon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(align(128))]
pub struct Line128;

impl sealed::Sealed for Line32 {}
impl sealed::Sealed for Line64 {}
impl sealed::Sealed for Line128 {}

impl CacheLine for Line32 {
    const SIZE: usize = 32;
}

impl CacheLine for Line64 {
    const SIZE: usize = 64;
}

impl CacheLine for Line128 {
    const SIZE: usize = 128;
}

const _: () = assert!(std::mem::align_of::<Line32>() == Line32::SIZE);
const _: () = assert!(std::mem::align_of::<Line64>() == Line64::SIZE);
const _: () = assert!(std::mem::align_of::<Line128>() == Line128::SIZE);

/// Pads and aligns a value to the length of a cache line.
///
/// Two `CachePadded` values placed next to each other never share a line,
/// which prevents false sharing when different cores write them.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct CachePadded<T, L: CacheLine = Line64> {
    _align: [L; 0],
    value: T,
}

impl<T, L: CacheLine> CachePadded<T, L> {
    /// Pads and aligns a value to the length of a cache line.
    pub const fn new(value: T) -> Self {
        CachePadded { _align: [], value }
    }

    /// Returns the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, L: CacheLine> Deref for CachePadded<T, L> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, L: CacheLine> DerefMut for CachePadded<T, L> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug, L: CacheLine> fmt::Debug for CachePadded<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePadded")
            .field("line", &L::SIZE)
            .field("value", &self.value)
            .finish()
    }
}

impl<T, L: CacheLine> From<T> for CachePadded<T, L> {
    fn from(value: T) -> Self {
        CachePadded::new(value)
    }
}
