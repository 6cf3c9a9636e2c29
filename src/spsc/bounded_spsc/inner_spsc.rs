use crate::cache_padded::{CacheLine, CachePadded, Line64};
use crate::error::InitError;
use crate::sync::{
    AtomicUsize,
    Ordering::{Acquire, Relaxed},
};
use std::{marker::PhantomData, ptr, ptr::NonNull};
use tracing::debug;

/// Shared state of a bounded single-producer single-consumer byte ring.
///
/// It is split into a [`Producer`] and a [`Consumer`] half by
/// [`RingBuffer::split`], see the [`super::channel`] module.
///
/// [`Producer`]: super::channel::Producer
/// [`Consumer`]: super::channel::Consumer
///
/// # Overview
///
/// `RingBuffer` borrows a caller-supplied byte region and carves it into
/// `slot_count = storage.len() / item_size` slots of `item_size` bytes. Any
/// trailing bytes past the last whole slot are never touched. The ring owns
/// nothing but two atomic indices; the storage goes back to the caller when
/// the ring is dropped.
///
/// # Cache padding
///
/// `write_index` and `read_index` are each wrapped in [`CachePadded`] so they
/// sit on separate cache lines from each other and from the read-only slot
/// geometry. The line size is the `L` type parameter and defaults to
/// [`Line64`]. The cached copies of the opposite index live in the halves,
/// never in this struct.
///
/// # Wrap-around logic
///
/// Both indices cycle through `0..slot_count`. Instead of `% slot_count` the
/// successor is computed with a boolean mask:
///
/// ```rust
/// // if index + 1 == slot_count, wrap to zero; else index + 1
/// let index = 3;
/// let slot_count = 4;
/// let next_index = (index + 1) * ((index + 1) < slot_count) as usize;
/// assert_eq!(next_index, 0);
/// ```
///
/// # Note on capacity
///
/// One slot is always left empty to tell full from empty without a counter:
/// the ring is empty iff `read_index == write_index` and full iff
/// `next(write_index) == read_index`. Usable capacity is `slot_count - 1`, so
/// construction requires at least two slots.
#[derive(Debug)]
#[repr(C)]
pub struct RingBuffer<'a, L: CacheLine = Line64> {
    pub(super) write_index: CachePadded<AtomicUsize, L>,
    pub(super) read_index: CachePadded<AtomicUsize, L>,
    pub(super) slots: Slots<'a>,
}

/// Geometry of the borrowed storage. Read-only after construction.
#[derive(Debug)]
pub(super) struct Slots<'a> {
    base: NonNull<u8>,
    storage_len: usize,
    item_size: usize,
    slot_count: usize,
    _storage: PhantomData<&'a mut [u8]>,
}

impl<'a> Slots<'a> {
    fn new(storage: &'a mut [u8], item_size: usize) -> Result<Self, InitError> {
        let storage_len = storage.len();
        if storage_len == 0 {
            return Err(InitError::EmptyStorage);
        }
        if item_size == 0 {
            return Err(InitError::ZeroItemSize);
        }
        if item_size >= storage_len {
            return Err(InitError::ItemTooLarge {
                item_size,
                storage_len,
            });
        }

        let slot_count = storage_len / item_size;
        if slot_count < 2 {
            return Err(InitError::TooFewSlots {
                storage_len,
                item_size,
                slot_count,
            });
        }

        Ok(Self {
            base: NonNull::from(storage).cast(),
            storage_len,
            item_size,
            slot_count,
            _storage: PhantomData,
        })
    }

    /// Returns a pointer to the first byte of the slot at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be below `slot_count`.
    #[inline(always)]
    pub(super) unsafe fn slot_ptr(&self, index: usize) -> *mut u8 {
        debug_assert!(index < self.slot_count);
        unsafe { self.base.as_ptr().add(index * self.item_size) }
    }

    /// Copies `item` into the start of the slot at `index`. Bytes past
    /// `item.len()` keep their previous contents.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that `index` is in range, that `item` is no
    /// longer than a slot, and that the slot is not published to the consumer.
    #[inline(always)]
    pub(super) unsafe fn write(&self, index: usize, item: &[u8]) {
        debug_assert!(item.len() <= self.item_size);
        unsafe {
            ptr::copy_nonoverlapping(item.as_ptr(), self.slot_ptr(index), item.len());
        }
    }

    /// Copies up to `dest.len()` bytes out of the slot at `index` and returns
    /// how many were copied.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that `index` is in range and that the slot
    /// has been published by the producer and not yet released.
    #[inline(always)]
    pub(super) unsafe fn read(&self, index: usize, dest: &mut [u8]) -> usize {
        let len = dest.len().min(self.item_size);
        unsafe {
            ptr::copy_nonoverlapping(self.slot_ptr(index), dest.as_mut_ptr(), len);
        }
        len
    }
}

// SAFETY: the ring only hands out disjoint slots to the two halves. The
// producer writes slots outside `[read_index, write_index)`, the consumer reads
// slots inside it, and the indices are published with release stores.
unsafe impl<L: CacheLine> Send for RingBuffer<'_, L> {}
unsafe impl<L: CacheLine> Sync for RingBuffer<'_, L> {}

impl<'a> RingBuffer<'a> {
    /// Creates a ring over `storage` with slots of `item_size` bytes, padding
    /// its indices to 64-byte cache lines.
    ///
    /// Fails without building anything when `storage` is empty, `item_size`
    /// is zero or not smaller than `storage`, or fewer than two slots fit.
    ///
    /// ```rust
    /// use lock_free_spsc_ring::{InitError, RingBuffer};
    ///
    /// let mut storage = [0u8; 24];
    /// let ring = RingBuffer::new(&mut storage, 8).unwrap();
    /// assert_eq!(ring.slot_count(), 3);
    /// assert_eq!(ring.capacity(), 2);
    /// drop(ring);
    ///
    /// assert!(matches!(
    ///     RingBuffer::new(&mut storage, 16),
    ///     Err(InitError::TooFewSlots { slot_count: 1, .. })
    /// ));
    /// ```
    pub fn new(storage: &'a mut [u8], item_size: usize) -> Result<Self, InitError> {
        Self::with_cache_line(storage, item_size)
    }
}

impl<'a, L: CacheLine> RingBuffer<'a, L> {
    /// Cache line size the indices are padded to.
    pub const CACHE_LINE: usize = L::SIZE;

    /// Like [`RingBuffer::new`], padding the indices to the cache line `L`.
    ///
    /// ```rust
    /// use lock_free_spsc_ring::{Line128, RingBuffer};
    ///
    /// let mut storage = vec![0u8; 1024];
    /// let ring = RingBuffer::<Line128>::with_cache_line(&mut storage, 64).unwrap();
    /// assert_eq!(RingBuffer::<Line128>::CACHE_LINE, 128);
    /// assert_eq!(ring.slot_count(), 16);
    /// ```
    pub fn with_cache_line(storage: &'a mut [u8], item_size: usize) -> Result<Self, InitError> {
        let slots = Slots::new(storage, item_size)
            .inspect_err(|reason| debug!(%reason, "rejected ring buffer storage"))?;

        debug!(
            storage_len = slots.storage_len,
            item_size,
            slot_count = slots.slot_count,
            cache_line = L::SIZE,
            "initialized spsc ring buffer"
        );

        Ok(Self {
            write_index: CachePadded::new(AtomicUsize::new(0)),
            read_index: CachePadded::new(AtomicUsize::new(0)),
            slots,
        })
    }

    /// Returns the successor of `index`, wrapping to zero past the last slot.
    ///
    /// # Wrap-around logic
    ///
    /// ```text
    /// let is_less = ((index + 1) < slot_count) as usize;
    /// let next_index = (index + 1) * is_less;
    /// ```
    #[inline(always)]
    pub(super) fn next_index(&self, index: usize) -> usize {
        let is_less = ((index + 1) < self.slots.slot_count) as usize;
        (index + 1) * is_less
    }

    /// Size of one slot in bytes.
    #[inline(always)]
    pub fn item_size(&self) -> usize {
        self.slots.item_size
    }

    /// Number of slots carved out of the storage.
    #[inline(always)]
    pub fn slot_count(&self) -> usize {
        self.slots.slot_count
    }

    /// Maximum number of items the ring holds at once, `slot_count - 1`.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.slot_count - 1
    }

    /// Number of published, unconsumed items.
    ///
    /// Only a snapshot when the halves are in use on other threads.
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_index.load(Acquire);
        let read = self.read_index.load(Acquire);
        if write >= read {
            write - read
        } else {
            self.slots.slot_count - read + write
        }
    }

    /// Returns `true` if no published item is waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write_index.load(Acquire) == self.read_index.load(Acquire)
    }

    /// Returns `true` if the next push would fail.
    ///
    /// # Wrap-around logic
    ///
    /// Uses the same successor computation as the producer's full check.
    #[inline]
    pub fn is_full(&self) -> bool {
        let next_write = self.next_index(self.write_index.load(Acquire));
        next_write == self.read_index.load(Acquire)
    }

    /// Current indices, for halves created by [`RingBuffer::split`] to seed
    /// their caches.
    pub(super) fn indices(&self) -> (usize, usize) {
        (self.write_index.load(Relaxed), self.read_index.load(Relaxed))
    }
}
