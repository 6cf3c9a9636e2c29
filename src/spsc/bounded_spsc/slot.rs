//! Guards for the zero-copy half of the ring API.
//!
//! [`WriteSlot`] and [`ReadSlot`] borrow one slot of the backing storage
//! exclusively. They split "find the next slot" from "publish it", so an item
//! can be built or parsed in place. Each guard mutably borrows the half that
//! created it: only one can be outstanding per side, and none can outlive its
//! release.

use super::inner_spsc::RingBuffer;
use crate::cache_padded::{CacheLine, Line64};
use crate::sync::Ordering::Release;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::slice;
use tracing::{trace, warn};

/// A free slot reserved by [`Producer::acquire_write`].
///
/// Dereferences to the whole slot, `item_size` bytes holding whatever the
/// slot last contained. Releasing or dropping the guard publishes the slot to
/// the consumer, except when the guard is dropped while its thread unwinds from
/// a panic: the slot is then discarded, so a half-built item is never seen.
///
/// [`Producer::acquire_write`]: super::channel::Producer::acquire_write
#[derive(Debug)]
pub struct WriteSlot<'p, L: CacheLine = Line64> {
    ring: &'p RingBuffer<'p, L>,
    index: usize,
    next: usize,
}

impl<'p, L: CacheLine> WriteSlot<'p, L> {
    /// # Safety
    ///
    /// `index` must be a free slot that only the caller can write, and `next`
    /// its successor.
    pub(super) unsafe fn new(ring: &'p RingBuffer<'p, L>, index: usize, next: usize) -> Self {
        WriteSlot { ring, index, next }
    }

    /// Position of the slot in the ring.
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Publishes the slot unconditionally.
    #[inline]
    pub fn release(self) {
        self.publish();
        mem::forget(self);
    }

    fn publish(&self) {
        trace!(index = self.index, "producer slot release");
        self.ring.write_index.store(self.next, Release);
    }

    /// Gives the slot back without publishing it. The next
    /// [`acquire_write`](super::channel::Producer::acquire_write) returns the
    /// same slot again.
    pub fn discard(self) {
        trace!(index = self.index, "producer slot discard");
        mem::forget(self);
    }
}

impl<L: CacheLine> Deref for WriteSlot<'_, L> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: the slot is in range and private to this guard.
        unsafe { slice::from_raw_parts(self.ring.slots.slot_ptr(self.index), self.ring.item_size()) }
    }
}

impl<L: CacheLine> DerefMut for WriteSlot<'_, L> {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: the slot is in range and private to this guard, and the
        // consumer will not read it before the guard publishes it.
        unsafe {
            slice::from_raw_parts_mut(self.ring.slots.slot_ptr(self.index), self.ring.item_size())
        }
    }
}

impl<L: CacheLine> Drop for WriteSlot<'_, L> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!(index = self.index, "producer slot discarded during unwind");
            return;
        }
        self.publish();
    }
}

/// A published slot borrowed by [`Consumer::acquire_read`].
///
/// Dereferences to the whole slot. Releasing or dropping the guard frees the
/// slot for the producer.
///
/// [`Consumer::acquire_read`]: super::channel::Consumer::acquire_read
#[derive(Debug)]
pub struct ReadSlot<'c, L: CacheLine = Line64> {
    ring: &'c RingBuffer<'c, L>,
    index: usize,
}

impl<'c, L: CacheLine> ReadSlot<'c, L> {
    /// # Safety
    ///
    /// `index` must be a slot the producer has published and that only the
    /// caller reads.
    pub(super) unsafe fn new(ring: &'c RingBuffer<'c, L>, index: usize) -> Self {
        ReadSlot { ring, index }
    }

    /// Position of the slot in the ring.
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Frees the slot. Same as dropping the guard.
    #[inline]
    pub fn release(self) {
        drop(self);
    }

    /// Leaves the item in the ring. The next
    /// [`acquire_read`](super::channel::Consumer::acquire_read) or
    /// [`pop`](super::channel::Consumer::pop) sees it again.
    pub fn retain(self) {
        trace!(index = self.index, "consumer slot retain");
        mem::forget(self);
    }
}

impl<L: CacheLine> Deref for ReadSlot<'_, L> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: the slot is in range, published, and the producer cannot
        // overwrite it until `drop` frees it.
        unsafe { slice::from_raw_parts(self.ring.slots.slot_ptr(self.index), self.ring.item_size()) }
    }
}

impl<L: CacheLine> Drop for ReadSlot<'_, L> {
    fn drop(&mut self) {
        trace!(index = self.index, "consumer slot release");
        self.ring
            .read_index
            .store(self.ring.next_index(self.index), Release);
    }
}
