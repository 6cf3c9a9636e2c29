//! Producer and consumer halves of a bounded SPSC byte ring.
//!
//! # Overview
//! [`RingBuffer::split`] hands out one [`Producer`] and one [`Consumer`] that
//! borrow the same ring. Each half may be moved to its own thread; neither can
//! be cloned, so there is never more than one writer or one reader.
//!
//! Every operation returns immediately. A full or empty ring is reported as
//! `Err(PushError::Full)` or `None` and the caller decides whether to spin,
//! yield or give up.
//!
//! # Example
//! ```
//! use lock_free_spsc_ring::RingBuffer;
//!
//! let mut storage = [0u8; 64];
//! let mut ring = RingBuffer::new(&mut storage, 16).unwrap();
//! let (mut tx, mut rx) = ring.split();
//!
//! tx.push(b"ping").unwrap();
//! let mut buf = [0u8; 4];
//! assert_eq!(rx.pop(&mut buf), Some(4));
//! assert_eq!(&buf, b"ping");
//! assert_eq!(rx.pop(&mut buf), None);
//! ```
//!
//! # Internals
//! Each half keeps a private copy of the other side's index and only reloads
//! it, with an `Acquire` load, when the copy says the ring is full (producer)
//! or empty (consumer). Progress is published with a `Release` store of the
//! half's own index, which makes the slot bytes written or read before it
//! visible to the other side.
//!
//! See [`inner_spsc`](super::inner_spsc) for the wrap-around and capacity
//! rules.

use super::inner_spsc::RingBuffer;
use super::slot::{ReadSlot, WriteSlot};
use crate::cache_padded::{CacheLine, Line64};
use crate::error::PushError;
use crate::sync::Ordering::{Acquire, Relaxed, Release};
use tracing::warn;

impl<'a, L: CacheLine> RingBuffer<'a, L> {
    /// Splits the ring into its producer and consumer halves.
    ///
    /// Both halves borrow the ring, so it cannot be split again until they
    /// are dropped. Items still queued at that point survive and are seen by
    /// the next pair of halves.
    pub fn split(&mut self) -> (Producer<'_, L>, Consumer<'_, L>) {
        let (write_index, read_index) = self.indices();
        let ring: &RingBuffer<'_, L> = self;
        let producer = Producer {
            ring,
            cached_read_index: read_index,
        };
        let consumer = Consumer {
            ring,
            cached_write_index: write_index,
        };
        (producer, consumer)
    }
}

/// The writing half of a bounded SPSC byte ring.
///
/// Owns the ring's write index and a cached copy of its read index.
#[derive(Debug)]
pub struct Producer<'r, L: CacheLine = Line64> {
    ring: &'r RingBuffer<'r, L>,
    cached_read_index: usize,
}

impl<'r, L: CacheLine> Producer<'r, L> {
    /// Finds the slot the next item goes to, returning it and its successor.
    ///
    /// Returns `None` if the ring is full. Only reloads the consumer's index
    /// when the cached copy says the ring is full.
    #[inline(always)]
    fn next_free(&mut self) -> Option<(usize, usize)> {
        let index = self.ring.write_index.load(Relaxed);
        let next = self.ring.next_index(index);

        if next == self.cached_read_index {
            self.cached_read_index = self.ring.read_index.load(Acquire);
            if next == self.cached_read_index {
                return None; // Ring is full
            }
        }
        Some((index, next))
    }

    /// Copies `item` into the next free slot and publishes it.
    ///
    /// `item` may be shorter than a slot, in which case only its bytes are
    /// written and the rest of the slot keeps whatever it held before.
    ///
    /// Returns [`PushError::Full`] if no slot is free. An `item` longer than
    /// [`item_size`](Self::item_size) is a caller bug: it trips a debug
    /// assertion and otherwise returns [`PushError::Oversized`]. Nothing is
    /// written on error.
    #[inline]
    pub fn push(&mut self, item: &[u8]) -> Result<(), PushError> {
        let item_size = self.ring.item_size();
        debug_assert!(
            item.len() <= item_size,
            "item of {} bytes exceeds the slot size of {} bytes",
            item.len(),
            item_size
        );
        if item.len() > item_size {
            warn!(len = item.len(), item_size, "rejected oversized push");
            return Err(PushError::Oversized {
                len: item.len(),
                item_size,
            });
        }

        let (index, next) = self.next_free().ok_or(PushError::Full)?;

        // SAFETY: `index` is the producer's own slot: it is outside the
        // consumer's published range until the store below.
        unsafe { self.ring.slots.write(index, item) };
        self.ring.write_index.store(next, Release);
        Ok(())
    }

    /// Reserves the next free slot for writing in place.
    ///
    /// The slot is published when the returned guard is released or dropped,
    /// and abandoned by [`WriteSlot::discard`]. Returns `None` if the ring is
    /// full.
    #[inline]
    pub fn acquire_write(&mut self) -> Option<WriteSlot<'_, L>> {
        let (index, next) = self.next_free()?;
        // SAFETY: as in `push`, the slot stays private to the producer until
        // the guard publishes `next`. The guard borrows `self`, so no other
        // slot can be reserved in the meantime.
        Some(unsafe { WriteSlot::new(self.ring, index, next) })
    }

    /// Size of one slot in bytes.
    #[inline(always)]
    pub fn item_size(&self) -> usize {
        self.ring.item_size()
    }

    /// Returns the capacity of the ring.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns the number of items not yet consumed.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if the ring is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns `true` if the ring is currently full.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

/// The reading half of a bounded SPSC byte ring.
///
/// Owns the ring's read index and a cached copy of its write index.
#[derive(Debug)]
pub struct Consumer<'r, L: CacheLine = Line64> {
    ring: &'r RingBuffer<'r, L>,
    cached_write_index: usize,
}

impl<'r, L: CacheLine> Consumer<'r, L> {
    /// Finds the oldest published slot.
    ///
    /// Returns `None` if the ring is empty. Only reloads the producer's index
    /// when the cached copy says the ring is empty.
    #[inline(always)]
    fn next_filled(&mut self) -> Option<usize> {
        let index = self.ring.read_index.load(Relaxed);

        if index == self.cached_write_index {
            self.cached_write_index = self.ring.write_index.load(Acquire);
            if index == self.cached_write_index {
                return None; // Ring is empty
            }
        }
        Some(index)
    }

    /// Copies the oldest item into `dest` and frees its slot.
    ///
    /// Copies `min(dest.len(), item_size)` bytes and returns that count, or
    /// returns `None` without touching `dest` if the ring is empty.
    #[inline]
    pub fn pop(&mut self, dest: &mut [u8]) -> Option<usize> {
        let index = self.next_filled()?;

        // SAFETY: the acquire load in `next_filled` observed the producer's
        // release of this slot, and the producer cannot reuse it before the
        // store below.
        let copied = unsafe { self.ring.slots.read(index, dest) };
        self.ring
            .read_index
            .store(self.ring.next_index(index), Release);
        Some(copied)
    }

    /// Borrows the oldest item in place.
    ///
    /// The slot is freed when the returned guard is released or dropped, and
    /// kept for the next read by [`ReadSlot::retain`]. Returns `None` if the
    /// ring is empty.
    #[inline]
    pub fn acquire_read(&mut self) -> Option<ReadSlot<'_, L>> {
        let index = self.next_filled()?;
        // SAFETY: as in `pop`; the guard borrows `self` so the slot is read
        // by nobody else until it is freed.
        Some(unsafe { ReadSlot::new(self.ring, index) })
    }

    /// Size of one slot in bytes.
    #[inline(always)]
    pub fn item_size(&self) -> usize {
        self.ring.item_size()
    }

    /// Returns the capacity of the ring.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns the number of items waiting to be consumed.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if the ring is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns `true` if the ring is full.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}
