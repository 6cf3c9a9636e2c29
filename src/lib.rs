//! # lock-free-spsc-ring
//!
//! A bounded, lock-free, single-producer single-consumer ring of fixed-size
//! byte items, laid over storage the caller provides.
//!
//! ## Design
//!
//! - Borrowed backing storage: any `&mut [u8]`, from the heap, the stack, an
//!   arena or a mapped page. Nothing is allocated by the ring.
//! - `storage.len() / item_size` slots, one of which always stays empty to
//!   tell a full ring from an empty one
//! - Two atomic indices, each padded to its own cache line. The line size is
//!   a type parameter ([`Line32`], [`Line64`], [`Line128`]).
//! - Copy workflow: [`Producer::push`] → [`Consumer::pop`]
//! - Zero-copy workflow: [`Producer::acquire_write`] → fill slot →
//!   [`WriteSlot::release`], then [`Consumer::acquire_read`] → read slot →
//!   [`ReadSlot::release`]
//! - No blocking: full and empty are reported immediately, retrying is up to
//!   the caller.
//!
//! ## Example
//!
//! ```
//! use lock_free_spsc_ring::RingBuffer;
//! use std::thread;
//!
//! let mut storage = vec![0u8; 4096];
//! let mut ring = RingBuffer::new(&mut storage, 64)?;
//! let (mut producer, mut consumer) = ring.split();
//!
//! thread::scope(|s| {
//!     s.spawn(move || {
//!         for i in 0..1000u32 {
//!             while producer.push(&i.to_le_bytes()).is_err() {
//!                 std::hint::spin_loop();
//!             }
//!         }
//!     });
//!
//!     let mut buf = [0u8; 4];
//!     for i in 0..1000u32 {
//!         while consumer.pop(&mut buf).is_none() {
//!             std::hint::spin_loop();
//!         }
//!         assert_eq!(u32::from_le_bytes(buf), i);
//!     }
//! });
//! # Ok::<(), lock_free_spsc_ring::InitError>(())
//! ```

pub mod cache_padded;
pub mod error;
pub mod spsc;
mod sync;

pub use cache_padded::{CacheLine, CachePadded, Line128, Line32, Line64};
pub use error::{InitError, PushError};
pub use spsc::bounded_spsc::{Consumer, Producer, ReadSlot, RingBuffer, WriteSlot};
