pub(crate) mod channel;
pub(crate) mod inner_spsc;
pub(crate) mod slot;

pub use channel::{Consumer, Producer};
pub use inner_spsc::RingBuffer;
pub use slot::{ReadSlot, WriteSlot};
