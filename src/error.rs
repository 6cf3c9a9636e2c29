use thiserror::Error;

/// Reasons a byte region cannot back a ring buffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    #[error("backing storage is empty")]
    EmptyStorage,

    #[error("item size must be greater than zero")]
    ZeroItemSize,

    #[error("item size {item_size} must be smaller than the storage length {storage_len}")]
    ItemTooLarge { item_size: usize, storage_len: usize },

    #[error(
        "{storage_len} bytes hold {slot_count} slot(s) of {item_size} bytes, at least 2 are required"
    )]
    TooFewSlots {
        storage_len: usize,
        item_size: usize,
        slot_count: usize,
    },
}

/// Reasons a copy-based push was refused. Nothing is written in either case.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    #[error("ring buffer is full")]
    Full,

    #[error("item of {len} bytes exceeds the slot size of {item_size} bytes")]
    Oversized { len: usize, item_size: usize },
}
