use thiserror::Error;

use crate::zone::ZoneKey;

/// A selector, zone key or action that does not resolve against the document.
///
/// These signal a stale or malformed address held by the caller; the operation
/// that produced one has not touched the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("zone `{zone}` is owned by `{parent_id}`, which is not in the document")]
    UnknownParent { zone: ZoneKey, parent_id: String },
    #[error("index {index} is out of bounds for zone `{zone}` of length {len}")]
    IndexOutOfBounds {
        zone: ZoneKey,
        index: usize,
        len: usize,
    },
    #[error("block `{block_id}` cannot be moved into its own zone `{zone}`")]
    MoveIntoSelf { block_id: String, zone: ZoneKey },
    #[error("block id `{0}` is already in use")]
    DuplicateId(String),
}
