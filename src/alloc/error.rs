use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("zero size reservation rejected")]
    ZeroSize,

    #[error("target segment already describes a live span")]
    AlreadyReserved,

    #[error("platform allocator could not provide {size} units")]
    AllocationFailure { size: u64 },

    #[error("segment is not backed by platform memory")]
    Unmapped,

    #[error("segment is not a live block of this allocator")]
    NotOwned,

    #[error("segments differ in size or overlap")]
    Incompatible,

    #[error("segment is empty or wraps past the end of the address domain")]
    InvalidSegment,

    #[error("platform memory is borrowed by a live byte view")]
    Busy,
}
