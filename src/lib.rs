pub mod address;
pub mod alloc;
pub mod dump;
pub mod error;
pub mod iter;
pub mod ops;
pub mod owned;
pub mod segment;

pub use address::{Address, can_advance};
pub use crate::alloc::{
    AllocError, AllocOptions, Arena, ArenaOptions, Heap, Memory, PlatformAllocator,
    SegmentAllocator, ZeroSizePolicy,
};
pub use error::{Error, SegmentError};
pub use iter::SegmentIterator;
pub use owned::OwnedSegment;
pub use segment::AddrSeg;
