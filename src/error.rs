use thiserror::Error;

use crate::alloc::AllocError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Failures of segment arithmetic and iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("segment is empty or wraps past the end of the address domain")]
    InvalidSegment,

    #[error("address {addr:#X} lies outside the segment")]
    OutOfRange { addr: u64 },

    #[error("address arithmetic leaves the address domain")]
    AddressOverflow,

    #[error("cut at {addr:#X} would leave nothing of the segment")]
    WouldBeEmpty { addr: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AddrSeg, Arena, ArenaOptions, SegmentAllocator};

    fn reserve_tail(
        alloc: &SegmentAllocator<Arena<u16>>,
        size: u16,
        cut: u16,
    ) -> Result<AddrSeg<u16>, Error> {
        let mut seg = AddrSeg::sentinel();
        alloc.reserve(&mut seg, size)?;
        let mut tail = seg;
        tail.chop_left_from(cut)?;
        Ok(tail)
    }

    #[test]
    fn test_errors_convert_transparently() {
        let alloc = SegmentAllocator::new(Arena::new(ArenaOptions::default()).unwrap());
        assert_eq!(
            reserve_tail(&alloc, 0x10, 0x108).unwrap(),
            AddrSeg::from_addr_size(0x108, 8)
        );

        let err = reserve_tail(&alloc, 0x10, 0x100).unwrap_err();
        assert!(matches!(err, Error::Segment(SegmentError::OutOfRange { addr: 0x100 })));
        assert_eq!(err.to_string(), "address 0x100 lies outside the segment");

        let err = reserve_tail(&alloc, 0, 0x100).unwrap_err();
        assert!(matches!(err, Error::Alloc(AllocError::ZeroSize)));
        assert_eq!(err.to_string(), "zero size reservation rejected");
    }
}
