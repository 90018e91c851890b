//! In-place truncation of a segment at a cut address.
//!
//! `*_from` keeps the cut address, `*_at` drops it. Every chop either
//! succeeds or leaves the segment exactly as it was.

use crate::{Address, AddrSeg, SegmentError};

impl<A: Address> AddrSeg<A> {
    /// Keep `[cut, end]`, discarding everything before `cut`.
    pub fn chop_left_from(&mut self, cut: A) -> Result<(), SegmentError> {
        let end = self.checked_cut(cut)?;
        self.size = end - cut + A::ONE;
        self.start = cut;
        Ok(())
    }

    /// Keep `(cut, end]`, discarding `cut` and everything before it.
    pub fn chop_left_at(&mut self, cut: A) -> Result<(), SegmentError> {
        let end = self.checked_cut(cut)?;
        let next = cut.checked_add(A::ONE).ok_or(SegmentError::AddressOverflow)?;
        if cut == end {
            return Err(SegmentError::WouldBeEmpty { addr: cut.to_u64() });
        }
        self.size = end - next + A::ONE;
        self.start = next;
        Ok(())
    }

    /// Keep `[start, cut]`, discarding everything after `cut`.
    pub fn chop_right_from(&mut self, cut: A) -> Result<(), SegmentError> {
        self.checked_cut(cut)?;
        self.size = cut - self.start + A::ONE;
        Ok(())
    }

    /// Keep `[start, cut)`, discarding `cut` and everything after it.
    pub fn chop_right_at(&mut self, cut: A) -> Result<(), SegmentError> {
        self.checked_cut(cut)?;
        let prev = cut.checked_sub(A::ONE).ok_or(SegmentError::AddressOverflow)?;
        if cut == self.start {
            return Err(SegmentError::WouldBeEmpty { addr: cut.to_u64() });
        }
        self.size = prev - self.start + A::ONE;
        Ok(())
    }

    /// Validate the segment and the cut address, returning the end address.
    fn checked_cut(&self, cut: A) -> Result<A, SegmentError> {
        if !self.is_valid() {
            return Err(SegmentError::InvalidSegment);
        }
        let end = self.end();
        if cut < self.start || cut > end {
            return Err(SegmentError::OutOfRange { addr: cut.to_u64() });
        }
        Ok(end)
    }
}
