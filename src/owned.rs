use std::cell::{Ref, RefMut};
use std::mem;

use log::error;

use crate::{AddrSeg, AllocError, PlatformAllocator, SegmentAllocator};

/// A reserved segment that is released when dropped.
///
/// Not `Clone`: exactly one handle owns the block. [`segment`](Self::segment)
/// hands out plain non-owning views.
#[derive(Debug)]
pub struct OwnedSegment<'a, P: PlatformAllocator> {
    allocator: &'a SegmentAllocator<P>,
    segment: AddrSeg<P::Addr>,
}

impl<'a, P: PlatformAllocator> OwnedSegment<'a, P> {
    pub(crate) fn new(allocator: &'a SegmentAllocator<P>, segment: AddrSeg<P::Addr>) -> Self {
        Self { allocator, segment }
    }

    /// Non-owning view of the reserved span.
    pub fn segment(&self) -> AddrSeg<P::Addr> {
        self.segment
    }

    pub fn size(&self) -> P::Addr {
        self.segment.size
    }

    /// Read view of the reserved bytes.
    ///
    /// The view borrows the handle, so it cannot outlive the release on drop:
    ///
    /// ```compile_fail
    /// use addrseg::{Arena, ArenaOptions, SegmentAllocator};
    ///
    /// let alloc = SegmentAllocator::new(Arena::new(ArenaOptions::default()).unwrap());
    /// let view = {
    ///     let owned = alloc.reserve_owned(8).unwrap();
    ///     owned.bytes().unwrap()
    /// };
    /// assert_eq!(view.len(), 8);
    /// ```
    pub fn bytes(&self) -> Option<Ref<'_, [u8]>> {
        self.allocator.bytes(self.segment)
    }

    pub fn bytes_mut(&mut self) -> Option<RefMut<'_, [u8]>> {
        self.allocator.bytes_mut(self.segment)
    }

    /// Release now and report the outcome.
    pub fn release(mut self) -> Result<(), AllocError> {
        let mut segment = mem::take(&mut self.segment);
        self.allocator.release(&mut segment)
    }

    /// Give up the handle without releasing. The caller becomes the owner.
    pub fn into_raw(mut self) -> AddrSeg<P::Addr> {
        mem::take(&mut self.segment)
    }
}

impl<P: PlatformAllocator> Drop for OwnedSegment<'_, P> {
    fn drop(&mut self) {
        let segment = self.segment;
        if let Err(e) = self.allocator.release(&mut self.segment) {
            error!("release of {segment} on drop failed: {e}");
        }
    }
}
