use std::alloc::{Layout, alloc, dealloc};
use std::collections::BTreeMap;
use std::ptr::NonNull;
use std::slice;

use log::{error, trace, warn};

use super::{Memory, PlatformAllocator};
use crate::AddrSeg;

/// Platform allocator backed by the host global allocator.
///
/// Addresses are host pointers. Only blocks this heap handed out can be viewed
/// or freed through it; anything else is refused. Blocks still live when the
/// heap is dropped are freed and reported as leaks.
#[derive(Debug, Default)]
pub struct Heap {
    blocks: BTreeMap<usize, (NonNull<u8>, usize)>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Pointer to the first byte of `seg`, if it lies inside a live block.
    fn locate(&self, seg: AddrSeg<usize>) -> Option<NonNull<u8>> {
        let (&start, &(ptr, size)) = self.blocks.range(..=seg.start).next_back()?;
        if !seg.is_inside(&AddrSeg::from_addr_size(start, size)) {
            return None;
        }
        // SAFETY: `seg` lies inside the block, so the offset stays within its allocation.
        Some(unsafe { ptr.add(seg.start - start) })
    }
}

impl Memory for Heap {
    type Addr = usize;

    fn bytes(&self, seg: AddrSeg<usize>) -> Option<&[u8]> {
        let ptr = self.locate(seg)?;
        // SAFETY: the range is inside a live block owned by this heap. Blocks are only
        // freed through `&mut self`, so the block outlives the returned borrow.
        Some(unsafe { slice::from_raw_parts(ptr.as_ptr(), seg.size) })
    }

    fn bytes_mut(&mut self, seg: AddrSeg<usize>) -> Option<&mut [u8]> {
        let ptr = self.locate(seg)?;
        // SAFETY: as in `bytes`; the exclusive borrow of the heap rules out aliasing views.
        Some(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), seg.size) })
    }
}

impl PlatformAllocator for Heap {
    fn allocate(&mut self, size: usize) -> Option<usize> {
        if size == 0 {
            return None;
        }
        let layout = Layout::from_size_align(size, 1).ok()?;
        // SAFETY: `layout` has a non-zero size.
        let ptr = NonNull::new(unsafe { alloc(layout) })?;
        let addr = ptr.as_ptr() as usize;
        self.blocks.insert(addr, (ptr, size));
        trace!("heap block {addr:#X}+{size:#X}");
        Some(addr)
    }

    fn deallocate(&mut self, addr: usize, size: usize) {
        if !self.owns(AddrSeg::from_addr_size(addr, size)) {
            error!("heap free of unknown block {addr:#X}+{size:#X}");
            return;
        }
        let Some((ptr, size)) = self.blocks.remove(&addr) else {
            return;
        };
        // SAFETY: `ptr` came from `alloc` with this exact layout and is removed from
        // the table, so it is freed once.
        unsafe { dealloc(ptr.as_ptr(), Layout::from_size_align_unchecked(size, 1)) };
    }

    fn owns(&self, seg: AddrSeg<usize>) -> bool {
        self.blocks
            .get(&seg.start)
            .is_some_and(|&(_, size)| size == seg.size)
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        for (addr, (ptr, size)) in std::mem::take(&mut self.blocks) {
            warn!("heap block {addr:#X}+{size:#X} leaked, freeing");
            // SAFETY: see `deallocate`.
            unsafe { dealloc(ptr.as_ptr(), Layout::from_size_align_unchecked(size, 1)) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_view() {
        let mut heap = Heap::new();
        let addr = heap.allocate(16).unwrap();
        let seg = AddrSeg::from_addr_size(addr, 16);
        assert!(heap.owns(seg));

        heap.bytes_mut(seg).unwrap().fill(7);
        let inner = AddrSeg::from_addr_size(addr + 4, 4);
        assert_eq!(heap.bytes(inner).unwrap(), &[7, 7, 7, 7]);
        assert!(!heap.owns(inner));

        heap.deallocate(addr, 16);
        assert_eq!(heap.live_blocks(), 0);
        assert!(heap.bytes(seg).is_none());
    }

    #[test]
    fn test_foreign_memory_refused() {
        let mut heap = Heap::new();
        let local = [1u8, 2, 3];
        let view = AddrSeg::from_slice(&local);
        assert!(heap.bytes(view).is_none());
        assert!(heap.bytes_mut(view).is_none());

        let addr = heap.allocate(8).unwrap();
        assert!(heap.bytes(AddrSeg::from_addr_size(addr + 4, 8)).is_none());
        heap.deallocate(addr, 7);
        assert_eq!(heap.live_blocks(), 1);
    }

    #[test]
    fn test_zero_size_refused() {
        assert_eq!(Heap::new().allocate(0), None);
    }
}
