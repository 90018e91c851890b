use std::collections::BTreeMap;

use log::{debug, error, trace};

use super::{AllocError, Memory, PlatformAllocator};
use crate::{Address, AddrSeg};

/// Options for an [`Arena`].
#[derive(Debug, Clone)]
pub struct ArenaOptions<A: Address> {
    /// First mapped address. Must be non-zero, zero is the null address.
    pub base: A,
    /// Number of mapped units.
    pub capacity: A,
    /// Initial content of the backing memory, so unzeroed spans are visible.
    pub fill: u8,
}

impl Default for ArenaOptions<u16> {
    fn default() -> Self {
        Self {
            base: 0x0100,
            capacity: 0x0800,
            fill: 0xA5,
        }
    }
}

/// A simulated bounded address space, such as the RAM of a 16-bit target.
///
/// Blocks are handed out bottom-up. Freeing the topmost block gives its
/// space back; any other freed block stays used until the arena is dropped.
#[derive(Debug, Clone)]
pub struct Arena<A: Address> {
    span: AddrSeg<A>,
    memory: Vec<u8>,
    /// Offset of the first unused unit.
    next: A,
    live: BTreeMap<A, A>,
}

impl<A: Address> Arena<A> {
    pub fn new(options: ArenaOptions<A>) -> Result<Self, AllocError> {
        let span = AddrSeg::from_addr_size(options.base, options.capacity);
        if options.base == A::ZERO || !span.is_valid() {
            return Err(AllocError::InvalidSegment);
        }
        let len = options
            .capacity
            .to_usize()
            .ok_or(AllocError::AllocationFailure {
                size: options.capacity.to_u64(),
            })?;

        debug!("arena mapped at {span}");
        Ok(Self {
            span,
            memory: vec![options.fill; len],
            next: A::ZERO,
            live: BTreeMap::new(),
        })
    }

    /// The mapped address range.
    pub fn span(&self) -> AddrSeg<A> {
        self.span
    }

    pub fn used(&self) -> A {
        self.next
    }

    pub fn available(&self) -> A {
        self.span.size - self.next
    }

    pub fn live_blocks(&self) -> usize {
        self.live.len()
    }

    fn offset_range(&self, seg: AddrSeg<A>) -> Option<std::ops::Range<usize>> {
        if !seg.is_inside(&self.span) {
            return None;
        }
        let offset = (seg.start - self.span.start).to_usize()?;
        let len = seg.size.to_usize()?;
        Some(offset..offset + len)
    }
}

impl<A: Address> Memory for Arena<A> {
    type Addr = A;

    fn bytes(&self, seg: AddrSeg<A>) -> Option<&[u8]> {
        let range = self.offset_range(seg)?;
        self.memory.get(range)
    }

    fn bytes_mut(&mut self, seg: AddrSeg<A>) -> Option<&mut [u8]> {
        let range = self.offset_range(seg)?;
        self.memory.get_mut(range)
    }
}

impl<A: Address> PlatformAllocator for Arena<A> {
    fn allocate(&mut self, size: A) -> Option<A> {
        if size == A::ZERO || size > self.available() {
            trace!(
                "arena cannot fit {size} units, {} available",
                self.available()
            );
            return None;
        }

        let addr = self.span.start + self.next;
        self.next = self.next + size;
        self.live.insert(addr, size);
        trace!("arena block {:#X}+{:#X}", addr, size);
        Some(addr)
    }

    fn deallocate(&mut self, addr: A, size: A) {
        if self.live.get(&addr) != Some(&size) {
            error!("arena free of unknown block {:#X}+{:#X}", addr, size);
            return;
        }
        self.live.remove(&addr);

        let offset = addr - self.span.start;
        if offset + size == self.next {
            self.next = offset;
        }
    }

    fn owns(&self, seg: AddrSeg<A>) -> bool {
        self.live.get(&seg.start) == Some(&seg.size)
    }
}
