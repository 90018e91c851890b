#![allow(dead_code)]

use addrseg::{AddrSeg, Arena, ArenaOptions, Memory, PlatformAllocator};

/// Wraps a platform and snapshots every block's bytes at the moment it is freed.
#[derive(Debug)]
pub struct Recording<P: PlatformAllocator> {
    pub inner: P,
    pub freed: Vec<(AddrSeg<P::Addr>, Vec<u8>)>,
    pub exhausted: bool,
}

impl<P: PlatformAllocator> Recording<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            freed: Vec::new(),
            exhausted: false,
        }
    }
}

impl<P: PlatformAllocator> Memory for Recording<P> {
    type Addr = P::Addr;

    fn bytes(&self, seg: AddrSeg<P::Addr>) -> Option<&[u8]> {
        self.inner.bytes(seg)
    }

    fn bytes_mut(&mut self, seg: AddrSeg<P::Addr>) -> Option<&mut [u8]> {
        self.inner.bytes_mut(seg)
    }
}

impl<P: PlatformAllocator> PlatformAllocator for Recording<P> {
    fn allocate(&mut self, size: P::Addr) -> Option<P::Addr> {
        if self.exhausted {
            return None;
        }
        self.inner.allocate(size)
    }

    fn deallocate(&mut self, addr: P::Addr, size: P::Addr) {
        let seg = AddrSeg::from_addr_size(addr, size);
        let snapshot = self.inner.bytes(seg).map(<[u8]>::to_vec).unwrap_or_default();
        self.freed.push((seg, snapshot));
        self.inner.deallocate(addr, size);
    }

    fn owns(&self, seg: AddrSeg<P::Addr>) -> bool {
        self.inner.owns(seg)
    }
}

pub fn arena16(capacity: u16) -> Arena<u16> {
    Arena::new(ArenaOptions {
        base: 0x0200,
        capacity,
        fill: 0xA5,
    })
    .unwrap()
}

/// Every segment of the 8-bit domain whose start and size fall on `step`.
pub fn u8_grid(step: usize) -> Vec<AddrSeg<u8>> {
    let mut out = Vec::new();
    for start in (0..=255u8).step_by(step) {
        for size in (0..=255u8).step_by(step) {
            out.push(AddrSeg::from_addr_size(start, size));
        }
    }
    out
}
