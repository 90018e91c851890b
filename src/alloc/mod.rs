//! Reservation and release of segment-backed memory.
//!
//! [`SegmentAllocator`] is the only code that talks to a [`PlatformAllocator`].
//! Every span it hands out is zero-filled, and every span it takes back is
//! zero-filled again before the platform sees it.

mod arena;
mod error;
mod heap;

use std::cell::{Ref, RefCell, RefMut};

use log::{debug, trace, warn};

use crate::{Address, AddrSeg, OwnedSegment};

pub use arena::{Arena, ArenaOptions};
pub use error::AllocError;
pub use heap::Heap;

/// Bounds-checked access to the bytes behind a segment.
pub trait Memory {
    type Addr: Address;

    /// View over exactly `seg.size` bytes at `seg.start`, or `None` if any part of
    /// the segment is outside memory this platform controls.
    fn bytes(&self, seg: AddrSeg<Self::Addr>) -> Option<&[u8]>;

    fn bytes_mut(&mut self, seg: AddrSeg<Self::Addr>) -> Option<&mut [u8]>;
}

/// The allocator underneath [`SegmentAllocator`].
pub trait PlatformAllocator: Memory {
    /// Provide `size` units. `None` or a zero address means failure.
    fn allocate(&mut self, size: Self::Addr) -> Option<Self::Addr>;

    fn deallocate(&mut self, addr: Self::Addr, size: Self::Addr);

    /// `true` if `seg` is exactly a block returned by `allocate` and not yet freed.
    fn owns(&self, seg: AddrSeg<Self::Addr>) -> bool;
}

/// What `reserve` does with a request for zero units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroSizePolicy {
    /// Fail with [`AllocError::ZeroSize`].
    #[default]
    Reject,
    /// Succeed without allocating; the target stays the sentinel.
    Succeed,
}

/// Options for a [`SegmentAllocator`].
#[derive(Debug, Clone, Default)]
pub struct AllocOptions {
    pub zero_size: ZeroSizePolicy,
}

/// Single choke point between segments and the platform allocator.
///
/// Takes `&self` everywhere so several owners can share one allocator. Byte
/// views returned by [`bytes`](Self::bytes) and [`bytes_mut`](Self::bytes_mut)
/// borrow the platform; while one is alive, mutating calls report
/// [`AllocError::Busy`].
#[derive(Debug)]
pub struct SegmentAllocator<P: PlatformAllocator> {
    platform: RefCell<P>,
    options: AllocOptions,
}

impl<P: PlatformAllocator> SegmentAllocator<P> {
    pub fn new(platform: P) -> Self {
        Self::with_options(platform, AllocOptions::default())
    }

    pub fn with_options(platform: P, options: AllocOptions) -> Self {
        Self {
            platform: RefCell::new(platform),
            options,
        }
    }

    pub fn options(&self) -> &AllocOptions {
        &self.options
    }

    pub fn platform(&self) -> Option<Ref<'_, P>> {
        self.platform.try_borrow().ok()
    }

    pub fn into_platform(self) -> P {
        self.platform.into_inner()
    }

    fn platform_mut(&self) -> Result<RefMut<'_, P>, AllocError> {
        self.platform.try_borrow_mut().map_err(|_| AllocError::Busy)
    }

    /// Reserve `size` units into `seg`, zero-filled.
    ///
    /// `seg` must not describe a valid span; any other invalid value is reset to
    /// the sentinel first. On failure `seg` is left as the sentinel.
    pub fn reserve(&self, seg: &mut AddrSeg<P::Addr>, size: P::Addr) -> Result<(), AllocError> {
        if seg.is_valid() {
            return Err(AllocError::AlreadyReserved);
        }
        seg.invalidate();

        if size == P::Addr::ZERO {
            return match self.options.zero_size {
                ZeroSizePolicy::Reject => Err(AllocError::ZeroSize),
                ZeroSizePolicy::Succeed => {
                    trace!("zero size reservation, nothing allocated");
                    Ok(())
                }
            };
        }

        let mut platform = self.platform_mut()?;
        let Some(addr) = platform
            .allocate(size)
            .filter(|addr| *addr != P::Addr::ZERO)
        else {
            warn!("allocation of {size} units failed");
            return Err(AllocError::AllocationFailure {
                size: size.to_u64(),
            });
        };

        let block = AddrSeg::from_addr_size(addr, size);
        let mapped = match platform.bytes_mut(block) {
            Some(bytes) => {
                bytes.fill(0);
                true
            }
            None => false,
        };
        if !mapped {
            warn!("platform returned unmapped block {block}");
            platform.deallocate(addr, size);
            return Err(AllocError::Unmapped);
        }

        debug!("reserved {block}");
        *seg = block;
        Ok(())
    }

    /// Zero-fill, free and invalidate `seg`.
    ///
    /// An invalid segment is ignored. A valid segment is invalidated whatever the
    /// outcome, with one exception: on [`AllocError::Busy`] it is left intact so
    /// the call can be retried once the live byte view is gone.
    ///
    /// A block is only freed after it was zero-filled. A segment that is not a
    /// live block of the platform is reported as [`AllocError::NotOwned`], and a
    /// live block the platform cannot map is reported as [`AllocError::Unmapped`].
    /// Neither is freed.
    pub fn release(&self, seg: &mut AddrSeg<P::Addr>) -> Result<(), AllocError> {
        if !seg.is_valid() {
            trace!("release of invalid segment ignored");
            return Ok(());
        }

        let block = *seg;
        let mut platform = self.platform_mut()?;
        seg.invalidate();

        if !platform.owns(block) {
            warn!("refusing to free {block}: not a live block");
            return Err(AllocError::NotOwned);
        }

        let Some(bytes) = platform.bytes_mut(block) else {
            warn!("refusing to free {block}: block is not mapped, cannot zero-fill");
            return Err(AllocError::Unmapped);
        };
        bytes.fill(0);
        platform.deallocate(block.start, block.size);

        debug!("released {block}");
        Ok(())
    }

    /// Reserve `size` units behind a handle that releases them on drop.
    pub fn reserve_owned(&self, size: P::Addr) -> Result<OwnedSegment<'_, P>, AllocError> {
        let mut seg = AddrSeg::sentinel();
        self.reserve(&mut seg, size)?;
        Ok(OwnedSegment::new(self, seg))
    }

    pub fn bytes(&self, seg: AddrSeg<P::Addr>) -> Option<Ref<'_, [u8]>> {
        let platform = self.platform.try_borrow().ok()?;
        Ref::filter_map(platform, |p| p.bytes(seg)).ok()
    }

    pub fn bytes_mut(&self, seg: AddrSeg<P::Addr>) -> Option<RefMut<'_, [u8]>> {
        let platform = self.platform.try_borrow_mut().ok()?;
        RefMut::filter_map(platform, |p| p.bytes_mut(seg)).ok()
    }

    pub fn zero_mem(&self, seg: AddrSeg<P::Addr>) -> Result<(), AllocError> {
        if !seg.is_valid() {
            return Err(AllocError::InvalidSegment);
        }
        let mut platform = self.platform_mut()?;
        let bytes = platform.bytes_mut(seg).ok_or(AllocError::Unmapped)?;
        bytes.fill(0);
        Ok(())
    }

    /// Copy the contents of `src` into `dest`. They must be compatible.
    pub fn copy_mem_to(
        &self,
        dest: AddrSeg<P::Addr>,
        src: AddrSeg<P::Addr>,
    ) -> Result<(), AllocError> {
        if !src.is_valid() || !dest.is_valid() {
            return Err(AllocError::InvalidSegment);
        }
        if !src.are_compatible(&dest) {
            return Err(AllocError::Incompatible);
        }

        let mut platform = self.platform_mut()?;
        let data = platform.bytes(src).ok_or(AllocError::Unmapped)?.to_vec();
        let target = platform.bytes_mut(dest).ok_or(AllocError::Unmapped)?;
        target.copy_from_slice(&data);
        Ok(())
    }

    /// Same size and same bytes. Unreadable segments are never equal.
    pub fn are_equal(&self, a: AddrSeg<P::Addr>, b: AddrSeg<P::Addr>) -> bool {
        if !a.is_valid() || !b.is_valid() {
            return false;
        }
        if !a.is_same_size(&b) {
            return false;
        }
        let Ok(platform) = self.platform.try_borrow() else {
            return false;
        };
        match (platform.bytes(a), platform.bytes(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Byte at `offset` inside `seg`.
    pub fn get_byte(&self, seg: AddrSeg<P::Addr>, offset: P::Addr) -> Option<u8> {
        if offset >= seg.size {
            return None;
        }
        let index = offset.to_usize()?;
        self.bytes(seg).map(|bytes| bytes[index])
    }

    /// Segment covering the zero-terminated string at `addr`, terminator excluded.
    ///
    /// An empty string yields a zero-size (invalid) segment at `addr`. Returns
    /// `None` if no terminator is found before leaving mapped memory.
    pub fn asciiz_at(&self, addr: P::Addr) -> Option<AddrSeg<P::Addr>> {
        let platform = self.platform.try_borrow().ok()?;
        let mut len = P::Addr::ZERO;
        let mut cursor = addr;
        loop {
            let byte = platform.bytes(AddrSeg::from_addr_size(cursor, P::Addr::ONE))?[0];
            if byte == 0 {
                return Some(AddrSeg::from_addr_size(addr, len));
            }
            len = len.checked_add(P::Addr::ONE)?;
            cursor = cursor.checked_add(P::Addr::ONE)?;
        }
    }

    /// Human-readable dump of `seg` and its contents.
    pub fn describe(&self, seg: AddrSeg<P::Addr>) -> String {
        match self.bytes(seg) {
            Some(bytes) => crate::dump::describe(seg, Some(&*bytes)),
            None => crate::dump::describe(seg, None),
        }
    }
}
