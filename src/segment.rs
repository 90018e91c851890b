use std::ffi::CStr;
use std::fmt;

use crate::address::{Address, can_advance};

/// A contiguous span of `size` addressable units starting at `start`.
///
/// The all-zero value is the invalid sentinel. A segment is valid when it is
/// non-empty and its last address does not wrap past `A::MAX`.
///
/// `AddrSeg` does not record whether it owns the memory it describes. Values
/// built with [`AddrSeg::from_addr_size`] are views; values filled in by
/// [`SegmentAllocator::reserve`](crate::SegmentAllocator::reserve) own their
/// block and must pass through exactly one release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AddrSeg<A: Address> {
    pub start: A,
    pub size: A,
}

impl<A: Address> AddrSeg<A> {
    /// Describe an existing span. Does not allocate.
    pub fn from_addr_size(start: A, size: A) -> Self {
        Self { start, size }
    }

    /// The `{0, 0}` sentinel.
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.size != A::ZERO && can_advance(self.start, self.size - A::ONE)
    }

    pub fn is_sentinel(&self) -> bool {
        self.start == A::ZERO && self.size == A::ZERO
    }

    /// Reset to the sentinel. Memory is not freed.
    pub fn invalidate(&mut self) {
        self.start = A::ZERO;
        self.size = A::ZERO;
    }

    /// Last address covered, or `None` for an invalid segment.
    pub fn end_addr(&self) -> Option<A> {
        self.is_valid().then(|| self.end())
    }

    /// Caller must have checked `is_valid()`.
    pub(crate) fn end(&self) -> A {
        self.start + (self.size - A::ONE)
    }

    pub fn contains_addr(&self, addr: A) -> bool {
        self.is_valid() && addr >= self.start && addr <= self.end()
    }

    pub fn is_same_size(&self, other: &Self) -> bool {
        self.size == other.size
    }

    /// Both fields equal. Says nothing about validity.
    pub fn is_same_rec(&self, other: &Self) -> bool {
        self.start == other.start && self.size == other.size
    }
}

impl AddrSeg<usize> {
    /// View over a host byte slice.
    ///
    /// An empty slice yields a segment of size zero, which is invalid.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::from_addr_size(bytes.as_ptr() as usize, bytes.len())
    }

    /// View over the characters of a C string. The terminating zero is not counted.
    pub fn from_cstr(s: &CStr) -> Self {
        Self::from_addr_size(s.as_ptr() as usize, s.to_bytes().len())
    }
}

impl<A: Address> fmt::Display for AddrSeg<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end_addr() {
            Some(end) => write!(f, "{:#X}..={:#X} ({} units)", self.start, end, self.size),
            None => write!(f, "<invalid {:#X}+{:#X}>", self.start, self.size),
        }
    }
}
