use crate::{Address, AddrSeg};

impl<A: Address> AddrSeg<A> {
    /// `true` if both segments are valid and share at least one address.
    ///
    /// Invalid segments intersect nothing, not even an identical copy.
    pub fn intersects(&self, other: &Self) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }

        let (first, second) = if self.start < other.start {
            (self, other)
        } else {
            (other, self)
        };

        first.end() >= second.start
    }

    /// `true` if `self` lies entirely within `outer`.
    ///
    /// An invalid segment belongs to nothing, itself included.
    pub fn is_inside(&self, outer: &Self) -> bool {
        if !self.is_valid() || !outer.is_valid() {
            return false;
        }

        self.start >= outer.start && self.end() <= outer.end()
    }

    /// Same size and no shared address: the two may be copied into each other.
    pub fn are_compatible(&self, other: &Self) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }

        self.is_same_size(other) && !self.intersects(other)
    }

    /// The shared sub-segment, if the two intersect.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        Some(Self::from_addr_size(start, end - start + A::ONE))
    }
}
