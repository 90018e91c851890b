use std::iter::FusedIterator;

use crate::{Address, AddrSeg, SegmentError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State<A: Address> {
    Ready { current: A, max: A },
    Exhausted,
}

/// Walks the addresses of a valid segment in increasing order.
///
/// Once exhausted it stays exhausted until [`restart`](Self::restart) is called.
/// Reaching `A::MAX` ends the walk instead of wrapping to zero.
#[derive(Debug, Clone)]
pub struct SegmentIterator<A: Address> {
    state: State<A>,
}

impl<A: Address> SegmentIterator<A> {
    pub fn new(segment: AddrSeg<A>) -> Result<Self, SegmentError> {
        let max = segment.end_addr().ok_or(SegmentError::InvalidSegment)?;
        Ok(Self {
            state: State::Ready {
                current: segment.start,
                max,
            },
        })
    }

    /// Rebind to `segment`. On error the iterator keeps its current state.
    pub fn restart(&mut self, segment: AddrSeg<A>) -> Result<(), SegmentError> {
        *self = Self::new(segment)?;
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    pub fn next_addr(&mut self) -> Option<A> {
        let State::Ready { current, max } = self.state else {
            return None;
        };

        self.state = match current.checked_add(A::ONE) {
            Some(next) if next <= max => State::Ready { current: next, max },
            _ => State::Exhausted,
        };

        Some(current)
    }

    fn remaining(&self) -> Option<usize> {
        match self.state {
            State::Ready { current, max } => (max - current).to_usize()?.checked_add(1),
            State::Exhausted => Some(0),
        }
    }
}

impl<A: Address> Iterator for SegmentIterator<A> {
    type Item = A;

    fn next(&mut self) -> Option<A> {
        self.next_addr()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining() {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl<A: Address> FusedIterator for SegmentIterator<A> {}

impl<A: Address> AddrSeg<A> {
    /// Iterator over every address in the segment.
    pub fn addresses(&self) -> Result<SegmentIterator<A>, SegmentError> {
        SegmentIterator::new(*self)
    }
}
