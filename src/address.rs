use std::fmt;
use std::hash::Hash;
use std::ops::{Add, Sub};

/// Fixed-width unsigned integer used for both addresses and sizes.
///
/// Every segment computation is expressed in terms of these operations so the
/// same code covers a 16-bit embedded bus and a host `usize` heap.
pub trait Address:
    Copy
    + Ord
    + Hash
    + Default
    + fmt::Debug
    + fmt::Display
    + fmt::UpperHex
    + Add<Output = Self>
    + Sub<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    fn to_usize(self) -> Option<usize>;
    /// Widening conversion used for error reports.
    fn to_u64(self) -> u64;
    fn from_usize(value: usize) -> Option<Self>;
}

macro_rules! impl_address {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Address for $ty {
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MAX: Self = <$ty>::MAX;

                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_add(self, rhs)
                }

                fn checked_sub(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_sub(self, rhs)
                }

                fn to_usize(self) -> Option<usize> {
                    usize::try_from(self).ok()
                }

                fn to_u64(self) -> u64 {
                    self as u64
                }

                fn from_usize(value: usize) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_address!(u8, u16, u32, u64, usize);

/// Returns `true` if `addr` can be moved forward by `units` without leaving the domain.
///
/// Written as `addr <= MAX - units` so the check itself cannot overflow.
pub fn can_advance<A: Address>(addr: A, units: A) -> bool {
    addr <= A::MAX - units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_advance_u16() {
        assert!(can_advance(0u16, 0xFFFF));
        assert!(can_advance(0xFFF0u16, 0x0F));
        assert!(!can_advance(0xFFF0u16, 0x10));
        assert!(can_advance(0xFFFFu16, 0));
        assert!(!can_advance(0xFFFFu16, 1));
    }

    #[test]
    fn test_domain_constants() {
        assert_eq!(<u16 as Address>::MAX, 0xFFFF);
        assert_eq!(<u8 as Address>::MAX, 0xFF);
        assert_eq!(<u16 as Address>::ZERO + <u16 as Address>::ONE, 1);
    }

    #[test]
    fn test_usize_conversion() {
        assert_eq!(<u16 as Address>::from_usize(0x1_0000), None);
        assert_eq!(<u16 as Address>::from_usize(0xFFFF), Some(0xFFFF));
        assert_eq!(Address::to_usize(0x1234u16), Some(0x1234));
    }
}
