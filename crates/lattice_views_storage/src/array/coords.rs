use core::ops::{Add, AddAssign};

/// The most efficient coordinates for slice-backed stores. A single number that translates directly to a slice offset.
///
/// Every store in this crate lays out its samples with the first axis varying fastest, so a `Stride` means the same thing for
/// an array and for the flag array that shadows it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Stride(pub usize);

impl Add for Stride {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Stride {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
