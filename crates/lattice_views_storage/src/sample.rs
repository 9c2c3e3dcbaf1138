//! Numeric element types that stores can hold.

use core::fmt::Debug;
use core::hash::{Hash, Hasher};
use float_ord::FloatOrd;
use lattice_views_core::num::{Num, NumCast, ToPrimitive};

/// Runtime description of a store's element type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementType {
    U8,
    I16,
    I32,
    I64,
    U64,
    F32,
    F64,
}

impl ElementType {
    /// The size of one element in bytes.
    pub fn byte_width(&self) -> usize {
        match self {
            ElementType::U8 => 1,
            ElementType::I16 => 2,
            ElementType::I32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::U64 | ElementType::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }
}

/// A numeric sample.
///
/// Floating point samples are only valid when they are not NaN. Hashing goes through `FloatOrd` so that stores of floats can
/// take part in structural `Hash` impls.
pub trait Sample:
    'static
    + bytemuck::Pod
    + Copy
    + Debug
    + Default
    + Num
    + NumCast
    + PartialOrd
    + Send
    + Sync
    + ToPrimitive
{
    const ELEMENT_TYPE: ElementType;

    fn is_valid_sample(&self) -> bool;

    fn hash_sample<H: Hasher>(&self, state: &mut H);

    /// Lossy conversion used for range tests.
    #[inline]
    fn as_f64(&self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

macro_rules! impl_integer_sample {
    ($t:ty, $element:ident) => {
        impl Sample for $t {
            const ELEMENT_TYPE: ElementType = ElementType::$element;

            #[inline]
            fn is_valid_sample(&self) -> bool {
                true
            }

            #[inline]
            fn hash_sample<H: Hasher>(&self, state: &mut H) {
                self.hash(state)
            }
        }
    };
}

macro_rules! impl_float_sample {
    ($t:ty, $element:ident) => {
        impl Sample for $t {
            const ELEMENT_TYPE: ElementType = ElementType::$element;

            #[inline]
            fn is_valid_sample(&self) -> bool {
                !self.is_nan()
            }

            #[inline]
            fn hash_sample<H: Hasher>(&self, state: &mut H) {
                FloatOrd(*self).hash(state)
            }
        }
    };
}

impl_integer_sample!(u8, U8);
impl_integer_sample!(i16, I16);
impl_integer_sample!(i32, I32);
impl_integer_sample!(i64, I64);
impl_integer_sample!(u64, U64);
impl_float_sample!(f32, F32);
impl_float_sample!(f64, F64);

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
