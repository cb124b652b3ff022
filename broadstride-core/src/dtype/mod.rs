use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Sub},
};

#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

pub(crate) use self::gemm::GemmDispatch;
pub(crate) use self::rand::RandDispatch;

mod gemm;
mod rand;

pub trait DTypeOps:
    Copy
    + PartialEq
    + Add<Output = Self>
    + Div<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + GemmDispatch
    + RandDispatch
{
}

/// Marker trait for tensor datatypes.
pub trait DType: Debug + Clone + DTypeOps + Send + Sync + 'static {
    const ZERO: Self;
    const ONE: Self;
    const NAME: &'static str;

    fn to_f64(&self) -> f64;
    fn from_f64(x: f64) -> Self;
}

macro_rules! dtype {
    ($rt:ident, $zero:expr, $one:expr) => {
        impl DTypeOps for $rt {}
        impl DType for $rt {
            const ZERO: $rt = $zero;
            const ONE: $rt = $one;
            const NAME: &'static str = stringify!($rt);

            fn to_f64(&self) -> f64 {
                *self as f64
            }
            fn from_f64(x: f64) -> Self {
                x as $rt
            }
        }
    };
}

dtype!(u8, 0u8, 1u8);
dtype!(u32, 0u32, 1u32);
dtype!(i32, 0i32, 1i32);
dtype!(i64, 0i64, 1i64);
dtype!(f32, 0f32, 1f32);
dtype!(f64, 0f64, 1f64);

#[cfg(any(feature = "half", feature = "bfloat"))]
macro_rules! half_dtype {
    ($rt:ident) => {
        impl DTypeOps for $rt {}
        impl DType for $rt {
            const ZERO: $rt = $rt::from_f64_const(0.0);
            const ONE: $rt = $rt::from_f64_const(1.0);
            const NAME: &'static str = stringify!($rt);

            fn to_f64(&self) -> f64 {
                self.to_f64_const()
            }
            fn from_f64(x: f64) -> Self {
                Self::from_f64_const(x)
            }
        }
    };
}

#[cfg(feature = "half")]
half_dtype!(f16);
#[cfg(feature = "bfloat")]
half_dtype!(bf16);
