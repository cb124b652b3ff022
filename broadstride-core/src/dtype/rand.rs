use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

// Optional half-precision types
#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

use crate::{Error, Result};

/// Dispatch random fills based on the data type.
pub trait RandDispatch {
    /// Fill the slice with values drawn uniformly from `[lo, hi)`.
    fn fill_with_uniform<R: Rng + ?Sized>(rng: &mut R, out: &mut [Self], lo: f64, hi: f64) -> Result<()>
    where
        Self: Sized;

    /// Fill the slice with normal (Gaussian) random values.
    fn fill_with_normal<R: Rng + ?Sized>(
        rng: &mut R,
        out: &mut [Self],
        mean: f64,
        std: f64,
    ) -> Result<()>
    where
        Self: Sized;
}

fn uniform(lo: f64, hi: f64) -> Result<Uniform<f64>> {
    if !(lo < hi) {
        crate::bail!("uniform random fill requires lo < hi, got [{lo}, {hi})")
    }
    Ok(Uniform::new(lo, hi))
}

fn normal(mean: f64, std: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std).map_err(Error::wrap)
}

macro_rules! rand_float {
    ($rt:ident, $from:expr) => {
        impl RandDispatch for $rt {
            fn fill_with_uniform<R: Rng + ?Sized>(
                rng: &mut R,
                out: &mut [Self],
                lo: f64,
                hi: f64,
            ) -> Result<()> {
                let dist = uniform(lo, hi)?;
                for x in out.iter_mut() {
                    *x = $from(dist.sample(rng));
                }
                Ok(())
            }

            fn fill_with_normal<R: Rng + ?Sized>(
                rng: &mut R,
                out: &mut [Self],
                mean: f64,
                std: f64,
            ) -> Result<()> {
                let dist = normal(mean, std)?;
                for x in out.iter_mut() {
                    *x = $from(dist.sample(rng));
                }
                Ok(())
            }
        }
    };
}

// Integral types: uniform only, truncated toward negative infinity
macro_rules! rand_integral {
    ($rt:ident) => {
        impl RandDispatch for $rt {
            fn fill_with_uniform<R: Rng + ?Sized>(
                rng: &mut R,
                out: &mut [Self],
                lo: f64,
                hi: f64,
            ) -> Result<()> {
                let dist = uniform(lo, hi)?;
                for x in out.iter_mut() {
                    *x = dist.sample(rng).floor() as $rt;
                }
                Ok(())
            }

            fn fill_with_normal<R: Rng + ?Sized>(
                _rng: &mut R,
                _out: &mut [Self],
                _mean: f64,
                _std: f64,
            ) -> Result<()> {
                crate::bail!(
                    "Normal random fill is not supported for dtype {}",
                    stringify!($rt)
                )
            }
        }
    };
}

rand_float!(f32, |x: f64| x as f32);
rand_float!(f64, |x: f64| x);
#[cfg(feature = "half")]
rand_float!(f16, f16::from_f64);
#[cfg(feature = "bfloat")]
rand_float!(bf16, bf16::from_f64);

rand_integral!(u8);
rand_integral!(u32);
rand_integral!(i32);
rand_integral!(i64);
