use ::gemm::{gemm, Parallelism};

#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

pub trait GemmDispatch {
    #[allow(clippy::too_many_arguments)]
    // Matrix multiplication: (B x M x K) * (B x K x N) = (B x M x N)
    /// out = out * alpha + beta * lhs * rhs
    fn launch_gemm(
        lhs: &[Self],
        lhs_stride: &[usize],
        rhs: &[Self],
        rhs_stride: &[usize],
        b: usize,
        m: usize,
        n: usize,
        k: usize,
        out: &mut [Self],
        out_stride: &[usize],
        alpha: Self,
        beta: Self,
    ) where
        Self: Sized;
}

macro_rules! instantiate_gemm {
    ($rt:ident, $init:expr, NAIVE) => {
        impl GemmDispatch for $rt {
            fn launch_gemm(
                lhs: &[Self],
                lhs_stride: &[usize],
                rhs: &[Self],
                rhs_stride: &[usize],
                b: usize,
                m: usize,
                n: usize,
                k: usize,
                out: &mut [Self],
                out_stride: &[usize],
                alpha: Self,
                beta: Self,
            ) where
                Self: Sized,
            {
                let lhs_bs = lhs_stride[0];
                let lhs_rs = lhs_stride[1];
                let lhs_cs = lhs_stride[2];

                let rhs_bs = rhs_stride[0];
                let rhs_rs = rhs_stride[1];
                let rhs_cs = rhs_stride[2];

                let out_bs = out_stride[0];
                let out_rs = out_stride[1];
                let out_cs = out_stride[2];

                for batch_idx in 0..b {
                    for i in 0..m {
                        for j in 0..n {
                            let mut sum = $init;
                            for p in 0..k {
                                let lhs_val = lhs[batch_idx * lhs_bs + i * lhs_rs + p * lhs_cs];
                                let rhs_val = rhs[batch_idx * rhs_bs + p * rhs_rs + j * rhs_cs];
                                sum = sum + beta * lhs_val * rhs_val;
                            }
                            let out_idx = batch_idx * out_bs + i * out_rs + j * out_cs;
                            out[out_idx] = alpha * out[out_idx] + sum;
                        }
                    }
                }
            }
        }
    };

    ($rt:ident, $zero:expr, GEMM) => {
        impl GemmDispatch for $rt {
            fn launch_gemm(
                lhs: &[Self],
                lhs_stride: &[usize],
                rhs: &[Self],
                rhs_stride: &[usize],
                b: usize,
                m: usize,
                n: usize,
                k: usize,
                out: &mut [Self],
                out_stride: &[usize],
                alpha: Self,
                beta: Self,
            ) where
                Self: Sized,
            {
                let num_threads = num_cpus::get();
                let parallelism = if num_threads > 1 {
                    Parallelism::Rayon(num_threads)
                } else {
                    Parallelism::None
                };

                debug_assert_eq!(lhs_stride.len(), 3);
                debug_assert_eq!(rhs_stride.len(), 3);
                debug_assert_eq!(out_stride.len(), 3);
                debug_assert!(out.len() >= b * m * n);

                // bs = stride[0], rs = stride[1], cs = stride[2]
                let (lhs_bs, lhs_rs, lhs_cs) = (lhs_stride[0], lhs_stride[1], lhs_stride[2]);
                let (rhs_bs, rhs_rs, rhs_cs) = (rhs_stride[0], rhs_stride[1], rhs_stride[2]);
                let (dst_bs, dst_rs, dst_cs) = (out_stride[0], out_stride[1], out_stride[2]);

                let read_dst = alpha != $zero;

                for b in 0..b {
                    let lhs_p = &lhs[b * lhs_bs..];
                    let rhs_p = &rhs[b * rhs_bs..];
                    let out_p = &mut out[b * dst_bs..];

                    unsafe {
                        gemm(
                            /* m: usize = */ m,
                            /* n: usize = */ n,
                            /* k: usize = */ k,
                            /* dst: *mut T = */ out_p.as_mut_ptr(),
                            /* dst_cs: isize = */ dst_cs as isize,
                            /* dst_rs: isize = */ dst_rs as isize,
                            /* read_dst: bool = */ read_dst,
                            /* lhs: *const T = */ lhs_p.as_ptr(),
                            /* lhs_cs: isize = */ lhs_cs as isize,
                            /* lhs_rs: isize = */ lhs_rs as isize,
                            /* rhs: *const T = */ rhs_p.as_ptr(),
                            /* rhs_cs: isize = */ rhs_cs as isize,
                            /* rhs_rs: isize = */ rhs_rs as isize,
                            /* alpha: T = */ alpha,
                            /* beta: T = */ beta,
                            /* conj_dst: bool = */ false,
                            /* conj_lhs: bool = */ false,
                            /* conj_rhs: bool = */ false,
                            parallelism,
                        )
                    }
                }
            }
        }
    };
}

instantiate_gemm!(u8, 0, NAIVE);
instantiate_gemm!(u32, 0, NAIVE);
instantiate_gemm!(i32, 0, NAIVE);
instantiate_gemm!(i64, 0, NAIVE);
instantiate_gemm!(f32, 0., GEMM);
instantiate_gemm!(f64, 0., GEMM);
#[cfg(feature = "bfloat")]
// Use naive implementation for bf16 to avoid CPU SIMD half-precision assembly requirements
instantiate_gemm!(bf16, bf16::from_f32_const(0.), NAIVE);
#[cfg(feature = "half")]
// Use naive implementation for f16 to avoid CPU SIMD half-precision assembly requirements
instantiate_gemm!(f16, f16::from_f32_const(0.), NAIVE);
