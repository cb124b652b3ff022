use std::borrow::Cow;

use log::trace;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::{
    layout::KernelGeometry,
    storage::{BackendDevice, BackendStorage},
    DType, Error, Layout, Result,
};

pub struct CpuDevice;

#[derive(Clone, Debug)]
pub struct CpuStorage<T: DType>(pub(crate) Vec<T>);

impl<T: DType> CpuStorage<T> {
    pub(crate) fn cast<U: DType>(&self, layout: &Layout) -> Result<CpuStorage<U>> {
        let data = layout
            .strided_index()
            .map(|i| U::from_f64(self.0[i].to_f64()))
            .collect();
        Ok(CpuStorage(data))
    }
}

impl<T: DType> BackendStorage<T> for CpuStorage<T> {
    fn to_cpu_storage(&self) -> Result<Cow<'_, CpuStorage<T>>> {
        Ok(Cow::Borrowed(self))
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn copy_strided(&self, layout: &Layout) -> Result<Self> {
        let elem_count = layout.shape().element_count();
        trace!(
            "copy_strided: {elem_count} elements from {:?} stride {:?} offset {}",
            layout.dims(),
            layout.stride(),
            layout.start_offset()
        );
        if elem_count == 0 {
            return Ok(CpuStorage(Vec::new()));
        }
        if layout.is_contiguous() {
            let start = layout.start_offset();
            return Ok(CpuStorage(self.0[start..start + elem_count].to_vec()));
        }
        let kernel = KernelGeometry::from_layout(layout);
        let src = &self.0;
        let mut out = vec![T::ZERO; kernel.elem_count()];
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = src[kernel.offset_of(i)]);
        Ok(CpuStorage(out))
    }

    fn matmul(
        &self,
        rhs: &Self,
        (b, m, n, k): (usize, usize, usize, usize),
        lhs_l: &Layout,
        rhs_l: &Layout,
    ) -> Result<Self> {
        if !lhs_l.is_contiguous() || !rhs_l.is_contiguous() {
            return Err(Error::MatMulNonContiguous {
                lhs_stride: lhs_l.stride().to_vec(),
                rhs_stride: rhs_l.stride().to_vec(),
                mnk: (m, n, k),
            }
            .bt());
        }

        let mut out = vec![T::ZERO; b * m * n];
        // Nothing to accumulate: the product of an empty contraction is all zeros.
        if out.is_empty() || k == 0 {
            return Ok(CpuStorage(out));
        }

        let lhs = &self.0[lhs_l.start_offset()..lhs_l.start_offset() + b * m * k];
        let rhs = &rhs.0[rhs_l.start_offset()..rhs_l.start_offset() + b * k * n];
        T::launch_gemm(
            lhs,
            &[m * k, k, 1],
            rhs,
            &[k * n, n, 1],
            b,
            m,
            n,
            k,
            &mut out,
            &[m * n, n, 1],
            T::ZERO,
            T::ONE,
        );
        Ok(CpuStorage(out))
    }

    fn sum(&self, layout: &Layout) -> Result<T> {
        Ok(layout
            .strided_index()
            .fold(T::ZERO, |acc, i| acc + self.0[i]))
    }
}

impl BackendDevice for CpuDevice {
    type Storage<X: DType> = CpuStorage<X>;

    fn storage_from_vec<T: DType>(&self, data: Vec<T>) -> Result<Self::Storage<T>> {
        Ok(CpuStorage(data))
    }

    fn const_impl<T: DType>(&self, v: T, elem_count: usize) -> Result<Self::Storage<T>> {
        Ok(CpuStorage(vec![v; elem_count]))
    }

    fn rand_uniform_impl<T: DType>(
        &self,
        lo: f64,
        hi: f64,
        elem_count: usize,
    ) -> Result<Self::Storage<T>> {
        let mut data = vec![T::ZERO; elem_count];
        T::fill_with_uniform(&mut rand::thread_rng(), &mut data, lo, hi)?;
        Ok(CpuStorage(data))
    }

    fn rand_normal_impl<T: DType>(
        &self,
        mean: f64,
        std: f64,
        elem_count: usize,
    ) -> Result<Self::Storage<T>> {
        let mut data = vec![T::ZERO; elem_count];
        T::fill_with_normal(&mut rand::thread_rng(), &mut data, mean, std)?;
        Ok(CpuStorage(data))
    }
}
