use std::borrow::Cow;

use crate::{cpu_storage::CpuStorage, device::Device, DType, Layout, Result};

/// The buffer behind one or more tensor views.
pub enum Storage<T: DType> {
    Cpu(CpuStorage<T>),
}

impl<T: DType> Storage<T> {
    pub(crate) fn to_cpu_storage(&self) -> Result<Cow<'_, CpuStorage<T>>> {
        match self {
            Self::Cpu(cpu) => cpu.to_cpu_storage(),
        }
    }

    pub fn device(&self) -> Device {
        match self {
            Self::Cpu(_) => Device::Cpu,
        }
    }

    /// Number of elements allocated.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Cpu(cpu) => cpu.len(),
        }
    }

    /// Read the element at a linear storage offset.
    pub(crate) fn get(&self, offset: usize) -> Option<T> {
        match self {
            Self::Cpu(cpu) => cpu.0.get(offset).copied(),
        }
    }

    /// Copy the elements addressed by `layout` into a new dense buffer.
    pub(crate) fn copy_strided(&self, layout: &Layout) -> Result<Self> {
        match self {
            Self::Cpu(cpu) => Ok(Self::Cpu(cpu.copy_strided(layout)?)),
        }
    }

    pub(crate) fn matmul(
        &self,
        rhs: &Self,
        bmnk: (usize, usize, usize, usize),
        lhs_l: &Layout,
        rhs_l: &Layout,
    ) -> Result<Self> {
        match (self, rhs) {
            (Self::Cpu(lhs), Self::Cpu(rhs)) => {
                Ok(Self::Cpu(lhs.matmul(rhs, bmnk, lhs_l, rhs_l)?))
            }
        }
    }

    pub(crate) fn sum(&self, layout: &Layout) -> Result<T> {
        match self {
            Self::Cpu(cpu) => cpu.sum(layout),
        }
    }

    pub(crate) fn cast<U: DType>(&self, layout: &Layout) -> Result<Storage<U>> {
        match self {
            Self::Cpu(cpu) => Ok(Storage::Cpu(cpu.cast::<U>(layout)?)),
        }
    }
}

pub trait BackendStorage<T: DType>: Sized {
    fn to_cpu_storage(&self) -> Result<Cow<'_, CpuStorage<T>>>;

    fn len(&self) -> usize;

    /// Gather the elements addressed by `layout` into a dense row-major buffer.
    fn copy_strided(&self, layout: &Layout) -> Result<Self>;

    /// Batched matrix multiply of dense `(b, m, k)` and `(b, k, n)` operands.
    fn matmul(
        &self,
        rhs: &Self,
        bmnk: (usize, usize, usize, usize),
        lhs_l: &Layout,
        rhs_l: &Layout,
    ) -> Result<Self>;

    /// Sum of every element addressed by `layout`.
    fn sum(&self, layout: &Layout) -> Result<T>;
}

pub trait BackendDevice {
    type Storage<X: DType>: BackendStorage<X>;

    fn storage_from_vec<T: DType>(&self, data: Vec<T>) -> Result<Self::Storage<T>>;

    fn const_impl<T: DType>(&self, v: T, elem_count: usize) -> Result<Self::Storage<T>>;

    fn rand_uniform_impl<T: DType>(
        &self,
        lo: f64,
        hi: f64,
        elem_count: usize,
    ) -> Result<Self::Storage<T>>;

    fn rand_normal_impl<T: DType>(
        &self,
        mean: f64,
        std: f64,
        elem_count: usize,
    ) -> Result<Self::Storage<T>>;
}
