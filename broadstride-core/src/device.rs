use crate::{
    cpu_storage::CpuDevice,
    storage::{BackendDevice, Storage},
    DType, Result,
};

/// A concrete device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Cpu,
}

impl Device {
    pub(crate) fn storage_from_vec<T: DType>(&self, data: Vec<T>) -> Result<Storage<T>> {
        match self {
            Self::Cpu => Ok(Storage::Cpu(CpuDevice.storage_from_vec(data)?)),
        }
    }

    pub(crate) fn const_impl<T: DType>(&self, v: T, elem_count: usize) -> Result<Storage<T>> {
        match self {
            Self::Cpu => Ok(Storage::Cpu(CpuDevice.const_impl(v, elem_count)?)),
        }
    }

    pub(crate) fn rand_uniform_impl<T: DType>(
        &self,
        lo: f64,
        hi: f64,
        elem_count: usize,
    ) -> Result<Storage<T>> {
        match self {
            Self::Cpu => Ok(Storage::Cpu(
                CpuDevice.rand_uniform_impl(lo, hi, elem_count)?,
            )),
        }
    }

    pub(crate) fn rand_normal_impl<T: DType>(
        &self,
        mean: f64,
        std: f64,
        elem_count: usize,
    ) -> Result<Storage<T>> {
        match self {
            Self::Cpu => Ok(Storage::Cpu(
                CpuDevice.rand_normal_impl(mean, std, elem_count)?,
            )),
        }
    }
}
