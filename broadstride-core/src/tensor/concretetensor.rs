use std::sync::Arc;

use crate::{device::Device, storage::Storage, Context, DType, Error, Layout, Result, Shape};

/// A strided view over shared storage.
///
/// Cloning a tensor shares its storage; only functions which allocate, copy data, or can
/// reject their arguments return `Result`s. Every view operation produces a tensor that
/// aliases the same buffer with a new [`Layout`].
#[derive(Clone)]
pub struct Tensor<T: DType> {
    pub(crate) storage: Arc<Storage<T>>,
    pub(crate) layout: Layout,
}

impl<T: DType> std::fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tensor[{:?}, stride={:?}, offset={}, dtype={}]",
            self.dims(),
            self.stride(),
            self.layout.start_offset(),
            T::NAME
        )
    }
}

pub(crate) fn from_storage<T: DType>(storage: Arc<Storage<T>>, layout: Layout) -> Tensor<T> {
    Tensor { storage, layout }
}

impl<T: DType> Tensor<T> {
    /// Create a contiguous tensor owning `data`.
    pub fn from_vec(data: Vec<T>, shape: impl Into<Shape>, device: &Device) -> Result<Self> {
        let shape = shape.into();
        if shape.element_count() != data.len() {
            return Err(Error::ElementCount {
                op: "from_vec",
                shape: shape.dims().iter().map(|&d| d as isize).collect(),
                elem_count: data.len(),
            }
            .bt());
        }
        let storage = device.storage_from_vec(data)?;
        Ok(from_storage(Arc::new(storage), Layout::contiguous(shape)))
    }

    /// A rank 0 tensor holding `v`.
    pub fn new_scalar(v: T, device: &Device) -> Result<Self> {
        Self::full(v, (), device)
    }

    /// A tensor with every element set to `v`.
    pub fn full(v: T, shape: impl Into<Shape>, device: &Device) -> Result<Self> {
        let shape = shape.into();
        let storage = device.const_impl(v, shape.element_count())?;
        Ok(from_storage(Arc::new(storage), Layout::contiguous(shape)))
    }

    pub fn zeros(shape: impl Into<Shape>, device: &Device) -> Result<Self> {
        Self::full(T::ZERO, shape, device)
    }

    pub fn ones(shape: impl Into<Shape>, device: &Device) -> Result<Self> {
        Self::full(T::ONE, shape, device)
    }

    /// A rank 1 tensor of `start, start + 1, ..` up to but excluding `end`.
    pub fn arange(start: T, end: T, device: &Device) -> Result<Self> {
        Self::arange_step(start, end, T::ONE, device)
    }

    /// A rank 1 tensor of `start, start + step, ..` up to but excluding `end`.
    pub fn arange_step(start: T, end: T, step: T, device: &Device) -> Result<Self> {
        let (start, end, step) = (start.to_f64(), end.to_f64(), step.to_f64());
        if step == 0.0 {
            crate::bail!("arange: step must be non-zero")
        }
        let len = ((end - start) / step).ceil().max(0.0) as usize;
        let data = (0..len)
            .map(|i| T::from_f64(start + i as f64 * step))
            .collect::<Vec<_>>();
        Self::from_vec(data, len, device)
    }

    /// Values drawn uniformly from `[lo, hi)`. Integral dtypes are floored.
    pub fn rand(lo: f64, hi: f64, shape: impl Into<Shape>, device: &Device) -> Result<Self> {
        let shape = shape.into();
        let storage = device.rand_uniform_impl(lo, hi, shape.element_count())?;
        Ok(from_storage(Arc::new(storage), Layout::contiguous(shape)))
    }

    /// Values drawn from a normal distribution. Only float dtypes are supported.
    pub fn randn(mean: f64, std: f64, shape: impl Into<Shape>, device: &Device) -> Result<Self> {
        let shape = shape.into();
        let storage = device.rand_normal_impl(mean, std, shape.element_count())?;
        Ok(from_storage(Arc::new(storage), Layout::contiguous(shape)))
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn shape(&self) -> &Shape {
        self.layout.shape()
    }

    pub fn dims(&self) -> &[usize] {
        self.layout.dims()
    }

    pub fn stride(&self) -> &[usize] {
        self.layout.stride()
    }

    pub fn rank(&self) -> usize {
        self.layout.rank()
    }

    pub fn elem_count(&self) -> usize {
        self.shape().element_count()
    }

    /// Size of dimension `dim`, where negative values count from the end.
    pub fn dim(&self, dim: isize) -> Result<usize> {
        self.shape().dim(dim)
    }

    pub fn device(&self) -> Device {
        self.storage.device()
    }

    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Whether `self` and `other` view the same buffer.
    pub fn same_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Number of views currently holding this tensor's storage.
    pub fn storage_ref_count(&self) -> usize {
        Arc::strong_count(&self.storage)
    }

    /// Every element in row-major logical order.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let storage = self.storage.to_cpu_storage()?;
        let data = &storage.0;
        Ok(self.layout.strided_index().map(|i| data[i]).collect())
    }

    /// The value of a rank 0 tensor.
    pub fn to_scalar(&self) -> Result<T> {
        self.expect_rank("to_scalar", 0)?;
        self.storage
            .get(self.layout.start_offset())
            .context("to_scalar: view lies outside its storage")
    }

    pub fn to_vec1(&self) -> Result<Vec<T>> {
        self.expect_rank("to_vec1", 1)?;
        self.to_vec()
    }

    pub fn to_vec2(&self) -> Result<Vec<Vec<T>>> {
        self.expect_rank("to_vec2", 2)?;
        let data = self.to_vec()?;
        let cols = self.dims()[1];
        Ok((0..self.dims()[0])
            .map(|i| data[i * cols..(i + 1) * cols].to_vec())
            .collect())
    }

    pub fn to_vec3(&self) -> Result<Vec<Vec<Vec<T>>>> {
        self.expect_rank("to_vec3", 3)?;
        let data = self.to_vec()?;
        let (d0, d1, d2) = (self.dims()[0], self.dims()[1], self.dims()[2]);
        Ok((0..d0)
            .map(|i| {
                (0..d1)
                    .map(|j| {
                        let start = (i * d1 + j) * d2;
                        data[start..start + d2].to_vec()
                    })
                    .collect()
            })
            .collect())
    }

    /// Sum of every element as a rank 0 tensor.
    pub fn sum_all(&self) -> Result<Self> {
        let sum = self.storage.sum(&self.layout)?;
        Self::new_scalar(sum, &self.device())
    }

    /// Cast this tensor to a different dtype `U`. The result is contiguous.
    pub fn cast<U: DType>(&self) -> Result<Tensor<U>> {
        let storage = self.storage.cast::<U>(&self.layout)?;
        Ok(from_storage(
            Arc::new(storage),
            Layout::contiguous(self.shape()),
        ))
    }

    pub(crate) fn expect_rank(&self, op: &'static str, expected: usize) -> Result<()> {
        if self.rank() != expected {
            return Err(Error::UnexpectedRank {
                op,
                expected,
                got: self.rank(),
            }
            .bt());
        }
        Ok(())
    }
}
