//! View operations: every function here derives a new [`Layout`] over the tensor's existing
//! storage. Only [`Tensor::contiguous`] (and [`Tensor::reshape`] of a strided view) copies.
//!
//! Each geometry primitive has a functional form returning a new tensor and an in-place
//! form (suffixed `_`) that overwrites the layout of `self`. Both compute the full new
//! geometry before anything is assigned, so a failed call leaves `self` untouched.

use std::sync::Arc;

use log::{debug, trace};

use crate::{
    broadcast::as_targets,
    geometry::{
        check_congruent, expand_geometry, narrow_geometry, permute_geometry, squeeze_dim_geometry,
        squeeze_geometry, transpose_geometry, unsqueeze_geometry, wrap_dim, Geometry,
    },
    tensor::concretetensor::from_storage,
    DType, Error, Layout, Result, Shape, Tensor,
};

fn strided_geometry(shape: Shape, stride: Vec<usize>) -> Result<Geometry> {
    check_congruent("as_strided", &shape, &stride)?;
    Ok(Geometry { shape, stride })
}

/// Resolve a requested shape containing at most one `-1` against `elem_count`.
fn infer_shape(op: &'static str, dims: &[isize], elem_count: usize) -> Result<Shape> {
    let bad_shape = || {
        Error::ElementCount {
            op,
            shape: dims.to_vec(),
            elem_count,
        }
        .bt()
    };
    let mut infer = None;
    let mut known = 1usize;
    for (i, &d) in dims.iter().enumerate() {
        match d {
            -1 if infer.is_none() => infer = Some(i),
            d if d < 0 => return Err(bad_shape()),
            d => known *= d as usize,
        }
    }
    let mut resolved = dims.iter().map(|&d| d.max(0) as usize).collect::<Vec<_>>();
    match infer {
        // A zero-sized known part leaves the unspecified dimension undetermined.
        Some(_) if known == 0 => return Err(bad_shape()),
        Some(_) if elem_count % known != 0 => return Err(bad_shape()),
        Some(i) => resolved[i] = elem_count / known,
        None if known != elem_count => return Err(bad_shape()),
        None => (),
    }
    Ok(Shape::from(resolved))
}

impl<T: DType> Tensor<T> {
    fn derive(&self, op: &'static str, geometry: Geometry, start_offset: usize) -> Self {
        trace!(
            "{op}: {:?}/{:?} -> {:?}/{:?}",
            self.dims(),
            self.stride(),
            geometry.dims(),
            geometry.stride
        );
        let layout = Layout::from_geometry(geometry, start_offset);
        debug_assert!(
            layout.fits_in(self.storage.len()),
            "{op}: view {layout:?} exceeds storage of {} elements",
            self.storage.len()
        );
        from_storage(self.storage.clone(), layout)
    }

    fn set_geometry(&mut self, op: &'static str, geometry: Geometry) {
        trace!(
            "{op}_: {:?}/{:?} -> {:?}/{:?}",
            self.dims(),
            self.stride(),
            geometry.dims(),
            geometry.stride
        );
        let layout = Layout::from_geometry(geometry, self.layout.start_offset());
        debug_assert!(
            layout.fits_in(self.storage.len()),
            "{op}_: view {layout:?} exceeds storage of {} elements",
            self.storage.len()
        );
        self.layout = layout;
    }

    /// A view of the same storage and offset with the given sizes and strides.
    ///
    /// The caller is responsible for keeping every addressed element inside the storage;
    /// this is only checked in debug builds.
    pub fn as_strided(&self, shape: impl Into<Shape>, stride: Vec<usize>) -> Result<Self> {
        let geometry = strided_geometry(shape.into(), stride)?;
        Ok(self.derive("as_strided", geometry, self.layout.start_offset()))
    }

    /// Replace this view's sizes and strides in place.
    pub fn as_strided_(&mut self, shape: impl Into<Shape>, stride: Vec<usize>) -> Result<()> {
        let geometry = strided_geometry(shape.into(), stride)?;
        self.set_geometry("as_strided", geometry);
        Ok(())
    }

    /// Broadcast to `target`, aligning dimensions at the innermost end.
    ///
    /// `-1` keeps the size of an existing dimension. Size 1 dimensions stretch with stride
    /// `0`; new leading dimensions may be prepended.
    ///
    /// ```
    /// use broadstride_core::{Device, Tensor};
    ///
    /// let t = Tensor::<f32>::zeros((3, 1, 5), &Device::Cpu).unwrap();
    /// let e = t.expand(&[3, 4, 5]).unwrap();
    /// assert_eq!(e.dims(), &[3, 4, 5]);
    /// assert_eq!(e.stride(), &[5, 0, 1]);
    /// assert!(e.same_storage(&t));
    /// ```
    pub fn expand(&self, target: &[isize]) -> Result<Self> {
        let geometry = expand_geometry(self.shape(), self.stride(), target)?;
        Ok(self.derive("expand", geometry, self.layout.start_offset()))
    }

    pub fn expand_(&mut self, target: &[isize]) -> Result<()> {
        let geometry = expand_geometry(self.shape(), self.stride(), target)?;
        self.set_geometry("expand", geometry);
        Ok(())
    }

    /// Expand to the shape of `other`.
    pub fn expand_as(&self, other: &Self) -> Result<Self> {
        self.expand(&as_targets(other.dims()))
    }

    /// Expand to `shape`, which must be fully specified.
    pub fn broadcast_as(&self, shape: impl Into<Shape>) -> Result<Self> {
        self.expand(&as_targets(shape.into().dims()))
    }

    /// Remove every size 1 dimension.
    pub fn squeeze(&self) -> Result<Self> {
        let geometry = squeeze_geometry(self.shape(), self.stride())?;
        Ok(self.derive("squeeze", geometry, self.layout.start_offset()))
    }

    pub fn squeeze_(&mut self) -> Result<()> {
        let geometry = squeeze_geometry(self.shape(), self.stride())?;
        self.set_geometry("squeeze", geometry);
        Ok(())
    }

    /// Remove `dim` if it has size 1; otherwise the view is returned unchanged.
    pub fn squeeze_dim(&self, dim: isize) -> Result<Self> {
        let dim = wrap_dim("squeeze", dim, self.rank())?;
        let geometry = squeeze_dim_geometry(self.shape(), self.stride(), dim)?;
        Ok(self.derive("squeeze", geometry, self.layout.start_offset()))
    }

    pub fn squeeze_dim_(&mut self, dim: isize) -> Result<()> {
        let dim = wrap_dim("squeeze", dim, self.rank())?;
        let geometry = squeeze_dim_geometry(self.shape(), self.stride(), dim)?;
        self.set_geometry("squeeze", geometry);
        Ok(())
    }

    /// Insert a size 1 dimension at `dim`. Negative values count from the end of the
    /// result, so `-1` appends a trailing dimension.
    pub fn unsqueeze(&self, dim: isize) -> Result<Self> {
        let dim = wrap_dim("unsqueeze", dim, self.rank() + 1)?;
        let geometry = unsqueeze_geometry(self.shape(), self.stride(), dim)?;
        Ok(self.derive("unsqueeze", geometry, self.layout.start_offset()))
    }

    pub fn unsqueeze_(&mut self, dim: isize) -> Result<()> {
        let dim = wrap_dim("unsqueeze", dim, self.rank() + 1)?;
        let geometry = unsqueeze_geometry(self.shape(), self.stride(), dim)?;
        self.set_geometry("unsqueeze", geometry);
        Ok(())
    }

    /// Insert a size 1 dimension at `dim`, also for tensors without elements.
    pub(crate) fn unit_dim(&self, dim: usize) -> Result<Self> {
        if self.elem_count() != 0 {
            return self.unsqueeze(dim as isize);
        }
        let mut dims = as_targets(self.dims());
        dims.insert(dim, 1);
        self.reshape(&dims)
    }

    pub fn permute(&self, dims: &[isize]) -> Result<Self> {
        let geometry = permute_geometry(self.shape(), self.stride(), dims)?;
        Ok(self.derive("permute", geometry, self.layout.start_offset()))
    }

    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let dim0 = wrap_dim("transpose", dim0, self.rank())?;
        let dim1 = wrap_dim("transpose", dim1, self.rank())?;
        let geometry = transpose_geometry(self.shape(), self.stride(), dim0, dim1)?;
        Ok(self.derive("transpose", geometry, self.layout.start_offset()))
    }

    /// Transpose of a matrix.
    pub fn t(&self) -> Result<Self> {
        self.expect_rank("t", 2)?;
        self.transpose(0, 1)
    }

    /// The `len` elements of `dim` starting at `start`.
    pub fn narrow(&self, dim: isize, start: usize, len: usize) -> Result<Self> {
        let dim = wrap_dim("narrow", dim, self.rank())?;
        let (geometry, delta) =
            narrow_geometry(self.shape(), self.stride(), dim, start, len)?;
        Ok(self.derive("narrow", geometry, self.layout.start_offset() + delta))
    }

    pub fn is_same_size(&self, other: &Self) -> bool {
        self.dims() == other.dims()
    }

    /// A row-major dense tensor with the same values. Already contiguous tensors are
    /// returned as a new view of the same storage.
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }
        debug!(
            "materializing {:?} with stride {:?} ({} elements)",
            self.dims(),
            self.stride(),
            self.elem_count()
        );
        let storage = self.storage.copy_strided(&self.layout)?;
        Ok(from_storage(
            Arc::new(storage),
            Layout::contiguous(self.shape()),
        ))
    }

    /// A tensor with the same elements in row-major order and the given shape. At most
    /// one dimension may be `-1`, in which case it is inferred. Copies only when `self`
    /// is not contiguous.
    pub fn reshape(&self, dims: &[isize]) -> Result<Self> {
        let shape = infer_shape("reshape", dims, self.elem_count())?;
        let source = self.contiguous()?;
        let layout = Layout::contiguous_with_offset(shape, source.layout.start_offset());
        trace!("reshape: {:?} -> {:?}", self.dims(), layout.dims());
        Ok(from_storage(source.storage, layout))
    }

    /// Like [`Tensor::reshape`], but fails instead of copying.
    pub fn view(&self, dims: &[isize]) -> Result<Self> {
        if !self.is_contiguous() {
            return Err(Error::NonContiguous {
                op: "view",
                shape: self.shape().clone(),
                stride: self.stride().to_vec(),
            }
            .bt());
        }
        self.reshape(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_single_unknown() {
        assert_eq!(infer_shape("t", &[2, -1], 6).unwrap(), Shape::from((2, 3)));
        assert_eq!(infer_shape("t", &[], 1).unwrap(), Shape::scalar());
        assert_eq!(infer_shape("t", &[0, 3], 0).unwrap(), Shape::from((0, 3)));
    }

    #[test]
    fn infer_rejects_bad_shapes() {
        for (dims, count) in [
            (vec![-1, -1], 6),
            (vec![4, -1], 6),
            (vec![0, -1], 0),
            (vec![-2, 3], 6),
            (vec![2, 2], 6),
        ] {
            let err = infer_shape("t", &dims, count).unwrap_err();
            assert!(matches!(err.inner(), Error::ElementCount { .. }), "{dims:?}");
        }
    }
}
