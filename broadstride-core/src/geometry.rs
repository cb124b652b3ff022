//! Pure shape/stride arithmetic.
//!
//! Every function here takes the sizes and strides of an existing view and computes the
//! geometry of a derived view over the same memory. Nothing in this module touches storage;
//! binding a [`Geometry`] to a buffer is the job of [`crate::Tensor::as_strided`].
//!
//! Broadcast axes are expressed with a stride of `0`: every index along such an axis reads
//! the same element.

use crate::{Error, Result, Shape};

/// A shape together with the strides (in elements) realizing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub shape: Shape,
    pub stride: Vec<usize>,
}

impl Geometry {
    pub fn new(shape: impl Into<Shape>, stride: Vec<usize>) -> Self {
        let shape = shape.into();
        debug_assert_eq!(shape.rank(), stride.len());
        Self { shape, stride }
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }
}

/// Resolve a possibly negative dimension index against `rank`.
///
/// `-1` is the innermost dimension. A scalar has no valid dimension.
pub fn wrap_dim(op: &'static str, dim: isize, rank: usize) -> Result<usize> {
    let wrapped = if dim < 0 { dim + rank as isize } else { dim };
    if wrapped < 0 || wrapped >= rank as isize {
        return Err(Error::DimOutOfRange { op, dim, rank }.bt());
    }
    Ok(wrapped as usize)
}

/// Fail unless `stride` has exactly one entry per dimension of `shape`.
pub(crate) fn check_congruent(op: &'static str, shape: &Shape, stride: &[usize]) -> Result<()> {
    if shape.rank() != stride.len() {
        return Err(Error::StrideMismatch {
            op,
            rank: shape.rank(),
            strides: stride.len(),
        }
        .bt());
    }
    Ok(())
}

fn check_dim(op: &'static str, dim: usize, rank: usize) -> Result<()> {
    if dim >= rank {
        return Err(Error::DimOutOfRange {
            op,
            dim: isize::try_from(dim).unwrap_or(isize::MAX),
            rank,
        }
        .bt());
    }
    Ok(())
}

/// Broadcast `shape`/`stride` to `target`, aligning dimensions at the innermost end.
///
/// A target of `-1` keeps the existing size. Size 1 dimensions stretch to any size by taking
/// a stride of `0`. Leading dimensions that do not exist in the source are manufactured with
/// size 1 and the stride a contiguous layout would give them.
pub fn expand_geometry(shape: &Shape, stride: &[usize], target: &[isize]) -> Result<Geometry> {
    check_congruent("expand", shape, stride)?;
    let rank = shape.rank();
    let n = target.len();
    if n < rank {
        return Err(Error::Rank {
            op: "expand",
            expected: rank,
            got: n,
        }
        .bt());
    }

    let mut sizes = vec![0usize; n];
    let mut strides = vec![0usize; n];
    for i in (0..n).rev() {
        let offset = n - 1 - i;
        let src_dim = rank as isize - 1 - offset as isize;
        let (size, src_stride) = if src_dim >= 0 {
            let d = src_dim as usize;
            (shape.dims()[d], stride[d])
        } else if i + 1 < n {
            (1, sizes[i + 1] * strides[i + 1])
        } else {
            (1, 1)
        };

        let requested = target[i];
        let target_size = match requested {
            -1 if src_dim >= 0 => size,
            t if t < 0 => return Err(Error::InvalidSize { size: t, dim: i }.bt()),
            t => t as usize,
        };

        let (size, src_stride) = if size == target_size {
            (size, src_stride)
        } else if size == 1 {
            (target_size, 0)
        } else {
            return Err(Error::ExpandMismatch {
                dim: i,
                target: target_size,
                size,
            }
            .bt());
        };
        sizes[i] = size;
        strides[i] = src_stride;
    }
    Ok(Geometry::new(sizes, strides))
}

/// Drop every size 1 dimension.
pub fn squeeze_geometry(shape: &Shape, stride: &[usize]) -> Result<Geometry> {
    check_congruent("squeeze", shape, stride)?;
    let (sizes, strides) = shape
        .dims()
        .iter()
        .zip(stride.iter())
        .filter(|(size, _)| **size != 1)
        .map(|(size, stride)| (*size, *stride))
        .unzip::<_, _, Vec<_>, Vec<_>>();
    Ok(Geometry::new(sizes, strides))
}

/// Drop dimension `dim` if it has size 1. Every other dimension passes through, even if it
/// also has size 1.
pub fn squeeze_dim_geometry(shape: &Shape, stride: &[usize], dim: usize) -> Result<Geometry> {
    check_congruent("squeeze", shape, stride)?;
    check_dim("squeeze", dim, shape.rank())?;
    let (sizes, strides) = shape
        .dims()
        .iter()
        .zip(stride.iter())
        .enumerate()
        .filter(|(d, (size, _))| *d != dim || **size != 1)
        .map(|(_, (size, stride))| (*size, *stride))
        .unzip::<_, _, Vec<_>, Vec<_>>();
    Ok(Geometry::new(sizes, strides))
}

/// Insert a size 1 dimension at `dim` (in `0..=rank`).
///
/// The new dimension gets stride `1` when it becomes the innermost dimension, otherwise the
/// span of the dimension directly inside it.
pub fn unsqueeze_geometry(shape: &Shape, stride: &[usize], dim: usize) -> Result<Geometry> {
    check_congruent("unsqueeze", shape, stride)?;
    if shape.element_count() == 0 {
        return Err(Error::EmptyTensor { op: "unsqueeze" }.bt());
    }
    let rank = shape.rank();
    if dim > rank {
        return Err(Error::DimOutOfRange {
            op: "unsqueeze",
            dim: dim as isize,
            rank: rank + 1,
        }
        .bt());
    }
    let mut sizes = shape.dims().to_vec();
    let mut strides = stride.to_vec();
    let new_stride = if dim == rank {
        1
    } else {
        sizes[dim] * strides[dim]
    };
    sizes.insert(dim, 1);
    strides.insert(dim, new_stride);
    Ok(Geometry::new(sizes, strides))
}

/// Reorder dimensions so that result dimension `i` is source dimension `dims[i]`.
pub fn permute_geometry(shape: &Shape, stride: &[usize], dims: &[isize]) -> Result<Geometry> {
    check_congruent("permute", shape, stride)?;
    let rank = shape.rank();
    if dims.len() != rank {
        return Err(Error::msg(format!(
            "permute: number of dims don't match, got {} for a tensor of rank {rank}",
            dims.len()
        )));
    }
    let mut seen = vec![false; rank];
    let mut sizes = Vec::with_capacity(rank);
    let mut strides = Vec::with_capacity(rank);
    for &d in dims {
        let d = wrap_dim("permute", d, rank)?;
        if seen[d] {
            return Err(Error::DuplicateDim { op: "permute", dim: d }.bt());
        }
        seen[d] = true;
        sizes.push(shape.dims()[d]);
        strides.push(stride[d]);
    }
    Ok(Geometry::new(sizes, strides))
}

/// Swap two dimensions.
pub fn transpose_geometry(
    shape: &Shape,
    stride: &[usize],
    dim0: usize,
    dim1: usize,
) -> Result<Geometry> {
    check_congruent("transpose", shape, stride)?;
    check_dim("transpose", dim0, shape.rank())?;
    check_dim("transpose", dim1, shape.rank())?;
    let mut sizes = shape.dims().to_vec();
    let mut strides = stride.to_vec();
    sizes.swap(dim0, dim1);
    strides.swap(dim0, dim1);
    Ok(Geometry::new(sizes, strides))
}

/// Restrict `dim` to `start..start + len`.
///
/// Returns the new geometry and the number of elements the view's base offset moves by.
pub fn narrow_geometry(
    shape: &Shape,
    stride: &[usize],
    dim: usize,
    start: usize,
    len: usize,
) -> Result<(Geometry, usize)> {
    check_congruent("narrow", shape, stride)?;
    check_dim("narrow", dim, shape.rank())?;
    let size = shape.dims()[dim];
    if start.checked_add(len).map_or(true, |end| end > size) {
        return Err(Error::NarrowOutOfRange {
            dim,
            start,
            len,
            size,
        }
        .bt());
    }
    let mut sizes = shape.dims().to_vec();
    sizes[dim] = len;
    Ok((Geometry::new(sizes, stride.to_vec()), start * stride[dim]))
}
