//! Broadcast shape inference and operand expansion.
//!
//! Shapes are aligned at their innermost dimension; a missing leading dimension behaves as
//! size 1, and a size 1 dimension matches any size.

use crate::{DType, Error, Result, Shape, Tensor};

/// The shape two operands broadcast to.
///
/// Per axis the result is the larger of the two sizes, so a size 1 axis paired with a size 0
/// axis yields 1.
pub fn broadcast_size(a: &[usize], b: &[usize]) -> Result<Shape> {
    let ndim = a.len().max(b.len());
    let mut expanded = vec![0usize; ndim];
    for i in (0..ndim).rev() {
        let offset = ndim - 1 - i;
        let size_a = if offset < a.len() {
            a[a.len() - 1 - offset]
        } else {
            1
        };
        let size_b = if offset < b.len() {
            b[b.len() - 1 - offset]
        } else {
            1
        };
        if size_a == size_b || size_a == 1 || size_b == 1 {
            expanded[i] = size_a.max(size_b);
        } else {
            return Err(Error::SizeMismatch {
                op: "broadcast",
                dim: i,
                lhs: size_a,
                rhs: size_b,
            }
            .bt());
        }
    }
    Ok(Shape::from(expanded))
}

/// Left fold of [`broadcast_size`]. No shapes broadcast to a scalar.
pub fn broadcast_size_many<S: AsRef<[usize]>>(shapes: &[S]) -> Result<Shape> {
    shapes.iter().try_fold(Shape::scalar(), |acc, shape| {
        broadcast_size(acc.dims(), shape.as_ref())
    })
}

impl Shape {
    /// The shape `self` and `rhs` broadcast to.
    pub fn broadcast_with(&self, rhs: &Shape) -> Result<Shape> {
        broadcast_size(self.dims(), rhs.dims())
    }
}

pub(crate) fn as_targets(dims: &[usize]) -> Vec<isize> {
    dims.iter().map(|&d| d as isize).collect()
}

/// Expand `to_expand` to the shape of `tensor`, skipping the view when shapes already agree.
pub fn expand_inplace<T: DType>(tensor: &Tensor<T>, to_expand: &Tensor<T>) -> Result<Tensor<T>> {
    if tensor.is_same_size(to_expand) {
        return Ok(to_expand.clone());
    }
    to_expand.expand_as(tensor)
}

/// Expand both operands to their common broadcast shape.
pub fn expand_outplace<T: DType>(
    a: &Tensor<T>,
    b: &Tensor<T>,
) -> Result<(Tensor<T>, Tensor<T>)> {
    if a.is_same_size(b) {
        return Ok((a.clone(), b.clone()));
    }
    let target = as_targets(broadcast_size(a.dims(), b.dims())?.dims());
    Ok((a.expand(&target)?, b.expand(&target)?))
}

/// Expand three operands to their common broadcast shape.
pub fn expand_outplace3<T: DType>(
    a: &Tensor<T>,
    b: &Tensor<T>,
    c: &Tensor<T>,
) -> Result<(Tensor<T>, Tensor<T>, Tensor<T>)> {
    if a.is_same_size(b) && a.is_same_size(c) {
        return Ok((a.clone(), b.clone(), c.clone()));
    }
    let ab = broadcast_size(a.dims(), b.dims())?;
    let target = as_targets(broadcast_size(ab.dims(), c.dims())?.dims());
    Ok((a.expand(&target)?, b.expand(&target)?, c.expand(&target)?))
}

/// Expand every operand to the broadcast shape of all of them.
pub fn broadcast_tensors<T: DType>(tensors: &[Tensor<T>]) -> Result<Vec<Tensor<T>>> {
    let shape = broadcast_size_many(&tensors.iter().map(|t| t.dims()).collect::<Vec<_>>())?;
    let target = as_targets(shape.dims());
    tensors.iter().map(|t| t.expand(&target)).collect()
}
