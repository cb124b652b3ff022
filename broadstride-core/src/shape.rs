use std::fmt;

use crate::{geometry::wrap_dim, Result};

/// The logical sizes of a tensor, outermost dimension first.
///
/// A rank 0 shape (no dimensions) is a scalar holding exactly one element.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// The scalar shape.
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    pub fn from_dims(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of elements addressed by this shape. A scalar holds one element.
    pub fn element_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Size of dimension `dim`, where negative values count from the end.
    pub fn dim(&self, dim: isize) -> Result<usize> {
        let d = wrap_dim("dim", dim, self.rank())?;
        Ok(self.0[d])
    }

    /// Compute default (contiguous) strides for this shape.
    pub fn stride_contiguous(&self) -> Vec<usize> {
        let mut strides = Vec::with_capacity(self.0.len());
        let mut acc = 1;
        // Iterate dims in reverse to accumulate products
        for dim in self.0.iter().rev() {
            strides.push(acc);
            acc *= *dim;
        }
        strides.reverse();
        strides
    }

    /// Whether `stride` lays this shape out densely in row-major order.
    ///
    /// Size 1 dimensions may carry any stride, and a shape with no elements is always
    /// contiguous.
    pub fn is_contiguous(&self, stride: &[usize]) -> bool {
        if self.0.len() != stride.len() {
            return false;
        }
        if self.element_count() == 0 {
            return true;
        }
        let mut acc = 1;
        for (&size, &stride) in self.0.iter().zip(stride.iter()).rev() {
            if size != 1 && stride != acc {
                return false;
            }
            acc *= size;
        }
        true
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &self.0)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &self.0)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::from_dims(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<&[usize; N]> for Shape {
    fn from(dims: &[usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl From<&Shape> for Shape {
    fn from(shape: &Shape) -> Self {
        shape.clone()
    }
}

impl From<()> for Shape {
    fn from(_: ()) -> Self {
        Self::scalar()
    }
}

impl From<usize> for Shape {
    fn from(d: usize) -> Self {
        Self(vec![d])
    }
}

macro_rules! shape_from_tuple {
    (@ty $n:ident) => { usize };
    ($($n:ident),*) => {
        impl From<($(shape_from_tuple!(@ty $n), )*)> for Shape {
            fn from(($($n, )*): ($(shape_from_tuple!(@ty $n), )*)) -> Self {
                Self(vec![$($n, )*])
            }
        }
    };
}

shape_from_tuple!(a, b);
shape_from_tuple!(a, b, c);
shape_from_tuple!(a, b, c, d);
shape_from_tuple!(a, b, c, d, e);
shape_from_tuple!(a, b, c, d, e, f);
