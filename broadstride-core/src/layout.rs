use crate::{geometry::Geometry, Shape};

/// Where a view's elements live inside its storage buffer.
///
/// The element at logical index `[i0, i1, ..]` is stored at
/// `start_offset + i0 * stride[0] + i1 * stride[1] + ..`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    stride: Vec<usize>,
    start_offset: usize,
}

impl Layout {
    pub fn new(shape: Shape, stride: Vec<usize>, start_offset: usize) -> Self {
        debug_assert_eq!(shape.rank(), stride.len());
        Self {
            shape,
            stride,
            start_offset,
        }
    }

    pub fn contiguous(shape: impl Into<Shape>) -> Self {
        Self::contiguous_with_offset(shape, 0)
    }

    pub fn contiguous_with_offset(shape: impl Into<Shape>, start_offset: usize) -> Self {
        let shape = shape.into();
        let stride = shape.stride_contiguous();
        Self {
            shape,
            stride,
            start_offset,
        }
    }

    pub(crate) fn from_geometry(geometry: Geometry, start_offset: usize) -> Self {
        Self::new(geometry.shape, geometry.stride, start_offset)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn stride(&self) -> &[usize] {
        &self.stride
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn is_contiguous(&self) -> bool {
        self.shape.is_contiguous(&self.stride)
    }

    /// Whether some dimension of size greater than one has stride `0`.
    pub fn is_broadcast(&self) -> bool {
        self.dims()
            .iter()
            .zip(self.stride.iter())
            .any(|(&size, &stride)| size > 1 && stride == 0)
    }

    /// The largest storage offset this layout addresses, or `None` when it addresses nothing.
    pub fn max_offset(&self) -> Option<usize> {
        if self.shape.element_count() == 0 {
            return None;
        }
        let span: usize = self
            .dims()
            .iter()
            .zip(self.stride.iter())
            .map(|(&size, &stride)| (size - 1) * stride)
            .sum();
        Some(self.start_offset + span)
    }

    /// Whether every addressed element lies in a buffer of `len` elements.
    pub fn fits_in(&self, len: usize) -> bool {
        self.max_offset().map_or(true, |max| max < len)
    }

    /// Storage offsets of every element, in row-major logical order.
    pub fn strided_index(&self) -> StridedIndex<'_> {
        StridedIndex::new(self)
    }
}

/// Iterator over the storage offsets of a [`Layout`].
#[derive(Debug)]
pub struct StridedIndex<'a> {
    next_storage_index: Option<usize>,
    multi_index: Vec<usize>,
    dims: &'a [usize],
    stride: &'a [usize],
}

impl<'a> StridedIndex<'a> {
    fn new(layout: &'a Layout) -> Self {
        let next_storage_index = if layout.shape().element_count() == 0 {
            None
        } else {
            Some(layout.start_offset())
        };
        StridedIndex {
            next_storage_index,
            multi_index: vec![0; layout.rank()],
            dims: layout.dims(),
            stride: layout.stride(),
        }
    }
}

impl Iterator for StridedIndex<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let storage_index = self.next_storage_index?;
        let mut updated = false;
        let mut next_storage_index = storage_index;
        for ((multi_i, max_i), stride_i) in self
            .multi_index
            .iter_mut()
            .zip(self.dims.iter())
            .zip(self.stride.iter())
            .rev()
        {
            let next_i = *multi_i + 1;
            if next_i < *max_i {
                *multi_i = next_i;
                updated = true;
                next_storage_index += stride_i;
                break;
            } else {
                next_storage_index -= *multi_i * stride_i;
                *multi_i = 0
            }
        }
        self.next_storage_index = if updated {
            Some(next_storage_index)
        } else {
            None
        };
        Some(storage_index)
    }
}

/// Geometry in the form CPU kernels consume.
///
/// Kernels index with at least one dimension, so a scalar is handed over as a single
/// element of shape `[1]` and stride `[1]`. A view with no elements is handed over as
/// shape `[0]` with an empty stride, which kernels never index. Nothing outside the kernel
/// boundary sees either form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct KernelGeometry {
    pub(crate) dims: Vec<usize>,
    pub(crate) stride: Vec<usize>,
    pub(crate) start_offset: usize,
}

impl KernelGeometry {
    pub(crate) fn from_layout(layout: &Layout) -> Self {
        let (dims, stride) = if layout.rank() == 0 {
            (vec![1], vec![1])
        } else if layout.shape().element_count() == 0 {
            (vec![0], vec![])
        } else {
            (layout.dims().to_vec(), layout.stride().to_vec())
        };
        Self {
            dims,
            stride,
            start_offset: layout.start_offset(),
        }
    }

    pub(crate) fn elem_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Storage offset of the element at row-major position `linear`.
    pub(crate) fn offset_of(&self, mut linear: usize) -> usize {
        let mut offset = self.start_offset;
        for (&size, &stride) in self.dims.iter().zip(self.stride.iter()).rev() {
            offset += (linear % size) * stride;
            linear /= size;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strided_index_follows_broadcast() {
        let layout = Layout::new(Shape::from((2, 3)), vec![0, 1], 4);
        let offsets = layout.strided_index().collect::<Vec<_>>();
        assert_eq!(offsets, vec![4, 5, 6, 4, 5, 6]);
    }

    #[test]
    fn scalar_layout_visits_once() {
        let layout = Layout::contiguous_with_offset((), 2);
        assert_eq!(layout.strided_index().collect::<Vec<_>>(), vec![2]);
        assert_eq!(layout.max_offset(), Some(2));

        let kernel = KernelGeometry::from_layout(&layout);
        assert_eq!(kernel.dims, vec![1]);
        assert_eq!(kernel.stride, vec![1]);
        assert_eq!(kernel.offset_of(0), 2);
    }

    #[test]
    fn empty_layout_visits_nothing() {
        let layout = Layout::contiguous((3, 0));
        assert_eq!(layout.strided_index().count(), 0);
        assert!(layout.fits_in(0));

        let kernel = KernelGeometry::from_layout(&layout);
        assert_eq!(kernel.dims, vec![0]);
        assert!(kernel.stride.is_empty());
        assert_eq!(kernel.elem_count(), 0);
    }

    #[test]
    fn kernel_offsets_match_strided_index() {
        let layout = Layout::new(Shape::from((2, 2, 3)), vec![1, 0, 2], 1);
        let kernel = KernelGeometry::from_layout(&layout);
        let from_kernel = (0..12).map(|i| kernel.offset_of(i)).collect::<Vec<_>>();
        assert_eq!(from_kernel, layout.strided_index().collect::<Vec<_>>());
    }
}
