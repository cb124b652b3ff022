//! Broadstride is a strided tensor view engine with NumPy-style broadcasting.
//!
//! A [`Tensor`] is a shared storage buffer plus a [`Layout`]: sizes, strides, and a start
//! offset. Shape-changing operations (expand, squeeze, unsqueeze, permute, narrow, ...)
//! never copy. They compute a new geometry over the same buffer, using a stride of `0` for
//! broadcast dimensions so that every index along such an axis reads the same element.
//!
//! The geometry itself is available as pure functions in [`geometry`] and [`broadcast`], so
//! shapes and strides can be reasoned about without any storage at all.
//!
//! ## Broadcasting
//! Shapes are aligned at their innermost dimension. A missing leading dimension behaves as
//! size 1, and a size 1 dimension matches any size:
//! ```
//! use broadstride_core::broadcast_size;
//!
//! let shape = broadcast_size(&[8, 1, 6, 1], &[7, 1, 5]).unwrap();
//! assert_eq!(shape.dims(), &[8, 7, 6, 5]);
//! ```
//!
//! ## Views and matrix products
//! ```
//! use broadstride_core::{Device, Tensor};
//!
//! let a = Tensor::<f32>::arange(0., 6., &Device::Cpu).unwrap();
//! let a = a.reshape(&[2, 3]).unwrap();
//!
//! // Stretch a column vector without copying it.
//! let col = Tensor::<f32>::ones((2, 1), &Device::Cpu).unwrap();
//! let wide = col.expand(&[2, 3]).unwrap();
//! assert_eq!(wide.stride(), &[1, 0]);
//!
//! // Batched product of a (10, 2, 3) stack against a single (3, 4) matrix.
//! let batch = a.unsqueeze(0).unwrap().expand(&[10, 2, 3]).unwrap();
//! let rhs = Tensor::<f32>::ones((3, 4), &Device::Cpu).unwrap();
//! let out = batch.matmul(&rhs).unwrap();
//! assert_eq!(out.dims(), &[10, 2, 4]);
//! assert_eq!(out.to_vec3().unwrap()[9], vec![vec![3.0; 4], vec![12.0; 4]]);
//! ```

pub mod broadcast;
mod cpu_storage;
mod device;
mod dtype;
mod error;
pub mod geometry;
mod layout;
mod shape;
mod storage;
mod tensor;

pub use broadcast::{
    broadcast_size, broadcast_size_many, broadcast_tensors, expand_inplace, expand_outplace,
    expand_outplace3,
};
pub use device::Device;
pub use dtype::DType;
pub use error::{Context, Error, Result};
pub use geometry::Geometry;
pub use layout::{Layout, StridedIndex};
pub use shape::Shape;
pub use tensor::Tensor;
