//! Matrix products over tensors of any rank of at least 1.
//!
//! [`Tensor::matmul`] follows NumPy semantics: vectors are promoted to matrices for the
//! product and the promoted dimension is dropped again afterwards, and leading batch
//! dimensions broadcast against each other.

use std::sync::Arc;

use log::debug;

use crate::{
    broadcast::{as_targets, broadcast_size},
    tensor::concretetensor::from_storage,
    DType, Error, Layout, Result, Shape, Tensor,
};

impl<T: DType> Tensor<T> {
    /// Inner product of two vectors, as a rank 0 tensor.
    pub fn dot(&self, rhs: &Self) -> Result<Self> {
        self.expect_rank("dot", 1)?;
        rhs.expect_rank("dot", 1)?;
        if self.dims()[0] != rhs.dims()[0] {
            return Err(Error::SizeMismatch {
                op: "dot",
                dim: 0,
                lhs: self.dims()[0],
                rhs: rhs.dims()[0],
            }
            .bt());
        }
        self.unit_dim(0)?.mm(&rhs.unit_dim(1)?)?.reshape(&[])
    }

    /// Matrix-vector product.
    pub fn mv(&self, vec: &Self) -> Result<Self> {
        self.expect_rank("mv", 2)?;
        vec.expect_rank("mv", 1)?;
        self.mm(&vec.unit_dim(1)?)?.squeeze_dim(-1)
    }

    /// Product of two matrices.
    pub fn mm(&self, rhs: &Self) -> Result<Self> {
        self.expect_rank("mm", 2)?;
        rhs.expect_rank("mm", 2)?;
        let (m, k) = (self.dims()[0], self.dims()[1]);
        let (k2, n) = (rhs.dims()[0], rhs.dims()[1]);
        if k != k2 {
            return Err(Error::SizeMismatch {
                op: "mm",
                dim: 1,
                lhs: k,
                rhs: k2,
            }
            .bt());
        }
        self.matmul_dense(rhs, (1, m, n, k), (m, n))
    }

    /// Batched product of `(b, m, k)` and `(b, k, n)` tensors.
    pub fn bmm(&self, rhs: &Self) -> Result<Self> {
        self.expect_rank("bmm", 3)?;
        rhs.expect_rank("bmm", 3)?;
        let (b, m, k) = (self.dims()[0], self.dims()[1], self.dims()[2]);
        let (b2, k2, n) = (rhs.dims()[0], rhs.dims()[1], rhs.dims()[2]);
        if b != b2 {
            return Err(Error::SizeMismatch {
                op: "bmm",
                dim: 0,
                lhs: b,
                rhs: b2,
            }
            .bt());
        }
        if k != k2 {
            return Err(Error::SizeMismatch {
                op: "bmm",
                dim: 2,
                lhs: k,
                rhs: k2,
            }
            .bt());
        }
        self.matmul_dense(rhs, (b, m, n, k), (b, m, n))
    }

    fn matmul_dense(
        &self,
        rhs: &Self,
        bmnk: (usize, usize, usize, usize),
        out_shape: impl Into<Shape>,
    ) -> Result<Self> {
        let lhs = self.contiguous()?;
        let rhs = rhs.contiguous()?;
        let storage = lhs
            .storage
            .matmul(&rhs.storage, bmnk, &lhs.layout, &rhs.layout)?;
        Ok(from_storage(Arc::new(storage), Layout::contiguous(out_shape)))
    }

    /// Matrix product with NumPy semantics.
    ///
    /// | lhs rank | rhs rank | result |
    /// |----------|----------|--------|
    /// | 1 | 1 | rank 0 inner product |
    /// | 2 | 1 | matrix-vector product |
    /// | 1 | 2 | `lhs` as a row vector, the row dimension removed again |
    /// | 2 | 2 | matrix product |
    /// | ≥ 3 | 1 or 2 | `lhs` batch dimensions folded into its rows |
    /// | otherwise | | batched product with broadcast batch dimensions |
    ///
    /// ```
    /// use broadstride_core::{Device, Tensor};
    ///
    /// let a = Tensor::<f32>::ones((3, 1, 7, 4), &Device::Cpu).unwrap();
    /// let b = Tensor::<f32>::ones((6, 4, 5), &Device::Cpu).unwrap();
    /// let c = a.matmul(&b).unwrap();
    /// assert_eq!(c.dims(), &[3, 6, 7, 5]);
    /// ```
    pub fn matmul(&self, rhs: &Self) -> Result<Self> {
        let (d1, d2) = (self.rank(), rhs.rank());
        match (d1, d2) {
            (0, _) | (_, 0) => Err(Error::MatMulRank { lhs: d1, rhs: d2 }.bt()),
            (1, 1) => {
                debug!("matmul: dot {:?} x {:?}", self.dims(), rhs.dims());
                self.dot(rhs)
            }
            (2, 1) => {
                debug!("matmul: mv {:?} x {:?}", self.dims(), rhs.dims());
                self.mv(rhs)
            }
            (1, 2) => {
                debug!("matmul: vm {:?} x {:?}", self.dims(), rhs.dims());
                let mut out = self.unit_dim(0)?.mm(rhs)?;
                out.squeeze_dim_(0)?;
                Ok(out)
            }
            (2, 2) => {
                debug!("matmul: mm {:?} x {:?}", self.dims(), rhs.dims());
                self.mm(rhs)
            }
            (_, 1 | 2) if d1 >= 3 => self.matmul_folded(rhs),
            _ => self.matmul_batched(rhs),
        }
    }

    /// `lhs` of rank 3 or more against a vector or matrix: a single matrix product with
    /// every batch dimension of `lhs` folded into its rows.
    fn matmul_folded(&self, rhs: &Self) -> Result<Self> {
        let d1 = self.rank();
        let vector_rhs = rhs.rank() == 1;
        let rhs = if vector_rhs {
            rhs.unit_dim(1)?
        } else {
            rhs.clone()
        };
        let leading = &self.dims()[..d1 - 1];
        let k = self.dims()[d1 - 1];
        let rows: usize = leading.iter().product();
        debug!(
            "matmul: folding {:?} into ({rows}, {k}) against {:?}",
            self.dims(),
            rhs.dims()
        );

        let out = self.reshape(&[rows as isize, k as isize])?.mm(&rhs)?;
        let mut out_dims = as_targets(leading);
        out_dims.push(out.dims()[1] as isize);
        let out = out.reshape(&out_dims)?;
        if vector_rhs {
            out.squeeze_dim(-1)
        } else {
            Ok(out)
        }
    }

    /// General case: broadcast the batch dimensions of both operands and run one batched
    /// product over them.
    fn matmul_batched(&self, rhs: &Self) -> Result<Self> {
        let (d1, d2) = (self.rank(), rhs.rank());
        let lhs = if d1 == 1 {
            self.unit_dim(0)?
        } else {
            self.clone()
        };
        let rhs = if d2 == 1 {
            rhs.unit_dim(1)?
        } else {
            rhs.clone()
        };

        let (l_rank, r_rank) = (lhs.rank(), rhs.rank());
        let (m, k) = (lhs.dims()[l_rank - 2], lhs.dims()[l_rank - 1]);
        let (k2, n) = (rhs.dims()[r_rank - 2], rhs.dims()[r_rank - 1]);
        if k != k2 {
            return Err(Error::SizeMismatch {
                op: "matmul",
                dim: l_rank - 1,
                lhs: k,
                rhs: k2,
            }
            .bt());
        }

        let batch = broadcast_size(&lhs.dims()[..l_rank - 2], &rhs.dims()[..r_rank - 2])?;
        let batch_count = batch.element_count();
        debug!(
            "matmul: batched {:?} x {:?} over batch {batch:?}",
            self.dims(),
            rhs.dims()
        );

        let expand_to = |t: &Self, rows: usize, cols: usize| -> Result<Self> {
            let mut target = as_targets(batch.dims());
            target.extend([rows as isize, cols as isize]);
            t.expand(&target)?
                .reshape(&[batch_count as isize, rows as isize, cols as isize])
        };
        let lhs = expand_to(&lhs, m, k)?;
        let rhs = expand_to(&rhs, k, n)?;

        let mut out_dims = as_targets(batch.dims());
        out_dims.extend([m as isize, n as isize]);
        let mut out = lhs.bmm(&rhs)?.reshape(&out_dims)?;
        if d1 == 1 {
            out.squeeze_dim_(-2)?;
        } else if d2 == 1 {
            out.squeeze_dim_(-1)?;
        }
        Ok(out)
    }
}
