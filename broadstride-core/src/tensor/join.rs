use log::debug;

use crate::{geometry::wrap_dim, DType, Error, Result, Tensor};

impl<T: DType> Tensor<T> {
    /// Split `dim` into views of `size` elements each. The last piece may be shorter.
    pub fn split(&self, size: usize, dim: isize) -> Result<Vec<Self>> {
        let dim = wrap_dim("split", dim, self.rank())?;
        let dim_size = self.dims()[dim];
        if size == 0 && dim_size != 0 {
            crate::bail!("split: split size must be positive for a dimension of size {dim_size}")
        }
        let pieces = if dim_size == 0 {
            1
        } else {
            dim_size.div_ceil(size)
        };
        (0..pieces)
            .map(|i| {
                let start = i * size;
                self.narrow(dim as isize, start, size.min(dim_size - start))
            })
            .collect()
    }

    /// Split `dim` into `chunks` views of equal size, except possibly the last.
    ///
    /// Fewer than `chunks` views are returned when `dim` cannot be spread that far. A
    /// dimension of size 0 yields the tensor itself.
    pub fn chunk(&self, chunks: usize, dim: isize) -> Result<Vec<Self>> {
        if chunks == 0 {
            crate::bail!("chunk: number of chunks must be positive")
        }
        let dim = wrap_dim("chunk", dim, self.rank())?;
        let dim_size = self.dims()[dim];
        if dim_size == 0 {
            return Ok(vec![self.clone()]);
        }
        self.split(dim_size.div_ceil(chunks), dim as isize)
    }

    /// Concatenate along `dim`. Every other dimension must agree.
    pub fn cat(tensors: &[Self], dim: isize) -> Result<Self> {
        let Some(first) = tensors.first() else {
            crate::bail!("cat: expected a non-empty list of tensors")
        };
        let rank = first.rank();
        let dim = wrap_dim("cat", dim, rank)?;
        for t in tensors.iter().skip(1) {
            t.expect_rank("cat", rank)?;
            for (d, (&lhs, &rhs)) in first.dims().iter().zip(t.dims()).enumerate() {
                if d != dim && lhs != rhs {
                    return Err(Error::SizeMismatch {
                        op: "cat",
                        dim: d,
                        lhs,
                        rhs,
                    }
                    .bt());
                }
            }
        }

        let mut out_dims = first.dims().to_vec();
        out_dims[dim] = tensors.iter().map(|t| t.dims()[dim]).sum();
        let outer: usize = out_dims[..dim].iter().product();
        let inner: usize = out_dims[dim + 1..].iter().product();
        debug!("cat: {} tensors into {out_dims:?}", tensors.len());

        let sources = tensors
            .iter()
            .map(|t| t.to_vec())
            .collect::<Result<Vec<_>>>()?;
        let mut out = Vec::with_capacity(out_dims.iter().product());
        for o in 0..outer {
            for (t, data) in tensors.iter().zip(sources.iter()) {
                let block = t.dims()[dim] * inner;
                out.extend_from_slice(&data[o * block..(o + 1) * block]);
            }
        }
        Self::from_vec(out, out_dims, &first.device())
    }

    /// Join tensors of identical shape along a new dimension `dim`.
    pub fn stack(tensors: &[Self], dim: isize) -> Result<Self> {
        let Some(first) = tensors.first() else {
            crate::bail!("stack: expected a non-empty list of tensors")
        };
        let dim = wrap_dim("stack", dim, first.rank() + 1)?;
        for t in tensors.iter().skip(1) {
            if !first.is_same_size(t) {
                crate::bail!(
                    "stack: expects each tensor to be equal size, but got {:?} and {:?}",
                    first.dims(),
                    t.dims()
                )
            }
        }
        let expanded = tensors
            .iter()
            .map(|t| t.unit_dim(dim))
            .collect::<Result<Vec<_>>>()?;
        Self::cat(&expanded, dim as isize)
    }
}
