use std::{convert::Infallible, fmt::Display};

use crate::Shape;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Message: {0}")]
    Msg(String),

    #[error("{inner}\n{backtrace}")]
    WithBacktrace {
        inner: Box<Self>,
        backtrace: Box<std::backtrace::Backtrace>,
    },

    /// Arbitrary errors wrapping.
    #[error(transparent)]
    Wrapped(Box<dyn std::error::Error + Send + Sync>),

    /// Arbitrary errors wrapping with context.
    #[error("{wrapped:?}\n{context:?}")]
    WrappedContext {
        wrapped: Box<dyn std::error::Error + Send + Sync>,
        context: String,
    },

    #[error("{op}: the number of sizes provided ({got}) must be greater or equal to the number of dimensions in the tensor ({expected})")]
    Rank {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{op}: a shape of rank {rank} needs {rank} strides, got {strides}")]
    StrideMismatch {
        op: &'static str,
        rank: usize,
        strides: usize,
    },

    #[error("{op}: expected a tensor of rank {expected}, got rank {got}")]
    UnexpectedRank {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("both arguments to matmul need to be at least 1D, but they are {lhs}D and {rhs}D")]
    MatMulRank { lhs: usize, rhs: usize },

    #[error("the expanded size of the tensor ({size}) isn't allowed at dimension {dim}: -1 only keeps the size of an existing dimension")]
    InvalidSize { size: isize, dim: usize },

    #[error("the expanded size of the tensor ({target}) must match the existing size ({size}) at non-singleton dimension {dim}")]
    ExpandMismatch {
        dim: usize,
        target: usize,
        size: usize,
    },

    #[error("{op}: the size of tensor a ({lhs}) must match the size of tensor b ({rhs}) at non-singleton dimension {dim}")]
    SizeMismatch {
        op: &'static str,
        dim: usize,
        lhs: usize,
        rhs: usize,
    },

    #[error("{op}: cannot operate on an empty tensor")]
    EmptyTensor { op: &'static str },

    #[error("{op}: repeated dim {dim}")]
    DuplicateDim { op: &'static str, dim: usize },

    #[error("{op}: dimension {dim} out of range for a tensor of rank {rank}")]
    DimOutOfRange {
        op: &'static str,
        dim: isize,
        rank: usize,
    },

    #[error("{op}: shape {shape:?} is invalid for input of size {elem_count}")]
    ElementCount {
        op: &'static str,
        shape: Vec<isize>,
        elem_count: usize,
    },

    #[error("{op}: expected a contiguous tensor, got shape {shape:?} with stride {stride:?}")]
    NonContiguous {
        op: &'static str,
        shape: Shape,
        stride: Vec<usize>,
    },

    #[error("narrow: start ({start}) + length ({len}) exceeds dimension size ({size}) of dim {dim}")]
    NarrowOutOfRange {
        dim: usize,
        start: usize,
        len: usize,
        size: usize,
    },

    #[error("matmul is only supported for contiguous tensors lstride: {lhs_stride:?} rstride: {rhs_stride:?} mnk: {mnk:?}")]
    MatMulNonContiguous {
        lhs_stride: Vec<usize>,
        rhs_stride: Vec<usize>,
        mnk: (usize, usize, usize),
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new error based on a printable error message.
    ///
    /// If the message implements `std::error::Error`, prefer using [`Error::wrap`] instead.
    pub fn msg<M: Display>(msg: M) -> Self {
        Self::Msg(msg.to_string()).bt()
    }

    /// Wrap an arbitrary error.
    pub fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Wrapped(Box::new(err)).bt()
    }

    pub fn bt(self) -> Self {
        let backtrace = std::backtrace::Backtrace::capture();
        match backtrace.status() {
            std::backtrace::BacktraceStatus::Disabled
            | std::backtrace::BacktraceStatus::Unsupported => self,
            _ => Self::WithBacktrace {
                inner: Box::new(self),
                backtrace: Box::new(backtrace),
            },
        }
    }

    /// The error without any backtrace wrapping. Useful for matching on the variant.
    pub fn inner(&self) -> &Self {
        match self {
            Self::WithBacktrace { inner, .. } => inner.inner(),
            other => other,
        }
    }
}

#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Msg(format!($msg).into()).bt())
    };
    ($err:expr $(,)?) => {
        return Err($crate::Error::Msg(format!($err).into()).bt())
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($fmt, $($arg)*).into()).bt())
    };
}

pub(crate) mod private {
    pub trait Sealed {}

    impl<T, E> Sealed for std::result::Result<T, E> where E: std::error::Error {}
    impl<T> Sealed for Option<T> {}
}

/// Attach more context to an error.
///
/// Inspired by [`anyhow::Context`].
pub trait Context<T, E>: private::Sealed {
    /// Wrap the error value with additional context.
    fn context<C>(self, context: C) -> std::result::Result<T, Error>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap the error value with additional context that is evaluated lazily
    /// only once an error does occur.
    fn with_context<C, F>(self, f: F) -> std::result::Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> std::result::Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        // Not using map_err to save 2 useless frames off the captured backtrace
        // in ext_context.
        match self {
            Ok(ok) => Ok(ok),
            Err(error) => Err(Error::WrappedContext {
                wrapped: Box::new(error),
                context: context.to_string(),
            }),
        }
    }

    fn with_context<C, F>(self, context: F) -> std::result::Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(error) => Err(Error::WrappedContext {
                wrapped: Box::new(error),
                context: context().to_string(),
            }),
        }
    }
}

impl<T> Context<T, Infallible> for Option<T> {
    fn context<C>(self, context: C) -> std::result::Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        // Not using ok_or_else to save 2 useless frames off the captured
        // backtrace.
        match self {
            Some(ok) => Ok(ok),
            None => Err(Error::msg(context)),
        }
    }

    fn with_context<C, F>(self, context: F) -> std::result::Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        match self {
            Some(ok) => Ok(ok),
            None => Err(Error::msg(context())),
        }
    }
}
