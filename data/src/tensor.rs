//! `Tensor` is the opaque value stored in trellis dictionaries.
//!
//! The container and spec layers only look at [`Tensor::shape`] and
//! [`Tensor::datum_type`]; element access is for computations and the
//! checkpoint backend.
use crate::datum::{Datum, DatumType};
use crate::{format_err, TrellisResult};
use itertools::Itertools;
use ndarray::{Array, ArrayD, ArrayViewD, Dimension, IxDyn};
use std::fmt;

/// An owned dense tensor: an ndarray of one of the supported element types.
#[derive(Clone, PartialEq)]
pub enum Tensor {
    Bool(ArrayD<bool>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl Tensor {
    pub fn datum_type(&self) -> DatumType {
        match self {
            Tensor::Bool(_) => DatumType::Bool,
            Tensor::I32(_) => DatumType::I32,
            Tensor::I64(_) => DatumType::I64,
            Tensor::F32(_) => DatumType::F32,
            Tensor::F64(_) => DatumType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Tensor::Bool(a) => a.shape(),
            Tensor::I32(a) => a.shape(),
            Tensor::I64(a) => a.shape(),
            Tensor::F32(a) => a.shape(),
            Tensor::F64(a) => a.shape(),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A zero-filled tensor of the given element type and shape.
    pub fn zero(dt: DatumType, shape: &[usize]) -> Tensor {
        let shape = IxDyn(shape);
        match dt {
            DatumType::Bool => ArrayD::from_elem(shape, false).into(),
            DatumType::I32 => ArrayD::from_elem(shape, 0i32).into(),
            DatumType::I64 => ArrayD::from_elem(shape, 0i64).into(),
            DatumType::F32 => ArrayD::from_elem(shape, 0f32).into(),
            DatumType::F64 => ArrayD::from_elem(shape, 0f64).into(),
        }
    }

    /// A read-only ndarray view, failing on element type mismatch.
    pub fn to_array_view<T: Datum>(&self) -> TrellisResult<ArrayViewD<'_, T>> {
        T::view(self)
            .ok_or_else(|| format_err!("{:?} is not a {} tensor", self, T::name()))
    }
}

impl<T: Datum, D: Dimension> From<Array<T, D>> for Tensor {
    fn from(array: Array<T, D>) -> Tensor {
        T::from_array(array.into_dyn())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if self.rank() == 0 {
            write!(fmt, "{}", self.datum_type())
        } else {
            write!(fmt, "{}x{}", self.shape().iter().join("x"), self.datum_type())
        }
    }
}
