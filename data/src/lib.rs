//! Tensor values and path-keyed tensor dictionaries.
//!
//! This crate is the foundation layer of trellis: an owned [`tensor::Tensor`]
//! value exposing shape and element type, and a hierarchical, dot-path-keyed
//! container ([`dict::PathMap`]) used for both data dictionaries and spec
//! dictionaries. Nothing here knows about specs or models.

#[macro_use]
mod macros;

/// A Smallvec instantiation with 4 embeddable values.
///
/// Used for shapes and axis lists, which are over four elements about never.
pub type TVec<T> = smallvec::SmallVec<[T; 4]>;

pub use anyhow;
pub use anyhow::{anyhow as format_err, bail, ensure, Context};
pub type TrellisError = anyhow::Error;
pub type TrellisResult<T> = anyhow::Result<T>;

pub mod datum;
pub mod dict;
pub mod errors;
pub mod tensor;

pub mod prelude {
    pub use crate::datum::{Datum, DatumType};
    pub use crate::dict::{PathMap, TensorDict};
    pub use crate::errors::ValidationError;
    pub use crate::tensor::Tensor;
    pub use crate::{tdict, tvec, TVec, TrellisError, TrellisResult};
    pub use std::sync::Arc;
}

pub mod internal {
    pub use crate::prelude::*;
    pub use crate::{bail, ensure, format_err, Context};
    pub use ndarray as trellis_ndarray;
}
