//! Typed validation failures.
//!
//! These are raised through `anyhow` like every other trellis error, but kept
//! as a concrete enum so callers can downcast on the kind when they need to
//! distinguish a missing key from a shape or dtype conflict.
use crate::datum::DatumType;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A declared path is absent from the dictionary being validated.
    MissingKey { path: String },
    /// Axis arity or dimension conflict. `axis: None` means the tensor's rank
    /// does not match the spec; otherwise `expected`/`actual` are dimensions
    /// of the named axis (`symbol` is unset for literal axes).
    ShapeMismatch {
        path: String,
        axis: Option<usize>,
        symbol: Option<String>,
        expected: usize,
        actual: usize,
    },
    /// Declared element type does not match the tensor's.
    DtypeMismatch { path: String, expected: DatumType, actual: DatumType },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::MissingKey { path } => {
                write!(fmt, "missing key {path:?}")
            }
            ValidationError::ShapeMismatch { path, axis: None, expected, actual, .. } => {
                write!(fmt, "shape mismatch for {path:?}: expected {expected} axes, got {actual}")
            }
            ValidationError::ShapeMismatch {
                path,
                axis: Some(axis),
                symbol,
                expected,
                actual,
            } => {
                write!(fmt, "shape mismatch for {path:?} on axis {axis}")?;
                if let Some(symbol) = symbol {
                    write!(fmt, " ({symbol})")?;
                }
                write!(fmt, ": expected {expected}, got {actual}")
            }
            ValidationError::DtypeMismatch { path, expected, actual } => {
                write!(fmt, "dtype mismatch for {path:?}: expected {expected}, got {actual}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = ValidationError::MissingKey { path: "state.h".into() };
        assert_eq!(e.to_string(), "missing key \"state.h\"");
        let e = ValidationError::ShapeMismatch {
            path: "in".into(),
            axis: Some(1),
            symbol: Some("h".into()),
            expected: 4,
            actual: 5,
        };
        assert_eq!(e.to_string(), "shape mismatch for \"in\" on axis 1 (h): expected 4, got 5");
        let e = ValidationError::DtypeMismatch {
            path: "in".into(),
            expected: DatumType::F32,
            actual: DatumType::I64,
        };
        assert_eq!(e.to_string(), "dtype mismatch for \"in\": expected f32, got i64");
    }
}
