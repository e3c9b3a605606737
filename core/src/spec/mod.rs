//! The shape/dtype declaration grammar and its validator.
//!
//! A [`TensorSpec`] is an ordered list of axis tokens plus an optional element
//! type; a [`SpecDict`] maps tensor paths to specs and validates whole
//! dictionaries, threading a [`Bindings`] environment so the same free symbol
//! must resolve to the same dimension wherever it occurs in one pass.
use log::trace;
use std::fmt;
use trellis_data::ensure;
use trellis_data::errors::ValidationError;
use trellis_data::prelude::*;

mod dict;
mod parse;
mod sym;

pub use self::dict::SpecDict;
pub use self::parse::parse_axes;
pub use self::sym::{Bindings, Symbol, SymbolScope};

/// One axis declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum AxisToken {
    /// Literal dimension.
    Lit(usize),
    /// Free symbol, consistency-checked through the binding environment.
    Sym(Symbol),
    /// Symbol fixed to a dimension for the enclosing spec only.
    Bound(Symbol, usize),
}

impl fmt::Display for AxisToken {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AxisToken::Lit(d) => write!(fmt, "{d}"),
            AxisToken::Sym(s) => write!(fmt, "{s}"),
            AxisToken::Bound(s, d) => write!(fmt, "{s}={d}"),
        }
    }
}

/// The declared shape (and optionally element type) of one tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct TensorSpec {
    axes: TVec<AxisToken>,
    datum_type: Option<DatumType>,
}

impl TensorSpec {
    /// Parses an axis list such as `"b, t, h"`. Symbols are interned in
    /// `scope`; fix one with [`TensorSpec::bind`] afterwards.
    pub fn parse(scope: &SymbolScope, expr: &str) -> TrellisResult<TensorSpec> {
        Ok(TensorSpec { axes: parse::parse_axes(scope, expr)?, datum_type: None })
    }

    pub fn from_axes(axes: impl IntoIterator<Item = AxisToken>) -> TensorSpec {
        TensorSpec { axes: axes.into_iter().collect(), datum_type: None }
    }

    /// Fixes every occurrence of the named free symbol in this spec. The
    /// binding is local: the same symbol stays free in every other spec.
    pub fn bind(mut self, name: &str, value: usize) -> TrellisResult<TensorSpec> {
        let mut hits = 0;
        for axis in self.axes.iter_mut() {
            if let AxisToken::Sym(s) = axis {
                if s.name() == name {
                    *axis = AxisToken::Bound(s.clone(), value);
                    hits += 1;
                }
            }
        }
        ensure!(hits > 0, "No free symbol {} in spec \"{}\"", name, self);
        Ok(self)
    }

    pub fn with_datum_type(mut self, dt: DatumType) -> TensorSpec {
        self.datum_type = Some(dt);
        self
    }

    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[AxisToken] {
        &self.axes
    }

    pub fn datum_type(&self) -> Option<DatumType> {
        self.datum_type
    }

    /// Checks one tensor against this spec, binding free symbols in
    /// `bindings` as they are first observed.
    pub fn check(
        &self,
        path: &str,
        tensor: &Tensor,
        bindings: &mut Bindings,
    ) -> TrellisResult<()> {
        let shape = tensor.shape();
        if shape.len() != self.axes.len() {
            return Err(ValidationError::ShapeMismatch {
                path: path.to_string(),
                axis: None,
                symbol: None,
                expected: self.axes.len(),
                actual: shape.len(),
            }
            .into());
        }
        for (ix, (token, &dim)) in self.axes.iter().zip(shape.iter()).enumerate() {
            let mismatch = |symbol: Option<&Symbol>, expected: usize| {
                TrellisError::from(ValidationError::ShapeMismatch {
                    path: path.to_string(),
                    axis: Some(ix),
                    symbol: symbol.map(|s| s.name()),
                    expected,
                    actual: dim,
                })
            };
            match token {
                AxisToken::Lit(expected) => {
                    if dim != *expected {
                        return Err(mismatch(None, *expected));
                    }
                }
                AxisToken::Bound(s, expected) => {
                    if dim != *expected {
                        return Err(mismatch(Some(s), *expected));
                    }
                }
                AxisToken::Sym(s) => match bindings.get(s) {
                    Some(expected) => {
                        if dim != expected {
                            return Err(mismatch(Some(s), expected));
                        }
                    }
                    None => {
                        trace!("Binding {s} to {dim} (axis {ix} of {path:?})");
                        bindings.bind(s, dim);
                    }
                },
            }
        }
        if let Some(expected) = self.datum_type {
            if tensor.datum_type() != expected {
                return Err(ValidationError::DtypeMismatch {
                    path: path.to_string(),
                    expected,
                    actual: tensor.datum_type(),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl fmt::Display for TensorSpec {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use itertools::Itertools;
        write!(fmt, "{}", self.axes.iter().join(", "))?;
        if let Some(dt) = self.datum_type {
            write!(fmt, " ({dt})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;
    use ndarray::IxDyn;

    fn t(shape: &[usize]) -> Tensor {
        Tensor::from(ArrayD::from_elem(IxDyn(shape), 0f32))
    }

    #[test]
    fn bind_fixes_this_spec_only() {
        let scope = SymbolScope::default();
        let spec = TensorSpec::parse(&scope, "b, h").unwrap().bind("h", 4).unwrap();
        assert_eq!(
            spec.axes(),
            &[AxisToken::Sym(scope.sym("b")), AxisToken::Bound(scope.sym("h"), 4)]
        );
        // a later spec over the same scope still sees h free
        let other = TensorSpec::parse(&scope, "b, h").unwrap();
        assert_eq!(other.axes()[1], AxisToken::Sym(scope.sym("h")));
    }

    #[test]
    fn bind_unknown_symbol_fails() {
        let scope = SymbolScope::default();
        assert!(TensorSpec::parse(&scope, "b, h").unwrap().bind("z", 1).is_err());
    }

    #[test]
    fn check_binds_then_enforces() {
        let scope = SymbolScope::default();
        let spec = TensorSpec::parse(&scope, "b, b").unwrap();
        let mut bindings = Bindings::default();
        assert!(spec.check("x", &t(&[3, 3]), &mut bindings).is_ok());
        assert_eq!(bindings.get(&scope.sym("b")), Some(3));
        let mut bindings = Bindings::default();
        let err = spec.check("x", &t(&[3, 4]), &mut bindings).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::ShapeMismatch {
                path: "x".into(),
                axis: Some(1),
                symbol: Some("b".into()),
                expected: 3,
                actual: 4,
            })
        );
    }

    #[test]
    fn check_rank() {
        let scope = SymbolScope::default();
        let spec = TensorSpec::parse(&scope, "b, t, h").unwrap();
        let err = spec.check("x", &t(&[3, 4]), &mut Bindings::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::ShapeMismatch {
                path: "x".into(),
                axis: None,
                symbol: None,
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn check_datum_type() {
        let scope = SymbolScope::default();
        let spec =
            TensorSpec::parse(&scope, "b").unwrap().with_datum_type(DatumType::I64);
        let err = spec.check("x", &t(&[3]), &mut Bindings::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::DtypeMismatch {
                path: "x".into(),
                expected: DatumType::I64,
                actual: DatumType::F32,
            })
        );
    }

    #[test]
    fn display() {
        let scope = SymbolScope::default();
        let spec = TensorSpec::parse(&scope, "b, t, h").unwrap().bind("h", 2).unwrap();
        assert_eq!(spec.to_string(), "b, t, h=2");
    }
}
