use super::sym::Bindings;
use super::{AxisToken, TensorSpec};
use log::trace;
use std::ops::Deref;
use trellis_data::bail;
use trellis_data::prelude::*;

/// A path-keyed dictionary of [`TensorSpec`]s. Build it once, then treat it
/// as fixed: validation never mutates it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpecDict(PathMap<TensorSpec>);

impl SpecDict {
    pub fn new() -> SpecDict {
        SpecDict::default()
    }

    pub fn with(mut self, path: impl Into<String>, spec: TensorSpec) -> SpecDict {
        self.0.insert(path, spec);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, spec: TensorSpec) {
        self.0.insert(path, spec);
    }

    /// Checks every declared path against `dict` with a fresh binding
    /// environment. Fails on the first violation, in path order.
    pub fn validate(&self, dict: &TensorDict) -> TrellisResult<()> {
        let mut bindings = Bindings::default();
        self.validate_with(dict, &mut bindings)
    }

    /// Same as [`SpecDict::validate`], but threads a caller-owned
    /// environment so one pass can span several spec dictionaries (the
    /// invocation contract validates inputs and previous state together this
    /// way, making shared symbols agree across both).
    pub fn validate_with(
        &self,
        dict: &TensorDict,
        bindings: &mut Bindings,
    ) -> TrellisResult<()> {
        for (path, spec) in self.0.iter() {
            let tensor = dict.get(path)?;
            trace!("Checking {path:?} ({tensor:?}) against \"{spec}\"");
            spec.check(path, tensor, bindings)?;
        }
        Ok(())
    }

    /// A dictionary of zero tensors matching this spec. Every axis must be
    /// literal or bound; element type defaults to f32 when undeclared.
    pub fn zeros(&self) -> TrellisResult<TensorDict> {
        let mut out = TensorDict::new();
        for (path, spec) in self.0.iter() {
            let mut shape = TVec::with_capacity(spec.rank());
            for (ix, token) in spec.axes().iter().enumerate() {
                match token {
                    AxisToken::Lit(d) | AxisToken::Bound(_, d) => shape.push(*d),
                    AxisToken::Sym(s) => {
                        bail!("Can not build a zero tensor for {path:?}: axis {ix} ({s}) is free")
                    }
                }
            }
            let dt = spec.datum_type().unwrap_or(DatumType::F32);
            out.insert(path, Arc::new(Tensor::zero(dt, &shape)));
        }
        Ok(out)
    }
}

impl Deref for SpecDict {
    type Target = PathMap<TensorSpec>;
    fn deref(&self) -> &PathMap<TensorSpec> {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<(S, TensorSpec)> for SpecDict {
    fn from_iter<I: IntoIterator<Item = (S, TensorSpec)>>(iter: I) -> SpecDict {
        SpecDict(iter.into_iter().collect())
    }
}
