//! The invocation contract around user-supplied computation.
//!
//! A computation declares its tensor interface as four spec dictionaries and
//! implements the `compute_*` hooks; [`RecurrentModel`] owns it and is the
//! only entry point, so every call is validated and filtered on the way in
//! and validated again on the way out. Recurrent state travels value-to-value
//! (previous state in, next state out); the wrapper keeps nothing between
//! calls, which is what lets one instance serve many independent sequences.
use crate::spec::{Bindings, SpecDict};
use log::trace;
use std::collections::HashMap;
use trellis_data::prelude::*;
use trellis_data::Context;

mod feedforward;

pub use feedforward::{Feedforward, ForwardComputation, Model};

/// Per-call scratch handed through the hooks.
///
/// `resolved` is filled by [`RecurrentModel::unroll`] with the symbol values
/// observed while validating the call's inputs; `tensors` is a free-form side
/// channel for hooks that need to pass extra data along.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub resolved: Bindings,
    pub tensors: HashMap<String, Arc<Tensor>>,
}

/// The capability a recurrent computation implements: four fixed spec
/// accessors and the computation hooks. User code goes in the `compute_*`
/// hooks; the `check_*` hooks may refine or transform values but must keep
/// them conforming.
pub trait RecurrentComputation {
    fn input_spec(&self) -> &SpecDict;
    fn prev_state_spec(&self) -> &SpecDict;
    fn output_spec(&self) -> &SpecDict;
    fn next_state_spec(&self) -> &SpecDict;

    /// State to carry into the first unroll. Defaults to zero tensors shaped
    /// by `next_state_spec`, which therefore must be fully concrete unless
    /// this is overridden.
    fn compute_initial_state(&self) -> TrellisResult<TensorDict> {
        self.next_state_spec().zeros()
    }

    /// The computation itself. Receives only declared, validated tensors.
    fn compute_unroll(
        &self,
        inputs: TensorDict,
        prev_state: TensorDict,
        session: &mut SessionState,
    ) -> TrellisResult<(TensorDict, TensorDict)>;

    fn check_inputs_and_prev_state(
        &self,
        inputs: TensorDict,
        prev_state: TensorDict,
    ) -> TrellisResult<(TensorDict, TensorDict)> {
        Ok((inputs, prev_state))
    }

    fn check_outputs_and_next_state(
        &self,
        outputs: TensorDict,
        next_state: TensorDict,
    ) -> TrellisResult<(TensorDict, TensorDict)> {
        Ok((outputs, next_state))
    }
}

/// Template-method wrapper around a [`RecurrentComputation`].
///
/// `unroll` and `initial_state` are inherent methods of the wrapper, not
/// trait methods, so no computation can bypass the validation and filtering
/// they perform.
#[derive(Clone, Debug)]
pub struct RecurrentModel<C> {
    compute: C,
    name: String,
}

fn short_type_name<T>() -> &'static str {
    std::any::type_name::<T>().rsplit("::").next().unwrap_or("model")
}

impl<C: RecurrentComputation> RecurrentModel<C> {
    pub fn new(compute: C) -> RecurrentModel<C> {
        RecurrentModel { compute, name: short_type_name::<C>().to_string() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> RecurrentModel<C> {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn computation(&self) -> &C {
        &self.compute
    }

    pub fn computation_mut(&mut self) -> &mut C {
        &mut self.compute
    }

    pub fn into_computation(self) -> C {
        self.compute
    }

    pub fn input_spec(&self) -> &SpecDict {
        self.compute.input_spec()
    }

    pub fn prev_state_spec(&self) -> &SpecDict {
        self.compute.prev_state_spec()
    }

    pub fn output_spec(&self) -> &SpecDict {
        self.compute.output_spec()
    }

    pub fn next_state_spec(&self) -> &SpecDict {
        self.compute.next_state_spec()
    }

    /// State for the first step of a fresh sequence, checked against
    /// `next_state_spec`: a computation can not hand out a non-conforming
    /// initial state.
    pub fn initial_state(&self) -> TrellisResult<TensorDict> {
        let state = self.compute.compute_initial_state()?;
        self.compute
            .next_state_spec()
            .validate(&state)
            .with_context(|| format!("Validating initial state of {}", self.name))?;
        Ok(state)
    }

    /// One step of the contract: validate, filter, delegate, re-validate.
    ///
    /// Inputs and previous state are validated with a shared binding
    /// environment, so a symbol used by both (typically the batch axis) must
    /// agree across them. Undeclared paths are dropped before the computation
    /// sees them.
    pub fn unroll(
        &self,
        inputs: TensorDict,
        prev_state: TensorDict,
        session: &mut SessionState,
    ) -> TrellisResult<(TensorDict, TensorDict)> {
        trace!("Unrolling {} over {} input paths", self.name, inputs.len());
        let mut bindings = Bindings::default();
        self.compute
            .input_spec()
            .validate_with(&inputs, &mut bindings)
            .with_context(|| format!("Validating inputs of {}", self.name))?;
        self.compute
            .prev_state_spec()
            .validate_with(&prev_state, &mut bindings)
            .with_context(|| format!("Validating previous state of {}", self.name))?;
        session.resolved = bindings;

        let inputs = inputs.filter(self.compute.input_spec());
        let prev_state = prev_state.filter(self.compute.prev_state_spec());
        let (inputs, prev_state) =
            self.compute.check_inputs_and_prev_state(inputs, prev_state)?;

        let (outputs, next_state) = self.compute.compute_unroll(inputs, prev_state, session)?;

        let mut bindings = Bindings::default();
        self.compute
            .output_spec()
            .validate_with(&outputs, &mut bindings)
            .with_context(|| format!("Validating outputs of {}", self.name))?;
        self.compute
            .next_state_spec()
            .validate_with(&next_state, &mut bindings)
            .with_context(|| format!("Validating next state of {}", self.name))?;
        self.compute.check_outputs_and_next_state(outputs, next_state)
    }
}

impl<C: crate::io::Parameters> crate::io::Parameters for RecurrentModel<C> {
    fn parameters(&self) -> TensorDict {
        self.compute.parameters()
    }

    fn load_parameters(&mut self, parameters: TensorDict) -> TrellisResult<()> {
        self.compute.load_parameters(parameters)
    }
}
