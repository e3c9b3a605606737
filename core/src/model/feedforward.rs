//! Non-recurrent computations, adapted onto the recurrent contract.
use super::{RecurrentComputation, RecurrentModel, SessionState};
use crate::spec::SpecDict;
use trellis_data::prelude::*;

/// The capability a stateless computation implements: input and output specs
/// plus a forward pass.
pub trait ForwardComputation {
    fn input_spec(&self) -> &SpecDict;
    fn output_spec(&self) -> &SpecDict;

    fn compute_forward(
        &self,
        inputs: TensorDict,
        session: &mut SessionState,
    ) -> TrellisResult<TensorDict>;

    fn check_inputs(&self, inputs: TensorDict) -> TrellisResult<TensorDict> {
        Ok(inputs)
    }

    fn check_outputs(&self, outputs: TensorDict) -> TrellisResult<TensorDict> {
        Ok(outputs)
    }
}

/// Adapter implementing [`RecurrentComputation`] for a [`ForwardComputation`]
/// by fixing both state specs to the empty dictionary. The recurrent
/// validation machinery is reused unchanged; only the state is degenerate.
#[derive(Clone, Debug)]
pub struct Feedforward<C> {
    compute: C,
    state_spec: SpecDict,
}

impl<C: ForwardComputation> Feedforward<C> {
    pub fn new(compute: C) -> Feedforward<C> {
        Feedforward { compute, state_spec: SpecDict::new() }
    }

    pub fn computation(&self) -> &C {
        &self.compute
    }

    pub fn computation_mut(&mut self) -> &mut C {
        &mut self.compute
    }
}

impl<C: ForwardComputation> RecurrentComputation for Feedforward<C> {
    fn input_spec(&self) -> &SpecDict {
        self.compute.input_spec()
    }

    fn prev_state_spec(&self) -> &SpecDict {
        &self.state_spec
    }

    fn output_spec(&self) -> &SpecDict {
        self.compute.output_spec()
    }

    fn next_state_spec(&self) -> &SpecDict {
        &self.state_spec
    }

    fn compute_initial_state(&self) -> TrellisResult<TensorDict> {
        Ok(TensorDict::new())
    }

    fn compute_unroll(
        &self,
        inputs: TensorDict,
        _prev_state: TensorDict,
        session: &mut SessionState,
    ) -> TrellisResult<(TensorDict, TensorDict)> {
        Ok((self.compute.compute_forward(inputs, session)?, TensorDict::new()))
    }

    fn check_inputs_and_prev_state(
        &self,
        inputs: TensorDict,
        prev_state: TensorDict,
    ) -> TrellisResult<(TensorDict, TensorDict)> {
        Ok((self.compute.check_inputs(inputs)?, prev_state))
    }

    fn check_outputs_and_next_state(
        &self,
        outputs: TensorDict,
        next_state: TensorDict,
    ) -> TrellisResult<(TensorDict, TensorDict)> {
        Ok((self.compute.check_outputs(outputs)?, next_state))
    }
}

impl<C: crate::io::Parameters> crate::io::Parameters for Feedforward<C> {
    fn parameters(&self) -> TensorDict {
        self.compute.parameters()
    }

    fn load_parameters(&mut self, parameters: TensorDict) -> TrellisResult<()> {
        self.compute.load_parameters(parameters)
    }
}

/// A non-recurrent model: the recurrent wrapper around the adapter.
pub type Model<C> = RecurrentModel<Feedforward<C>>;

impl<C: ForwardComputation> RecurrentModel<Feedforward<C>> {
    /// Wraps a stateless computation, naming the model after it.
    pub fn feedforward(compute: C) -> Model<C> {
        let name = super::short_type_name::<C>().to_string();
        RecurrentModel::new(Feedforward::new(compute)).with_name(name)
    }

    /// One forward pass, hiding the empty state dictionaries of the
    /// underlying contract.
    pub fn forward(
        &self,
        inputs: TensorDict,
        session: &mut SessionState,
    ) -> TrellisResult<TensorDict> {
        let (outputs, _) = self.unroll(inputs, TensorDict::new(), session)?;
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{SymbolScope, TensorSpec};
    use ndarray::{ArrayD, IxDyn};

    const B: usize = 6;

    fn arange(shape: &[usize]) -> ArrayD<f32> {
        let len = shape.iter().product();
        ArrayD::from_shape_vec(IxDyn(shape), (0..len).map(|x| x as f32).collect()).unwrap()
    }

    struct Mlpish {
        input: SpecDict,
        output: SpecDict,
    }

    impl Mlpish {
        fn new() -> Mlpish {
            let scope = SymbolScope::default();
            Mlpish {
                input: SpecDict::new()
                    .with("in", TensorSpec::parse(&scope, "b, h").unwrap().bind("h", 2).unwrap()),
                output: SpecDict::new()
                    .with("out", TensorSpec::parse(&scope, "b, h").unwrap().bind("h", 3).unwrap()),
            }
        }
    }

    impl ForwardComputation for Mlpish {
        fn input_spec(&self) -> &SpecDict {
            &self.input
        }

        fn output_spec(&self) -> &SpecDict {
            &self.output
        }

        fn compute_forward(
            &self,
            inputs: TensorDict,
            _session: &mut SessionState,
        ) -> TrellisResult<TensorDict> {
            assert!(!inputs.contains("bork"));
            assert_eq!(inputs.get("in")?.to_array_view::<f32>()?, arange(&[B, 2]).view());
            Ok(tdict!("out" => arange(&[B, 3])))
        }
    }

    #[test]
    fn forward_filters_and_checks() {
        let model = RecurrentModel::feedforward(Mlpish::new());
        let inputs = tdict!(
            "in" => arange(&[B, 2]),
            "bork" => arange(&[5, 4])
        );
        let outputs = model.forward(inputs, &mut SessionState::default()).unwrap();
        assert_eq!(
            outputs.get("out").unwrap().to_array_view::<f32>().unwrap(),
            arange(&[B, 3]).view()
        );
    }

    #[test]
    fn unroll_works_too_with_empty_state() {
        let model = RecurrentModel::feedforward(Mlpish::new());
        let (outputs, next_state) = model
            .unroll(
                tdict!("in" => arange(&[B, 2])),
                TensorDict::new(),
                &mut SessionState::default(),
            )
            .unwrap();
        assert!(next_state.is_empty());
        assert_eq!(outputs.paths().collect::<Vec<_>>(), vec!["out"]);
    }

    #[test]
    fn initial_state_is_empty() {
        let model = RecurrentModel::feedforward(Mlpish::new());
        assert!(model.initial_state().unwrap().is_empty());
    }

    #[test]
    fn names_come_from_the_computation() {
        let model = RecurrentModel::feedforward(Mlpish::new());
        assert_eq!(model.name(), "Mlpish");
    }
}
