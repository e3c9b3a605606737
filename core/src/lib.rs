//! # Trellis
//!
//! A contract layer for composable, stateful computation modules. Models
//! declare which named tensors they consume and produce, for data and for
//! recurrent state, in a small shape/dtype grammar, and every invocation is
//! checked against those declarations before and after the user-supplied
//! computation runs. Undeclared tensors never reach user code.
//!
//! ## Example
//!
//! ```
//! use trellis_core::prelude::*;
//! use ndarray::ArrayD;
//!
//! struct Doubler {
//!     input: SpecDict,
//!     output: SpecDict,
//! }
//!
//! impl Doubler {
//!     fn new() -> TrellisResult<Doubler> {
//!         let scope = SymbolScope::default();
//!         Ok(Doubler {
//!             input: SpecDict::new().with("obs", TensorSpec::parse(&scope, "b, h")?.bind("h", 2)?),
//!             output: SpecDict::new().with("out", TensorSpec::parse(&scope, "b, h")?.bind("h", 2)?),
//!         })
//!     }
//! }
//!
//! impl ForwardComputation for Doubler {
//!     fn input_spec(&self) -> &SpecDict {
//!         &self.input
//!     }
//!
//!     fn output_spec(&self) -> &SpecDict {
//!         &self.output
//!     }
//!
//!     fn compute_forward(
//!         &self,
//!         inputs: TensorDict,
//!         _session: &mut SessionState,
//!     ) -> TrellisResult<TensorDict> {
//!         let obs = inputs.get("obs")?.to_array_view::<f32>()?;
//!         Ok(tdict!("out" => obs.mapv(|x| x * 2.0)))
//!     }
//! }
//!
//! let model = RecurrentModel::feedforward(Doubler::new().unwrap());
//! let inputs = tdict!("obs" => ArrayD::from_elem(ndarray::IxDyn(&[3, 2]), 1f32));
//! let out = model.forward(inputs, &mut SessionState::default()).unwrap();
//! assert_eq!(out.get("out").unwrap().shape(), &[3, 2]);
//! ```

pub mod io;
pub mod model;
pub mod spec;

pub use trellis_data::{TrellisError, TrellisResult};

pub mod prelude {
    pub use crate::io::{read_checkpoint, write_checkpoint, Parameters, Persistence};
    pub use crate::model::{
        Feedforward, ForwardComputation, Model, RecurrentComputation, RecurrentModel,
        SessionState,
    };
    pub use crate::spec::{AxisToken, Bindings, SpecDict, Symbol, SymbolScope, TensorSpec};
    pub use trellis_data::prelude::*;
}

pub mod internal {
    pub use crate::prelude::*;
    pub use trellis_data::internal::*;
}
