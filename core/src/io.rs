//! Checkpointing of model parameters.
//!
//! The durable format is an NPZ bundle, one entry per parameter path. A
//! backend only has to describe its learnable state as a [`TensorDict`]
//! (the [`Parameters`] trait); [`Persistence`] then comes for free. Failure
//! modes (missing file, malformed archive) surface from the backend with
//! context, and a load into a model whose parameter shapes drifted from the
//! checkpoint is the backend's to reject in `load_parameters`.
use log::debug;
use ndarray::{IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};
use std::path::Path;
use trellis_data::prelude::*;
use trellis_data::{bail, Context};

/// Save/restore of a model's learnable state. `load` restores into an
/// already-constructed, spec-compatible instance: loading a checkpoint of
/// `m` into an identically-configured `m2` leaves `m2`'s parameters equal to
/// `m`'s at save time.
pub trait Persistence {
    fn save(&self, path: &Path) -> TrellisResult<()>;
    fn load(&mut self, path: &Path) -> TrellisResult<()>;
}

/// A computation that exposes its learnable state as a tensor dictionary.
pub trait Parameters {
    fn parameters(&self) -> TensorDict;
    fn load_parameters(&mut self, parameters: TensorDict) -> TrellisResult<()>;
}

impl<T: Parameters> Persistence for T {
    fn save(&self, path: &Path) -> TrellisResult<()> {
        write_checkpoint(path, &self.parameters())
    }

    fn load(&mut self, path: &Path) -> TrellisResult<()> {
        self.load_parameters(read_checkpoint(path)?)
    }
}

/// Writes a dictionary as an NPZ bundle, one entry per path.
pub fn write_checkpoint(path: impl AsRef<Path>, dict: &TensorDict) -> TrellisResult<()> {
    let path = path.as_ref();
    debug!("Writing checkpoint {path:?} ({} tensors)", dict.len());
    let mut npz = NpzWriter::new_compressed(fs_err::File::create(path)?);
    for (name, tensor) in dict.iter() {
        match &**tensor {
            Tensor::Bool(a) => npz.add_array(name, a)?,
            Tensor::I32(a) => npz.add_array(name, a)?,
            Tensor::I64(a) => npz.add_array(name, a)?,
            Tensor::F32(a) => npz.add_array(name, a)?,
            Tensor::F64(a) => npz.add_array(name, a)?,
        }
    }
    npz.finish().with_context(|| format!("Writing checkpoint {path:?}"))?;
    Ok(())
}

/// Reads an NPZ bundle back into a dictionary.
pub fn read_checkpoint(path: impl AsRef<Path>) -> TrellisResult<TensorDict> {
    let path = path.as_ref();
    debug!("Reading checkpoint {path:?}");
    let mut npz = NpzReader::new(fs_err::File::open(path)?)?;
    let mut dict = TensorDict::new();
    for name in npz.names()? {
        let tensor = for_npz(&mut npz, &name)
            .with_context(|| format!("Reading entry {name:?} of checkpoint {path:?}"))?;
        dict.insert(name.trim_end_matches(".npy"), Arc::new(tensor));
    }
    Ok(dict)
}

/// Probes an NPZ entry with each supported element type in turn.
fn for_npz(npz: &mut NpzReader<fs_err::File>, name: &str) -> TrellisResult<Tensor> {
    if let Ok(t) = npz.by_name::<OwnedRepr<f32>, IxDyn>(name) {
        return Ok(t.into());
    }
    if let Ok(t) = npz.by_name::<OwnedRepr<f64>, IxDyn>(name) {
        return Ok(t.into());
    }
    if let Ok(t) = npz.by_name::<OwnedRepr<i32>, IxDyn>(name) {
        return Ok(t.into());
    }
    if let Ok(t) = npz.by_name::<OwnedRepr<i64>, IxDyn>(name) {
        return Ok(t.into());
    }
    if let Ok(t) = npz.by_name::<OwnedRepr<bool>, IxDyn>(name) {
        return Ok(t.into());
    }
    bail!("Unsupported datum type for entry {:?}", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForwardComputation, RecurrentModel, SessionState};
    use crate::spec::{SpecDict, SymbolScope, TensorSpec};
    use ndarray::{arr1, arr2, ArrayD, IxDyn};

    #[test]
    fn checkpoint_round_trip_keeps_paths_shapes_and_dtypes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.npz");
        let dict = tdict!(
            "w" => arr2(&[[1f32, 2.0], [3.0, 4.0]]),
            "state.h" => arr1(&[1f64, 2.0]),
            "steps" => arr1(&[7i64]),
            "ids" => arr1(&[1i32, 2, 3]),
            "mask" => arr1(&[true, false])
        );
        write_checkpoint(&path, &dict).unwrap();
        let restored = read_checkpoint(&path).unwrap();
        assert_eq!(restored, dict);
    }

    #[test]
    fn reading_a_missing_checkpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_checkpoint(dir.path().join("nope.npz")).is_err());
    }

    // Scenario: save a trained model, build a fresh one with different
    // parameters, load, and observe the first model's parameters.
    struct Scaler {
        input: SpecDict,
        output: SpecDict,
        weights: ArrayD<f32>,
    }

    impl Scaler {
        fn new(value: f32) -> Scaler {
            let scope = SymbolScope::default();
            Scaler {
                input: SpecDict::new().with("in", TensorSpec::parse(&scope, "b").unwrap()),
                output: SpecDict::new().with("out", TensorSpec::parse(&scope, "b").unwrap()),
                weights: ArrayD::from_elem(IxDyn(&[1]), value),
            }
        }
    }

    impl ForwardComputation for Scaler {
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
            let w = self.weights[[0]];
            let out = inputs.get("in")?.to_array_view::<f32>()?.mapv(|x| x * w);
            Ok(tdict!("out" => out))
        }
    }

    impl Parameters for Scaler {
        fn parameters(&self) -> TensorDict {
            tdict!("weights" => self.weights.clone())
        }

        fn load_parameters(&mut self, parameters: TensorDict) -> TrellisResult<()> {
            self.weights = parameters.get("weights")?.to_array_view::<f32>()?.to_owned();
            Ok(())
        }
    }

    #[test]
    fn save_load_round_trips_model_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.npz");

        let trained = RecurrentModel::feedforward(Scaler::new(1.0));
        trained.save(&path).unwrap();

        let mut fresh = RecurrentModel::feedforward(Scaler::new(2.0));
        assert_ne!(fresh.parameters(), trained.parameters());
        fresh.load(&path).unwrap();
        assert_eq!(fresh.parameters(), trained.parameters());

        // and the restored model computes with the restored weights
        let out = fresh
            .forward(tdict!("in" => arr1(&[1f32, 2.0])), &mut SessionState::default())
            .unwrap();
        assert_eq!(
            out.get("out").unwrap().to_array_view::<f32>().unwrap(),
            arr1(&[1f32, 2.0]).into_dyn().view()
        );
    }
}
