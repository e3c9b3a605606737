//! Element types supported by trellis tensors.
use crate::tensor::Tensor;
use ndarray::{ArrayD, ArrayViewD};
use std::fmt;

/// The element type of a tensor, as an opaque tag.
///
/// The dictionary and spec layers only ever compare these; numeric semantics
/// stay with the computation behind the tensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatumType {
    Bool,
    I32,
    I64,
    F32,
    F64,
}

impl DatumType {
    /// Every supported element type, in the order checkpoint readers probe them.
    pub const ALL: [DatumType; 5] =
        [DatumType::F32, DatumType::F64, DatumType::I32, DatumType::I64, DatumType::Bool];

    pub fn size_of(&self) -> usize {
        match self {
            DatumType::Bool => 1,
            DatumType::I32 | DatumType::F32 => 4,
            DatumType::I64 | DatumType::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DatumType::F32 | DatumType::F64)
    }
}

impl fmt::Display for DatumType {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DatumType::Bool => "bool",
            DatumType::I32 => "i32",
            DatumType::I64 => "i64",
            DatumType::F32 => "f32",
            DatumType::F64 => "f64",
        };
        write!(fmt, "{name}")
    }
}

impl std::str::FromStr for DatumType {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<DatumType, anyhow::Error> {
        match s {
            "bool" => Ok(DatumType::Bool),
            "i32" => Ok(DatumType::I32),
            "i64" => Ok(DatumType::I64),
            "f32" => Ok(DatumType::F32),
            "f64" => Ok(DatumType::F64),
            _ => anyhow::bail!("Unknown datum type {}", s),
        }
    }
}

/// Ties a Rust scalar type to its [`DatumType`] tag and to the matching
/// [`Tensor`] variant.
pub trait Datum:
    Clone + Send + Sync + fmt::Debug + Default + PartialEq + 'static
{
    fn name() -> &'static str;
    fn datum_type() -> DatumType;
    fn from_array(array: ArrayD<Self>) -> Tensor;
    fn view(tensor: &Tensor) -> Option<ArrayViewD<'_, Self>>;
}

macro_rules! datum {
    ($t:ty, $v:ident) => {
        impl Datum for $t {
            fn name() -> &'static str {
                stringify!($t)
            }

            fn datum_type() -> DatumType {
                DatumType::$v
            }

            fn from_array(array: ArrayD<Self>) -> Tensor {
                Tensor::$v(array)
            }

            fn view(tensor: &Tensor) -> Option<ArrayViewD<'_, Self>> {
                match tensor {
                    Tensor::$v(array) => Some(array.view()),
                    _ => None,
                }
            }
        }
    };
}

datum!(bool, Bool);
datum!(i32, I32);
datum!(i64, I64);
datum!(f32, F32);
datum!(f64, F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips() {
        for dt in DatumType::ALL {
            assert_eq!(dt.to_string().parse::<DatumType>().unwrap(), dt);
        }
    }

    #[test]
    fn sizes() {
        assert_eq!(DatumType::Bool.size_of(), 1);
        assert_eq!(DatumType::F32.size_of(), 4);
        assert_eq!(DatumType::I64.size_of(), 8);
    }
}
