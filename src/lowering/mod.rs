//! The Lowering Engine (spec.md §4.3): type-directed transformation of a
//! resolved [`crate::signature::FunctionSignature`] into a flat cdecl
//! parameter list plus the [`conversion::ConversionStep`] trees needed to
//! reconstruct each original argument and the result.

pub mod conversion;
pub mod engine;
pub mod error;

pub use conversion::{Component, ConversionStep, LabeledArgument};
pub use engine::{lower_function_signature, CdeclSignature, LoweredFunctionSignature, LoweredParameters};
pub use error::LoweringError;
