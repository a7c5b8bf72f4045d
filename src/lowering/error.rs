//! Error kinds surfaced per declaration by the lowering engine (spec.md §7).
//! One declaration's `LoweringError` never aborts a whole visitor run — see
//! [`crate::visitor`].

use std::fmt;

use crate::types::Type;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoweringError {
    /// Function-typed, optional-typed, or otherwise unsupported parameter
    /// or result type.
    UnhandledType(Type),
    /// `inout` applied to a primitive scalar.
    InoutNotSupported(Type),
    /// The symbol table failed to resolve a syntactic type reference.
    UnresolvedType(crate::types::UnresolvedTypeError),
    /// Internal invariant violation in the indirect-result selection
    /// (spec.md §4.3 step 4). Should be unreachable for well-formed
    /// input; kept as a real, matchable variant rather than a panic so a
    /// defensive caller can still recover.
    ImproperResultLowering,
}

impl fmt::Display for LoweringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoweringError::UnhandledType(ty) => {
                write!(f, "type '{ty}' cannot be lowered to a C-ABI parameter")
            }
            LoweringError::InoutNotSupported(ty) => {
                write!(f, "'inout' is not supported on primitive type '{ty}'")
            }
            LoweringError::UnresolvedType(e) => write!(f, "{e}"),
            LoweringError::ImproperResultLowering => {
                write!(f, "internal error: result lowering violated its own invariant")
            }
        }
    }
}

impl std::error::Error for LoweringError {}

impl From<crate::types::UnresolvedTypeError> for LoweringError {
    fn from(value: crate::types::UnresolvedTypeError) -> Self {
        LoweringError::UnresolvedType(value)
    }
}

impl From<crate::signature::SignatureError> for LoweringError {
    fn from(value: crate::signature::SignatureError) -> Self {
        match value {
            crate::signature::SignatureError::UnresolvedType(e) => LoweringError::UnresolvedType(e),
        }
    }
}
