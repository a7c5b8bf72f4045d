//! C Projection (spec.md §4.4): map a lowered cdecl signature's flat,
//! already-ABI-safe [`Type`] values onto the small closed set of C types a
//! generated declaration may use.
//!
//! Every `Type` reaching this module is guaranteed by construction (see
//! [`crate::lowering::engine`]) to be either void, a well-known primitive,
//! or one of the two raw-pointer nominals — nothing else ever survives
//! lowering into a cdecl parameter or result type.

use std::fmt;

use crate::config::LoweringConfig;
use crate::lowering::LoweredFunctionSignature;
use crate::types::{SymbolTable, Type};
use crate::wellknown::{self, PrimitiveKind};

/// A C type usable in a generated declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    /// Pointer-sized signed integer (`intptr_t`), the projection of
    /// `PrimitiveKind::PointerSizedInt`.
    IntPtrT,
    /// Any lowered pointer value — `void *`. Lowering erases element-type
    /// information from the cdecl signature itself (it lives only in the
    /// corresponding [`crate::lowering::ConversionStep`]), so every raw
    /// pointer projects identically here.
    VoidPtr,
    Void,
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spelling = match self {
            CType::Int8 => "int8_t",
            CType::Int16 => "int16_t",
            CType::Int32 => "int32_t",
            CType::Int64 => "int64_t",
            CType::UInt8 => "uint8_t",
            CType::UInt16 => "uint16_t",
            CType::UInt32 => "uint32_t",
            CType::UInt64 => "uint64_t",
            CType::Float => "float",
            CType::Double => "double",
            CType::Bool => "bool",
            CType::IntPtrT => "intptr_t",
            CType::VoidPtr => "void *",
            CType::Void => "void",
        };
        f.write_str(spelling)
    }
}

/// Identity pass over a already-projected [`CType`]. Kept as a named step
/// (rather than inlined at call sites) because spec.md §4.4 calls out
/// array-to-pointer decay as a distinct stage of C projection even though
/// this crate's lowering never produces a cdecl array type to decay.
pub fn decay(ty: CType) -> CType {
    ty
}

/// Failure projecting a lowered [`Type`] onto [`CType`] — always an
/// internal invariant violation, since every type reaching this module
/// should already have passed through [`crate::lowering::engine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectionError {
    pub ty: Type,
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal error: '{}' is not a projectable cdecl type", self.ty)
    }
}

impl std::error::Error for ProjectionError {}

fn project_type(ty: &Type, symbols: &dyn SymbolTable, config: &LoweringConfig) -> Result<CType, ProjectionError> {
    match ty {
        Type::Tuple(elements) if elements.is_empty() => Ok(CType::Void),
        Type::Nominal { decl, .. } => {
            let nominal = symbols.nominal(*decl);
            if let Some(primitive) = wellknown::classify_primitive(nominal) {
                Ok(match primitive {
                    PrimitiveKind::Int8 => CType::Int8,
                    PrimitiveKind::Int16 => CType::Int16,
                    PrimitiveKind::Int32 => CType::Int32,
                    PrimitiveKind::Int64 => CType::Int64,
                    PrimitiveKind::UInt8 => CType::UInt8,
                    PrimitiveKind::UInt16 => CType::UInt16,
                    PrimitiveKind::UInt32 => CType::UInt32,
                    PrimitiveKind::UInt64 => CType::UInt64,
                    PrimitiveKind::Float32 => CType::Float,
                    PrimitiveKind::Float64 => CType::Double,
                    PrimitiveKind::Bool => CType::Bool,
                    PrimitiveKind::PointerSizedInt => match config.pointer_width.bits() {
                        32 => CType::Int32,
                        _ => CType::IntPtrT,
                    },
                })
            } else {
                // Anything nominal surviving lowering that isn't a
                // classified primitive is one of the two raw-pointer
                // types the engine builds for every other case.
                Ok(CType::VoidPtr)
            }
        }
        _ => Err(ProjectionError { ty: ty.clone() }),
    }
}

/// One parameter of a generated [`CFunction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CParameter {
    pub name: String,
    pub ty: CType,
}

/// A generated C function declaration, ready for rendering as a header
/// prototype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CFunction {
    pub name: String,
    pub result_type: CType,
    pub parameters: Vec<CParameter>,
    pub is_variadic: bool,
}

/// Project a [`LoweredFunctionSignature`]'s cdecl signature to a
/// [`CFunction`] named `cdecl_name`, under `config`'s target-platform
/// choices (currently just [`crate::config::PointerWidth`], which governs
/// the `Int` → fixed-width-or-`intptr_t` mapping).
pub fn project_function(
    cdecl_name: &str,
    lowered: &LoweredFunctionSignature,
    symbols: &dyn SymbolTable,
    config: &LoweringConfig,
) -> Result<CFunction, ProjectionError> {
    let mut parameters = Vec::with_capacity(lowered.cdecl.parameters.len());
    for param in &lowered.cdecl.parameters {
        parameters.push(CParameter {
            name: param.parameter_name.clone(),
            ty: decay(project_type(&param.ty, symbols, config)?),
        });
    }

    Ok(CFunction {
        name: cdecl_name.to_owned(),
        result_type: decay(project_type(&lowered.cdecl.result_type, symbols, config)?),
        parameters,
        is_variadic: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeSyntax;
    use crate::lowering::engine::lower_function_signature;
    use crate::signature::{Convention, FunctionSignature, Parameter, ResultSignature};
    use crate::types::SymbolTableArena;
    use crate::wellknown::WellKnownIds;

    #[test]
    fn primitive_params_and_result_project_to_fixed_width_c_types() {
        let mut arena = SymbolTableArena::new();
        wellknown::install(&mut arena);
        let ids = WellKnownIds::resolve(&arena).unwrap();
        let i32_ty = arena.resolve_type(&TypeSyntax::named("Int32")).unwrap();

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![
                Parameter::cdecl(Convention::ByValue, "x", i32_ty.clone()),
                Parameter::cdecl(Convention::ByValue, "y", i32_ty.clone()),
            ],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: i32_ty,
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        let c_func = project_function("add_c", &lowered, &arena, &LoweringConfig::default()).unwrap();

        assert_eq!(c_func.name, "add_c");
        assert_eq!(c_func.result_type, CType::Int32);
        assert_eq!(c_func.parameters.len(), 2);
        assert!(c_func.parameters.iter().all(|p| p.ty == CType::Int32));
        assert!(!c_func.is_variadic);
    }

    #[test]
    fn void_result_projects_to_void() {
        let mut arena = SymbolTableArena::new();
        wellknown::install(&mut arena);
        let ids = WellKnownIds::resolve(&arena).unwrap();

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: Type::void(),
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        let c_func = project_function("noop_c", &lowered, &arena, &LoweringConfig::default()).unwrap();
        assert_eq!(c_func.result_type, CType::Void);
    }

    #[test]
    fn pointer_sized_int_follows_configured_width() {
        let mut arena = SymbolTableArena::new();
        wellknown::install(&mut arena);
        let ids = WellKnownIds::resolve(&arena).unwrap();
        let int_ty = ids.int_type();

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: int_ty,
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();

        let sixty_four = project_function("w64_c", &lowered, &arena, &LoweringConfig::default()).unwrap();
        assert_eq!(sixty_four.result_type, CType::IntPtrT);

        let thirty_two_config = LoweringConfig {
            pointer_width: crate::config::PointerWidth::ThirtyTwo,
        };
        let thirty_two = project_function("w32_c", &lowered, &arena, &thirty_two_config).unwrap();
        assert_eq!(thirty_two.result_type, CType::Int32);
    }
}
