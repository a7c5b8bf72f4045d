//! The Lowering Engine (spec.md §4.3) — the core of this crate. Type-
//! directed transformation of one [`FunctionSignature`] into a
//! [`LoweredFunctionSignature`]: a flat cdecl parameter list, a
//! [`ConversionStep`] tree per original parameter (and for the result),
//! and an indirect-result flag.

use crate::lowering::conversion::{Component, ConversionStep, LabeledArgument};
use crate::lowering::error::LoweringError;
use crate::signature::{Convention, FunctionSignature, Parameter};
use crate::types::{SymbolTable, Type};
use crate::wellknown::{self, WellKnownIds};

/// One original parameter's (or the result's) contribution to the cdecl
/// signature: the flat parameters it lowers to, and the step that
/// reconstructs the original value from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredParameters {
    pub cdecl_to_original: ConversionStep,
    pub cdecl_parameters: Vec<Parameter>,
}

/// The flat, all-primitive-or-pointer cdecl signature a
/// [`FunctionSignature`] lowers to. Never has a self parameter (spec.md
/// §4.3: "The cdecl signature has no selfParameter").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CdeclSignature {
    pub parameters: Vec<Parameter>,
    pub result_type: Type,
}

/// The full output of lowering one declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredFunctionSignature {
    pub original: FunctionSignature,
    pub cdecl: CdeclSignature,
    /// One entry per original parameter, in declaration order.
    pub parameters: Vec<LoweredParameters>,
    pub result: LoweredParameters,
    /// `self`'s own lowering, if the declaration has a receiver. Lowered
    /// through the exact same [`lower_value`] dispatch as any other
    /// parameter (spec.md §4.3 "self lowering") — no special-cased
    /// reconstruction shape.
    pub self_lowering: Option<LoweredParameters>,
    pub is_indirect_result: bool,
}

/// Lower one value (parameter or result) of type `ty`, named `name` for
/// cdecl-parameter-naming purposes, carrying `convention`. This is the
/// parameter-lowering dispatch table of spec.md §4.3; both ordinary
/// parameters, `self`, and (with `convention` forced to `Inout`) an
/// indirect result all go through this single path — spec.md §4.3 and
/// §9 are explicit that indirect results must reuse the mutable-raw-
/// pointer path rather than a special case.
fn lower_value(
    name: &str,
    convention: Convention,
    ty: &Type,
    ids: &WellKnownIds,
    symbols: &dyn SymbolTable,
) -> Result<LoweredParameters, LoweringError> {
    match ty {
        Type::Function { .. } | Type::Optional(_) => Err(LoweringError::UnhandledType(ty.clone())),

        Type::Metatype(instance_type) => {
            let cdecl_parameters = vec![raw_pointer_parameter(name, Convention::ByValue, ids, false)];
            Ok(LoweredParameters {
                cdecl_to_original: ConversionStep::unsafe_cast_pointer(
                    ConversionStep::Placeholder,
                    (**instance_type).clone(),
                ),
                cdecl_parameters,
            })
        }

        Type::Nominal { decl, generic_args } => {
            let nominal = symbols.nominal(*decl);

            if let Some(_primitive) = wellknown::classify_primitive(nominal) {
                if matches!(convention, Convention::Inout) {
                    return Err(LoweringError::InoutNotSupported(ty.clone()));
                }
                let mut param = Parameter::cdecl(convention, name, ty.clone());
                param.is_primitive = true;
                Ok(LoweredParameters {
                    cdecl_to_original: ConversionStep::Placeholder,
                    cdecl_parameters: vec![param],
                })
            } else if let Some(family) = wellknown::classify_pointer_family(nominal) {
                let _ = generic_args;
                lower_pointer_family(name, convention, ty, family, ids)
            } else {
                Ok(lower_other_nominal(name, convention, ty, nominal.kind, ids))
            }
        }

        Type::Tuple(elements) => lower_tuple(name, convention, elements, ids, symbols),
    }
}

fn raw_pointer_parameter(
    name: &str,
    convention: Convention,
    ids: &WellKnownIds,
    mutable: bool,
) -> Parameter {
    Parameter::cdecl(convention, name, ids.raw_pointer_type(mutable))
}

/// Lower a well-known pointer-family nominal (`original_ty`, with `family`
/// its `(requiresElementType, mutable, hasCount)` classification) per the
/// four-way table in spec.md §4.3.
fn lower_pointer_family(
    name: &str,
    convention: Convention,
    original_ty: &Type,
    family: wellknown::PointerFamily,
    ids: &WellKnownIds,
) -> Result<LoweredParameters, LoweringError> {
    let element_type = || -> Type {
        match original_ty {
            Type::Nominal { generic_args, .. } => {
                generic_args.first().cloned().unwrap_or_else(Type::void)
            }
            _ => Type::void(),
        }
    };

    let pointer_name = format!("{name}_pointer");
    let pointer_param = raw_pointer_parameter(&pointer_name, convention, ids, family.mutable);

    if !family.has_count {
        let step = if family.requires_element_type {
            let pointer_leaf = ConversionStep::exploded(ConversionStep::Placeholder, Component::Pointer);
            ConversionStep::typed_pointer(pointer_leaf, element_type())
        } else {
            ConversionStep::Placeholder
        };
        return Ok(LoweredParameters {
            cdecl_to_original: step,
            cdecl_parameters: vec![pointer_param],
        });
    }

    let count_name = format!("{name}_count");
    let count_param = Parameter::cdecl(convention, &count_name, ids.int_type());

    let pointer_leaf = ConversionStep::exploded(ConversionStep::Placeholder, Component::Pointer);
    let count_leaf = ConversionStep::exploded(ConversionStep::Placeholder, Component::Count);
    let start_step = if family.requires_element_type {
        ConversionStep::typed_pointer(pointer_leaf, element_type())
    } else {
        pointer_leaf
    };

    let step = ConversionStep::Initialize(
        original_ty.clone(),
        vec![
            LabeledArgument {
                label: "start",
                step: start_step,
            },
            LabeledArgument {
                label: "count",
                step: count_leaf,
            },
        ],
    );

    Ok(LoweredParameters {
        cdecl_to_original: step,
        cdecl_parameters: vec![pointer_param, count_param],
    })
}

/// Lower a nominal type that is not a well-known pointer/primitive
/// (spec.md §4.3 "Other Nominal(N)"): one raw pointer parameter, mutable
/// iff the original convention was `inout`, reconstructed according to
/// `kind` — by-reference classes/actors reinterpret the pointer as an
/// object identity word; value-type structs/enums/protocols are passed
/// indirectly through storage.
fn lower_other_nominal(
    name: &str,
    convention: Convention,
    ty: &Type,
    kind: crate::types::NominalKind,
    ids: &WellKnownIds,
) -> LoweredParameters {
    let mutable = matches!(convention, Convention::Inout);
    let cdecl_parameters = vec![Parameter::cdecl(
        Convention::ByValue,
        name,
        ids.raw_pointer_type(mutable),
    )];

    let step = match kind {
        crate::types::NominalKind::Class | crate::types::NominalKind::Actor => {
            ConversionStep::unsafe_cast_pointer(ConversionStep::Placeholder, ty.clone())
        }
        crate::types::NominalKind::Struct
        | crate::types::NominalKind::Enum
        | crate::types::NominalKind::Protocol => ConversionStep::pass_indirectly(
            ConversionStep::pointee(ConversionStep::typed_pointer(ConversionStep::Placeholder, ty.clone())),
        ),
    };

    LoweredParameters {
        cdecl_to_original: step,
        cdecl_parameters,
    }
}

fn lower_tuple(
    name: &str,
    convention: Convention,
    elements: &[Type],
    ids: &WellKnownIds,
    symbols: &dyn SymbolTable,
) -> Result<LoweredParameters, LoweringError> {
    let mut cdecl_parameters = Vec::new();
    let mut steps = Vec::with_capacity(elements.len());

    for (i, element_ty) in elements.iter().enumerate() {
        let element_name = format!("{name}_{i}");
        let lowered = lower_value(&element_name, convention, element_ty, ids, symbols)?;
        cdecl_parameters.extend(lowered.cdecl_parameters);
        steps.push(lowered.cdecl_to_original);
    }

    Ok(LoweredParameters {
        cdecl_to_original: ConversionStep::Tuplify(steps),
        cdecl_parameters,
    })
}

/// Result lowering and indirect-result selection (spec.md §4.3): lower
/// the result as if it were a `byValue` parameter named `_result`; keep
/// it direct if that yields zero parameters (void) or exactly one
/// primitive parameter, otherwise re-lower under `inout` and mark it
/// indirect.
fn lower_result(
    result_ty: &Type,
    ids: &WellKnownIds,
    symbols: &dyn SymbolTable,
) -> Result<(LoweredParameters, Type, bool), LoweringError> {
    let direct_attempt = lower_value("_result", Convention::ByValue, result_ty, ids, symbols)?;

    match direct_attempt.cdecl_parameters.len() {
        0 => Ok((direct_attempt, Type::void(), false)),
        1 if direct_attempt.cdecl_parameters[0].is_primitive => {
            let cdecl_result_type = direct_attempt.cdecl_parameters[0].ty.clone();
            Ok((direct_attempt, cdecl_result_type, false))
        }
        _ => {
            let indirect = lower_value("_result", Convention::Inout, result_ty, ids, symbols)?;
            if indirect.cdecl_parameters.is_empty() {
                // A non-void result that re-lowers to zero parameters under
                // `inout` would violate spec.md §4.3 step 4's own
                // invariant — unreachable for any of the dispatch cases
                // above, which all produce at least one parameter for a
                // non-void type.
                return Err(LoweringError::ImproperResultLowering);
            }
            Ok((indirect, Type::void(), true))
        }
    }
}

/// Lower a complete [`FunctionSignature`]. `ids` must have been resolved
/// once (via [`WellKnownIds::resolve`]) against the same `symbols` table
/// before calling this — per spec.md §5, the well-known table and symbol
/// table are populated once, not per declaration.
pub fn lower_function_signature(
    original: &FunctionSignature,
    ids: &WellKnownIds,
    symbols: &dyn SymbolTable,
) -> Result<LoweredFunctionSignature, LoweringError> {
    let mut parameters = Vec::with_capacity(original.parameters.len());
    let mut cdecl_parameters = Vec::new();

    for param in &original.parameters {
        let lowered = lower_value(
            &param.parameter_name,
            param.convention,
            &param.ty,
            ids,
            symbols,
        )?;
        cdecl_parameters.extend(lowered.cdecl_parameters.clone());
        parameters.push(lowered);
    }

    let (result, cdecl_result_type, is_indirect_result) =
        lower_result(&original.result.ty, ids, symbols)?;

    if is_indirect_result {
        cdecl_parameters.extend(result.cdecl_parameters.clone());
    }

    // Self is lowered exactly like an ordinary parameter and appended
    // last (spec.md §4.3 "Self lowering" / §9 "Implicit self").
    let self_lowering = match &original.self_parameter {
        Some(self_param) => {
            let lowered_self = lower_value(
                &self_param.parameter_name,
                self_param.convention,
                &self_param.ty,
                ids,
                symbols,
            )?;
            cdecl_parameters.extend(lowered_self.cdecl_parameters.clone());
            Some(lowered_self)
        }
        None => None,
    };

    Ok(LoweredFunctionSignature {
        original: original.clone(),
        cdecl: CdeclSignature {
            parameters: cdecl_parameters,
            result_type: cdecl_result_type,
        },
        parameters,
        result,
        self_lowering,
        is_indirect_result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeSyntax;
    use crate::signature::{Parameter as SigParameter, ResultSignature};
    use crate::types::{NominalKind, SymbolTableArena};

    fn setup() -> (SymbolTableArena, WellKnownIds) {
        let mut arena = SymbolTableArena::new();
        wellknown::install(&mut arena);
        let ids = WellKnownIds::resolve(&arena).unwrap();
        (arena, ids)
    }

    fn int32(arena: &SymbolTableArena) -> Type {
        arena
            .resolve_type(&TypeSyntax::named("Int32"))
            .expect("Int32 is well-known")
    }

    #[test]
    fn scenario_1_two_primitive_params_direct_result() {
        let (arena, ids) = setup();
        let i32_ty = int32(&arena);

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![
                SigParameter::cdecl(Convention::ByValue, "x", i32_ty.clone()),
                SigParameter::cdecl(Convention::ByValue, "y", i32_ty.clone()),
            ],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: i32_ty.clone(),
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        assert!(!lowered.is_indirect_result);
        assert_eq!(lowered.cdecl.parameters.len(), 2);
        assert_eq!(lowered.cdecl.result_type, i32_ty);
    }

    #[test]
    fn scenario_3_buffer_pointer_explodes_into_two_params() {
        let (arena, ids) = setup();
        let buffer_ty = arena
            .resolve_type(&TypeSyntax::generic(
                "UnsafeBufferPointer",
                vec![TypeSyntax::named("Int32")],
            ))
            .unwrap();
        let int_ty = arena.resolve_type(&TypeSyntax::named("Int")).unwrap();

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![SigParameter::cdecl(Convention::ByValue, "b", buffer_ty)],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: int_ty.clone(),
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        assert_eq!(lowered.cdecl.parameters.len(), 2);
        assert_eq!(lowered.cdecl.parameters[0].parameter_name, "b_pointer");
        assert_eq!(lowered.cdecl.parameters[1].parameter_name, "b_count");
        assert_eq!(lowered.cdecl.result_type, int_ty);
        assert_eq!(lowered.parameters[0].cdecl_to_original.leaf_count(), 2);
    }

    #[test]
    fn scenario_4_struct_method_gets_indirect_result() {
        let (mut arena, ids) = setup();
        let point = arena.declare("Point", "App", None, NominalKind::Struct);
        let point_ty = Type::Nominal {
            decl: point,
            generic_args: vec![],
        };

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: Some(SigParameter::cdecl(Convention::ByValue, "self", point_ty.clone())),
            parameters: vec![SigParameter::cdecl(Convention::ByValue, "d", point_ty.clone())],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: point_ty,
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        assert!(lowered.is_indirect_result);
        assert!(lowered.cdecl.result_type.is_void());
        // d, _result (indirect), self — in that order.
        let names: Vec<_> = lowered
            .cdecl
            .parameters
            .iter()
            .map(|p| p.parameter_name.as_str())
            .collect();
        assert_eq!(names, vec!["d", "_result", "self"]);
    }

    #[test]
    fn scenario_5_class_method_void_result() {
        let (mut arena, ids) = setup();
        let counter = arena.declare("Counter", "App", None, NominalKind::Class);
        let counter_ty = Type::Nominal {
            decl: counter,
            generic_args: vec![],
        };

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: Some(SigParameter::cdecl(Convention::ByValue, "self", counter_ty)),
            parameters: vec![],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: Type::void(),
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        assert!(!lowered.is_indirect_result);
        assert_eq!(lowered.cdecl.parameters.len(), 1);
        assert_eq!(lowered.cdecl.parameters[0].parameter_name, "self");
    }

    #[test]
    fn inout_primitive_is_rejected() {
        let (arena, ids) = setup();
        let i32_ty = int32(&arena);

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![SigParameter::cdecl(Convention::Inout, "x", i32_ty)],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: Type::void(),
            },
        };

        let err = lower_function_signature(&sig, &ids, &arena).unwrap_err();
        assert!(matches!(err, LoweringError::InoutNotSupported(_)));
    }

    #[test]
    fn function_typed_parameter_is_rejected() {
        let (arena, ids) = setup();

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![SigParameter::cdecl(
                Convention::ByValue,
                "f",
                Type::Function {
                    params: vec![],
                    result: Box::new(Type::void()),
                },
            )],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: Type::void(),
            },
        };

        let err = lower_function_signature(&sig, &ids, &arena).unwrap_err();
        assert!(matches!(err, LoweringError::UnhandledType(_)));
    }

    #[test]
    fn tuple_parameter_flattens_to_sum_of_children() {
        let (arena, ids) = setup();
        let i32_ty = int32(&arena);

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![SigParameter::cdecl(
                Convention::ByValue,
                "pair",
                Type::Tuple(vec![i32_ty.clone(), i32_ty]),
            )],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: Type::void(),
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        assert_eq!(lowered.cdecl.parameters.len(), 2);
        assert_eq!(lowered.cdecl.parameters[0].parameter_name, "pair_0");
        assert_eq!(lowered.cdecl.parameters[1].parameter_name, "pair_1");
    }
}
