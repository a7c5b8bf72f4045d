//! Thunk Body Assembler (spec.md §4.5): combines a [`LoweredFunctionSignature`]
//! with the original declaration's name into a rendering-intent tree for
//! the cdecl thunk's body. This crate stops at the tree — turning it into
//! source text is a pretty-printer's job, not this module's.

use crate::lowering::{ConversionStep, LoweredFunctionSignature};

/// One reconstructed argument passed to the original declaration, with
/// whatever argument label the original parameter carried (`None` for
/// positional parameters and `self`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThunkArgument {
    pub label: Option<String>,
    pub reconstruction: ConversionStep,
}

/// The call to the original declaration this thunk exists to forward to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThunkCall {
    /// `self`'s reconstruction, for an instance method/property/initializer
    /// receiver; `None` for a free function, static member, or initializer.
    pub receiver: Option<ConversionStep>,
    pub name: String,
    pub arguments: Vec<ThunkArgument>,
}

/// How the thunk disposes of `call`'s result — spec.md §4.3's
/// indirect-result selection, realized here as the corresponding
/// rendering choice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnMode {
    /// Void result: evaluate `call`, return nothing.
    VoidCall,
    /// Non-void result that was selected indirect: assign `call`'s value
    /// through the indirect-result pointee, then return nothing.
    IndirectAssign { target: ConversionStep },
    /// Non-void result that stayed direct: `return call`.
    Return,
}

/// The complete rendering intent for one generated thunk body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThunkBody {
    pub call: ThunkCall,
    pub return_mode: ReturnMode,
}

/// Assemble the thunk body for a declaration named `original_name`,
/// given its already-lowered signature.
pub fn assemble(original_name: &str, lowered: &LoweredFunctionSignature) -> ThunkBody {
    let arguments = lowered
        .original
        .parameters
        .iter()
        .zip(&lowered.parameters)
        .map(|(param, lowered_param)| ThunkArgument {
            label: param.argument_label.clone(),
            reconstruction: lowered_param.cdecl_to_original.clone(),
        })
        .collect();

    let receiver = lowered
        .self_lowering
        .as_ref()
        .map(|self_lowering| self_lowering.cdecl_to_original.clone());

    let call = ThunkCall {
        receiver,
        name: original_name.to_owned(),
        arguments,
    };

    let return_mode = if lowered.original.result.ty.is_void() {
        ReturnMode::VoidCall
    } else if lowered.is_indirect_result {
        ReturnMode::IndirectAssign {
            target: lowered.result.cdecl_to_original.clone(),
        }
    } else {
        ReturnMode::Return
    };

    ThunkBody { call, return_mode }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeSyntax;
    use crate::lowering::engine::lower_function_signature;
    use crate::signature::{Convention, FunctionSignature, Parameter, ResultSignature};
    use crate::types::{NominalKind, SymbolTableArena};
    use crate::wellknown::{self, WellKnownIds};

    #[test]
    fn void_result_free_function_has_no_receiver_and_void_call() {
        let mut arena = SymbolTableArena::new();
        wellknown::install(&mut arena);
        let ids = WellKnownIds::resolve(&arena).unwrap();
        let i32_ty = arena.resolve_type(&TypeSyntax::named("Int32")).unwrap();

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: None,
            parameters: vec![Parameter::cdecl(Convention::ByValue, "x", i32_ty)],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: crate::types::Type::void(),
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        let body = assemble("log", &lowered);

        assert!(body.call.receiver.is_none());
        assert_eq!(body.call.arguments.len(), 1);
        assert_eq!(body.return_mode, ReturnMode::VoidCall);
    }

    #[test]
    fn direct_primitive_result_returns_the_call() {
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
        let body = assemble("add", &lowered);
        assert_eq!(body.return_mode, ReturnMode::Return);
    }

    #[test]
    fn indirect_struct_result_assigns_through_the_target() {
        let mut arena = SymbolTableArena::new();
        wellknown::install(&mut arena);
        let ids = WellKnownIds::resolve(&arena).unwrap();
        let point = arena.declare("Point", "App", None, NominalKind::Struct);
        let point_ty = crate::types::Type::Nominal {
            decl: point,
            generic_args: vec![],
        };

        let sig = FunctionSignature {
            is_static_or_class: false,
            self_parameter: Some(Parameter::cdecl(
                Convention::ByValue,
                "self",
                point_ty.clone(),
            )),
            parameters: vec![],
            result: ResultSignature {
                convention: Convention::Direct,
                ty: point_ty,
            },
        };

        let lowered = lower_function_signature(&sig, &ids, &arena).unwrap();
        let body = assemble("translated", &lowered);

        assert!(body.call.receiver.is_some());
        assert!(matches!(body.return_mode, ReturnMode::IndirectAssign { .. }));
    }
}
