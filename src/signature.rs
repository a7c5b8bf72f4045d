//! Signature Model (spec.md §4.2): builds a [`FunctionSignature`] from a
//! syntactic declaration plus optional enclosing-type context, resolving
//! parameter and result types through a [`SymbolTable`].

use std::fmt;

use crate::ast::{
    FunctionDeclSyntax, InitializerDeclSyntax, InoutMark, MutatingMark, ParamSyntax,
    PropertyDeclSyntax, StaticMark,
};
use crate::types::{NominalId, NominalKind, SymbolTable, Type, UnresolvedTypeError};

/// How a value crosses the call boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convention {
    /// Passed by value (the default).
    ByValue,
    /// Passed `inout`: the callee observes and may mutate the caller's
    /// storage.
    Inout,
    /// Used only for `self` and results — not a syntactic convention a
    /// parameter can itself carry, but a classification the lowering
    /// engine assigns when re-lowering a result for indirect return.
    Direct,
}

/// One parameter of a [`FunctionSignature`], after type resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub convention: Convention,
    pub argument_label: Option<String>,
    pub parameter_name: String,
    pub ty: Type,
    /// Set by the lowering engine on *cdecl* parameters that carry a
    /// primitive numeric type unchanged from the original declaration.
    /// Always `false` on a pre-lowering [`FunctionSignature`]'s own
    /// parameters.
    pub is_primitive: bool,
}

impl Parameter {
    /// Build a pre-lowering parameter; `is_primitive` is meaningless prior
    /// to lowering and is always `false` here.
    fn original(convention: Convention, argument_label: Option<String>, parameter_name: String, ty: Type) -> Self {
        Parameter {
            convention,
            argument_label,
            parameter_name,
            ty,
            is_primitive: false,
        }
    }

    /// Build a flat cdecl parameter: no argument label (cdecl thunks have
    /// none), `is_primitive` defaulting to `false` (callers that know
    /// better, i.e. the primitive case, flip it after construction).
    pub fn cdecl(convention: Convention, name: &str, ty: Type) -> Self {
        Parameter {
            convention,
            argument_label: None,
            parameter_name: name.to_owned(),
            ty,
            is_primitive: false,
        }
    }
}

/// The signature's result: always `Convention::Direct` at this stage —
/// the lowering engine is what decides whether it ends up direct or
/// indirect in the generated cdecl thunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultSignature {
    pub convention: Convention,
    pub ty: Type,
}

/// A fully resolved function/initializer/property-accessor signature,
/// prior to lowering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    pub is_static_or_class: bool,
    pub self_parameter: Option<Parameter>,
    pub parameters: Vec<Parameter>,
    pub result: ResultSignature,
}

/// Failure constructing a [`FunctionSignature`] from syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureError {
    UnresolvedType(UnresolvedTypeError),
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::UnresolvedType(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SignatureError {}

impl From<UnresolvedTypeError> for SignatureError {
    fn from(value: UnresolvedTypeError) -> Self {
        SignatureError::UnresolvedType(value)
    }
}

fn lower_param(param: &ParamSyntax, symbols: &dyn SymbolTable) -> Result<Parameter, SignatureError> {
    let ty = symbols.resolve_type(&param.type_syntax)?;
    let convention = match param.inout_mark {
        InoutMark::Inout => Convention::Inout,
        InoutMark::Plain => Convention::ByValue,
    };
    Ok(Parameter::original(
        convention,
        param.argument_label.clone(),
        param.parameter_name.clone(),
        ty,
    ))
}

/// Build the self parameter for an instance method/initializer on
/// `enclosing`, or `None` for a free function or a `static`/`class`
/// member (spec.md §4.2). `self` is only `inout` when the method is
/// `mutating` *and* `enclosing` is a value type (`struct`/`enum`) — a
/// `mutating` method on a `class`/`actor` still passes `self` by value,
/// since mutating a reference type's stored properties doesn't rebind
/// the reference itself.
fn build_self_parameter(
    enclosing: Option<NominalId>,
    static_mark: StaticMark,
    mutating_mark: MutatingMark,
    symbols: &dyn SymbolTable,
) -> Option<Parameter> {
    let enclosing = enclosing?;
    if matches!(static_mark, StaticMark::Static) {
        return None;
    }
    let is_value_type = matches!(
        symbols.nominal(enclosing).kind,
        NominalKind::Struct | NominalKind::Enum
    );
    let convention = match mutating_mark {
        MutatingMark::Mutating if is_value_type => Convention::Inout,
        _ => Convention::ByValue,
    };
    Some(Parameter::original(
        convention,
        None,
        "self".to_owned(),
        Type::Nominal {
            decl: enclosing,
            generic_args: vec![],
        },
    ))
}

/// Build a [`FunctionSignature`] for a free function or method.
pub fn signature_from_function(
    decl: &FunctionDeclSyntax,
    enclosing: Option<NominalId>,
    symbols: &dyn SymbolTable,
) -> Result<FunctionSignature, SignatureError> {
    let mut parameters = Vec::with_capacity(decl.parameters.len());
    for p in &decl.parameters {
        parameters.push(lower_param(p, symbols)?);
    }

    let result_ty = match &decl.return_type {
        Some(syntax) => symbols.resolve_type(syntax)?,
        None => Type::void(),
    };

    Ok(FunctionSignature {
        is_static_or_class: matches!(decl.static_mark, StaticMark::Static),
        self_parameter: build_self_parameter(enclosing, decl.static_mark, decl.mutating_mark, symbols),
        parameters,
        result: ResultSignature {
            convention: Convention::Direct,
            ty: result_ty,
        },
    })
}

/// Build a [`FunctionSignature`] for a (non-failable) initializer. Result
/// type is the enclosing nominal itself.
pub fn signature_from_initializer(
    decl: &InitializerDeclSyntax,
    enclosing: NominalId,
    symbols: &dyn SymbolTable,
) -> Result<FunctionSignature, SignatureError> {
    let mut parameters = Vec::with_capacity(decl.parameters.len());
    for p in &decl.parameters {
        parameters.push(lower_param(p, symbols)?);
    }

    Ok(FunctionSignature {
        is_static_or_class: false,
        self_parameter: None,
        parameters,
        result: ResultSignature {
            convention: Convention::Direct,
            ty: Type::Nominal {
                decl: enclosing,
                generic_args: vec![],
            },
        },
    })
}

/// Build the logical *getter* signature for a property binding: no
/// parameters, result is the declared type (or void — spec.md §9's open
/// question on untyped properties, preserved here and surfaced by the
/// visitor as a diagnostic rather than by this pure construction step).
pub fn getter_signature_from_property(
    decl: &PropertyDeclSyntax,
    enclosing: Option<NominalId>,
    symbols: &dyn SymbolTable,
) -> Result<FunctionSignature, SignatureError> {
    let result_ty = match &decl.type_syntax {
        Some(syntax) => symbols.resolve_type(syntax)?,
        None => Type::void(),
    };

    Ok(FunctionSignature {
        is_static_or_class: false,
        self_parameter: build_self_parameter(enclosing, StaticMark::Instance, MutatingMark::NonMutating, symbols),
        parameters: vec![],
        result: ResultSignature {
            convention: Convention::Direct,
            ty: result_ty,
        },
    })
}

/// Build the mirrored one-parameter *setter* signature for a settable
/// property binding (spec.md §4.1).
pub fn setter_signature_from_property(
    decl: &PropertyDeclSyntax,
    enclosing: Option<NominalId>,
    symbols: &dyn SymbolTable,
) -> Result<FunctionSignature, SignatureError> {
    let value_ty = match &decl.type_syntax {
        Some(syntax) => symbols.resolve_type(syntax)?,
        None => Type::void(),
    };

    Ok(FunctionSignature {
        is_static_or_class: false,
        self_parameter: build_self_parameter(enclosing, StaticMark::Instance, MutatingMark::Mutating, symbols),
        parameters: vec![Parameter::original(
            Convention::ByValue,
            None,
            "newValue".to_owned(),
            value_ty,
        )],
        result: ResultSignature {
            convention: Convention::Direct,
            ty: Type::void(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{TypeSyntax, Visibility};
    use crate::types::{NominalKind, SymbolTableArena};

    fn arena_with_point() -> (SymbolTableArena, NominalId) {
        let mut arena = SymbolTableArena::new();
        crate::wellknown::install(&mut arena);
        let point = arena.declare("Point", "App", None, NominalKind::Struct);
        (arena, point)
    }

    #[test]
    fn free_function_has_no_self() {
        let (arena, _point) = arena_with_point();
        let decl = FunctionDeclSyntax {
            name: "add".to_owned(),
            visibility: Visibility::Public,
            static_mark: StaticMark::Instance,
            mutating_mark: MutatingMark::NonMutating,
            parameters: vec![
                ParamSyntax {
                    argument_label: None,
                    parameter_name: "x".to_owned(),
                    type_syntax: TypeSyntax::named("Int32"),
                    inout_mark: InoutMark::Plain,
                },
                ParamSyntax {
                    argument_label: None,
                    parameter_name: "y".to_owned(),
                    type_syntax: TypeSyntax::named("Int32"),
                    inout_mark: InoutMark::Plain,
                },
            ],
            return_type: Some(TypeSyntax::named("Int32")),
        };

        let sig = signature_from_function(&decl, None, &arena).unwrap();
        assert!(sig.self_parameter.is_none());
        assert_eq!(sig.parameters.len(), 2);
    }

    #[test]
    fn mutating_method_gets_inout_self() {
        let (arena, point) = arena_with_point();
        let decl = FunctionDeclSyntax {
            name: "translate".to_owned(),
            visibility: Visibility::Public,
            static_mark: StaticMark::Instance,
            mutating_mark: MutatingMark::Mutating,
            parameters: vec![],
            return_type: None,
        };

        let sig = signature_from_function(&decl, Some(point), &arena).unwrap();
        let self_param = sig.self_parameter.unwrap();
        assert_eq!(self_param.convention, Convention::Inout);
        assert_eq!(sig.result.ty, Type::void());
    }

    #[test]
    fn mutating_setter_on_a_class_keeps_self_by_value() {
        let mut arena = SymbolTableArena::new();
        crate::wellknown::install(&mut arena);
        let counter = arena.declare("Counter", "App", None, NominalKind::Class);
        let decl = PropertyDeclSyntax {
            name: "count".to_owned(),
            visibility: Visibility::Public,
            type_syntax: Some(TypeSyntax::named("Int32")),
            is_settable: true,
        };

        let sig = setter_signature_from_property(&decl, Some(counter), &arena).unwrap();
        let self_param = sig.self_parameter.unwrap();
        assert_eq!(self_param.convention, Convention::ByValue);
    }

    #[test]
    fn static_method_has_no_self_even_with_enclosing_type() {
        let (arena, point) = arena_with_point();
        let decl = FunctionDeclSyntax {
            name: "origin".to_owned(),
            visibility: Visibility::Public,
            static_mark: StaticMark::Static,
            mutating_mark: MutatingMark::NonMutating,
            parameters: vec![],
            return_type: Some(TypeSyntax::named("Point")),
        };

        let sig = signature_from_function(&decl, Some(point), &arena).unwrap();
        assert!(sig.self_parameter.is_none());
        assert!(sig.is_static_or_class);
    }

    #[test]
    fn untyped_property_getter_defaults_to_void() {
        let (arena, point) = arena_with_point();
        let decl = PropertyDeclSyntax {
            name: "mystery".to_owned(),
            visibility: Visibility::Public,
            type_syntax: None,
            is_settable: false,
        };

        let sig = getter_signature_from_property(&decl, Some(point), &arena).unwrap();
        assert_eq!(sig.result.ty, Type::void());
    }
}
