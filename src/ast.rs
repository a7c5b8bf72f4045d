//! Minimal syntax-level input surface.
//!
//! spec.md treats source parsing and name resolution of extensions as
//! external collaborators: "assumed: a syntax tree and a resolved symbol
//! table are provided" (§1). The types in this module are that assumed
//! syntax tree — a small, fully-owned fixture representation a real host
//! would build from its own parser's AST, and that this crate's own tests
//! build directly. Nothing here participates in lowering; lowering only
//! ever touches [`crate::types::Type`] and [`crate::signature::FunctionSignature`].

use std::fmt;

/// Access-modifier presence, the sole visibility axis lowering cares
/// about (spec.md §4.1: "importable iff it carries a `public` access
/// modifier").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Internal,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Syntactic type reference, as written by the programmer, prior to
/// symbol-table resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSyntax {
    Named {
        name: String,
        generic_args: Vec<TypeSyntax>,
    },
    Tuple(Vec<TypeSyntax>),
    Metatype(Box<TypeSyntax>),
    Function {
        params: Vec<TypeSyntax>,
        result: Box<TypeSyntax>,
    },
    Optional(Box<TypeSyntax>),
}

impl TypeSyntax {
    pub fn named(name: impl Into<String>) -> Self {
        TypeSyntax::Named {
            name: name.into(),
            generic_args: vec![],
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeSyntax>) -> Self {
        TypeSyntax::Named {
            name: name.into(),
            generic_args: args,
        }
    }

    /// Short human-readable label, used only in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TypeSyntax::Named { name, generic_args } if generic_args.is_empty() => name.clone(),
            TypeSyntax::Named { name, generic_args } => format!(
                "{name}<{}>",
                generic_args
                    .iter()
                    .map(|a| a.describe())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            TypeSyntax::Tuple(elements) => format!(
                "({})",
                elements
                    .iter()
                    .map(|e| e.describe())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            TypeSyntax::Metatype(inner) => format!("{}.Type", inner.describe()),
            TypeSyntax::Function { params, result } => format!(
                "({}) -> {}",
                params
                    .iter()
                    .map(|p| p.describe())
                    .collect::<Vec<_>>()
                    .join(", "),
                result.describe()
            ),
            TypeSyntax::Optional(inner) => format!("{}?", inner.describe()),
        }
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Whether a parameter is declared `inout` in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InoutMark {
    Inout,
    Plain,
}

/// A single parameter as written in source, prior to signature construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSyntax {
    pub argument_label: Option<String>,
    pub parameter_name: String,
    pub type_syntax: TypeSyntax,
    pub inout_mark: InoutMark,
}

/// Whether a method is declared `mutating` (meaningful only on value-type
/// methods; self on a class/actor is always passed `byValue`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutatingMark {
    Mutating,
    NonMutating,
}

/// Whether a method/initializer is `static`/`class`-scoped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaticMark {
    Static,
    Instance,
}

/// A free function or method declaration, as written in source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDeclSyntax {
    pub name: String,
    pub visibility: Visibility,
    pub static_mark: StaticMark,
    pub mutating_mark: MutatingMark,
    pub parameters: Vec<ParamSyntax>,
    pub return_type: Option<TypeSyntax>,
}

/// An initializer declaration (`init`), as written in source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitializerDeclSyntax {
    pub visibility: Visibility,
    pub is_failable: bool,
    pub parameters: Vec<ParamSyntax>,
}

/// A stored/computed property declaration (a single binding), as written
/// in source. `type_syntax: None` models the no-annotation case spec.md
/// §9 flags as an open question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDeclSyntax {
    pub name: String,
    pub visibility: Visibility,
    pub type_syntax: Option<TypeSyntax>,
    pub is_settable: bool,
}

/// A class/struct/extension declaration, as written in source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NominalDeclSyntax {
    pub name: String,
    pub visibility: Visibility,
    pub kind: crate::types::NominalKind,
    pub functions: Vec<FunctionDeclSyntax>,
    pub initializers: Vec<InitializerDeclSyntax>,
    pub properties: Vec<PropertyDeclSyntax>,
    /// `true` for `extension Foo { ... }` nodes, which inherit the
    /// visibility of the type they extend rather than carrying their own
    /// (spec.md §4.1).
    pub is_extension: bool,
}

/// Top-level items a whole source file (or module) is made of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopLevelItem {
    Nominal(NominalDeclSyntax),
    Function(FunctionDeclSyntax),
    /// A global (module-scope) property — unsupported per spec.md §4.1 and
    /// §9; modeled so the visitor can reject it with a structured error
    /// rather than being unable to represent the input at all.
    GlobalProperty(PropertyDeclSyntax),
}
