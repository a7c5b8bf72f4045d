//! Canonical representation of types in the source language ("Language S").
//!
//! Mirrors [`why_lib::typechecker::types::Type`] in spirit: a small, closed
//! tagged union with structural equality, used throughout the lowering
//! pipeline instead of raw syntax. Nominal types are not stored inline —
//! they are handles (`NominalId`) into a flat, process-wide [`SymbolTable`]
//! arena, so the type graph itself stays a tree (tuples, metatypes) with no
//! possibility of cycles.

use std::fmt;

use crate::ast::TypeSyntax;

/// Handle into a [`SymbolTable`]'s arena of declared nominal types.
///
/// Declarations own their `NominalDecl`; consumers only ever hold this
/// handle, never a borrowed reference that outlives the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct NominalId(pub usize);

/// The four/five declaration forms Language S distinguishes for visibility
/// and ABI purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NominalKind {
    Class,
    Actor,
    Struct,
    Enum,
    Protocol,
}

/// A declared nominal type, as resolved by the symbol table.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NominalDecl {
    pub name: String,
    pub module_name: String,
    pub parent: Option<NominalId>,
    pub kind: NominalKind,
}

/// Canonical type representation used throughout signature construction,
/// lowering, and C projection.
///
/// Canonical void is `Type::Tuple(vec![])`, never a dedicated variant —
/// this is load-bearing: the indirect-result selection logic in
/// [`crate::lowering::engine`] tests cdecl parameter counts, not a type
/// tag, to decide whether a result is void.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Type {
    /// Reference to a declared type, with resolved generic arguments.
    Nominal {
        decl: NominalId,
        generic_args: Vec<Type>,
    },
    /// Ordered sequence of element types. Empty denotes void.
    Tuple(Vec<Type>),
    /// The type of a type — `I.Type` for instance type `I`.
    Metatype(Box<Type>),
    /// Function type. Unsupported by lowering; modeled only so it can be
    /// rejected with a precise diagnostic rather than failing to resolve.
    Function {
        params: Vec<Type>,
        result: Box<Type>,
    },
    /// Optional type. Unsupported by lowering, same rationale as `Function`.
    Optional(Box<Type>),
}

impl Type {
    /// The canonical empty-tuple void type.
    pub fn void() -> Type {
        Type::Tuple(Vec::new())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Tuple(elements) if elements.is_empty())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Nominal { decl, generic_args } if generic_args.is_empty() => {
                write!(f, "Nominal({})", decl.0)
            }
            Type::Nominal { decl, generic_args } => {
                let args = generic_args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Nominal({})<{args}>", decl.0)
            }
            Type::Tuple(elements) if elements.is_empty() => write!(f, "Void"),
            Type::Tuple(elements) => {
                let inner = elements
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({inner})")
            }
            Type::Metatype(inner) => write!(f, "{inner}.Type"),
            Type::Function { params, result } => {
                let inner = params
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({inner}) -> {result}")
            }
            Type::Optional(inner) => write!(f, "{inner}?"),
        }
    }
}

/// Error resolving a syntactic type reference to a concrete [`Type`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedTypeError {
    pub syntax: TypeSyntax,
}

impl fmt::Display for UnresolvedTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not resolve type '{}'", self.syntax.describe())
    }
}

impl std::error::Error for UnresolvedTypeError {}

/// Read-only view over the process-wide table of declared nominal types.
///
/// This is the "symbol table" spec.md's external-interfaces section
/// describes: populated once by the caller before lowering begins, then
/// only ever read. [`SymbolTableArena`] is the one concrete implementation
/// this crate ships, suitable for tests and small embeddings; real hosts
/// are expected to back this trait with their own resolved compiler state.
pub trait SymbolTable {
    fn resolve_type(&self, syntax: &TypeSyntax) -> Result<Type, UnresolvedTypeError>;

    fn nominal(&self, id: NominalId) -> &NominalDecl;
}

/// A flat arena-backed [`SymbolTable`]: nominal declarations live in a
/// `Vec` and are referenced by index, with a name lookup table for
/// resolving syntactic literals (including the well-known standard
/// library names installed by [`crate::wellknown::install`]).
#[derive(Default)]
pub struct SymbolTableArena {
    decls: Vec<NominalDecl>,
    by_qualified_name: std::collections::HashMap<(Option<NominalId>, String), NominalId>,
}

impl SymbolTableArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new nominal type at the given (optional) parent and
    /// return its handle.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        module_name: impl Into<String>,
        parent: Option<NominalId>,
        kind: NominalKind,
    ) -> NominalId {
        let name = name.into();
        let id = NominalId(self.decls.len());
        self.decls.push(NominalDecl {
            name: name.clone(),
            module_name: module_name.into(),
            parent,
            kind,
        });
        self.by_qualified_name.insert((parent, name), id);
        id
    }

    pub fn lookup_name(&self, parent: Option<NominalId>, name: &str) -> Option<NominalId> {
        self.by_qualified_name
            .get(&(parent, name.to_owned()))
            .copied()
    }
}

impl SymbolTable for SymbolTableArena {
    fn resolve_type(&self, syntax: &TypeSyntax) -> Result<Type, UnresolvedTypeError> {
        match syntax {
            TypeSyntax::Named { name, generic_args } => {
                let id = self
                    .lookup_name(None, name)
                    .ok_or_else(|| UnresolvedTypeError {
                        syntax: syntax.clone(),
                    })?;
                let mut resolved_args = Vec::with_capacity(generic_args.len());
                for arg in generic_args {
                    resolved_args.push(self.resolve_type(arg)?);
                }
                Ok(Type::Nominal {
                    decl: id,
                    generic_args: resolved_args,
                })
            }
            TypeSyntax::Tuple(elements) => {
                let mut resolved = Vec::with_capacity(elements.len());
                for element in elements {
                    resolved.push(self.resolve_type(element)?);
                }
                Ok(Type::Tuple(resolved))
            }
            TypeSyntax::Metatype(inner) => Ok(Type::Metatype(Box::new(self.resolve_type(inner)?))),
            TypeSyntax::Function { params, result } => {
                let mut resolved_params = Vec::with_capacity(params.len());
                for p in params {
                    resolved_params.push(self.resolve_type(p)?);
                }
                Ok(Type::Function {
                    params: resolved_params,
                    result: Box::new(self.resolve_type(result)?),
                })
            }
            TypeSyntax::Optional(inner) => Ok(Type::Optional(Box::new(self.resolve_type(inner)?))),
        }
    }

    fn nominal(&self, id: NominalId) -> &NominalDecl {
        &self.decls[id.0]
    }
}
