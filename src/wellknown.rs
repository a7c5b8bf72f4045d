//! The "small table of well-known standard-library nominals" from spec.md
//! §3: primitive numerics, `Int`, and the eight pointer-family types.
//!
//! Classification is driven purely by `(module_name, parent, name)` on a
//! [`NominalDecl`] — the lookup tables below are populated once (via
//! `once_cell::sync::Lazy`, as `why_lib`'s shared static lookup tables
//! are) and never mutated again, matching spec.md §5's "populated once
//! before lowering begins".

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use crate::types::NominalDecl;

/// A primitive numeric (or `Int`) mapped straight through to the same
/// cdecl type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
    /// Swift's pointer-sized signed integer; C-projected per
    /// [`crate::config::PointerWidth`] (see
    /// [`crate::c_projection::project_function`]).
    PointerSizedInt,
}

/// `(requiresElementType, mutable, hasCount)` classification of a pointer
/// family nominal, per spec.md §3's invariant table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerFamily {
    pub requires_element_type: bool,
    pub mutable: bool,
    pub has_count: bool,
}

static PRIMITIVES: Lazy<HashMap<&'static str, PrimitiveKind>> = Lazy::new(|| {
    use PrimitiveKind::*;
    HashMap::from([
        ("Int8", Int8),
        ("Int16", Int16),
        ("Int32", Int32),
        ("Int64", Int64),
        ("UInt8", UInt8),
        ("UInt16", UInt16),
        ("UInt32", UInt32),
        ("UInt64", UInt64),
        ("Float", Float32),
        ("Double", Float64),
        ("Bool", Bool),
        ("Int", PointerSizedInt),
    ])
});

static POINTER_FAMILIES: Lazy<HashMap<&'static str, PointerFamily>> = Lazy::new(|| {
    HashMap::from([
        (
            "UnsafeRawPointer",
            PointerFamily {
                requires_element_type: false,
                mutable: false,
                has_count: false,
            },
        ),
        (
            "UnsafeMutableRawPointer",
            PointerFamily {
                requires_element_type: false,
                mutable: true,
                has_count: false,
            },
        ),
        (
            "UnsafePointer",
            PointerFamily {
                requires_element_type: true,
                mutable: false,
                has_count: false,
            },
        ),
        (
            "UnsafeMutablePointer",
            PointerFamily {
                requires_element_type: true,
                mutable: true,
                has_count: false,
            },
        ),
        (
            "UnsafeBufferPointer",
            PointerFamily {
                requires_element_type: true,
                mutable: false,
                has_count: true,
            },
        ),
        (
            "UnsafeMutableBufferPointer",
            PointerFamily {
                requires_element_type: true,
                mutable: true,
                has_count: true,
            },
        ),
        (
            "UnsafeRawBufferPointer",
            PointerFamily {
                requires_element_type: false,
                mutable: false,
                has_count: true,
            },
        ),
        (
            "UnsafeMutableRawBufferPointer",
            PointerFamily {
                requires_element_type: false,
                mutable: true,
                has_count: true,
            },
        ),
    ])
});

/// Names installed into a fresh [`crate::types::SymbolTableArena`] so
/// that syntactic references to e.g. `"Int"` or `"UnsafeRawPointer"`
/// resolve. Exposed separately from [`install`] so hosts with their own
/// arena wiring can just read the name list.
pub fn well_known_names() -> impl Iterator<Item = &'static str> {
    PRIMITIVES.keys().copied().chain(POINTER_FAMILIES.keys().copied())
}

/// Seed a fresh arena with all well-known standard-library nominals,
/// all declared as `struct`s at module `"Swift"` with no parent — the
/// shape the classification functions below key off of. Returns nothing;
/// callers resolve names via [`crate::types::SymbolTable::resolve_type`]
/// afterwards.
pub fn install(arena: &mut crate::types::SymbolTableArena) {
    for name in well_known_names() {
        arena.declare(name, "Swift", None, crate::types::NominalKind::Struct);
    }
}

fn is_well_known(decl: &NominalDecl) -> bool {
    decl.module_name == "Swift" && decl.parent.is_none()
}

/// Classify `decl` as a primitive numeric, if it is the `Swift`-module,
/// parentless nominal of one of the well-known primitive names.
pub fn classify_primitive(decl: &NominalDecl) -> Option<PrimitiveKind> {
    if !is_well_known(decl) {
        return None;
    }
    PRIMITIVES.get(decl.name.as_str()).copied()
}

/// Classify `decl` as a pointer family, if it is the `Swift`-module,
/// parentless nominal of one of the eight well-known pointer names.
pub fn classify_pointer_family(decl: &NominalDecl) -> Option<PointerFamily> {
    if !is_well_known(decl) {
        return None;
    }
    POINTER_FAMILIES.get(decl.name.as_str()).copied()
}

/// Resolved handles to the two raw-pointer nominals the lowering engine
/// needs to build *new* cdecl parameter types (as opposed to classifying
/// an existing one): `UnsafeRawPointer` and `UnsafeMutableRawPointer`.
///
/// Resolved once from a [`crate::types::SymbolTable`] before lowering
/// begins, matching spec.md §5 — never re-resolved per declaration.
#[derive(Clone, Copy, Debug)]
pub struct WellKnownIds {
    pub unsafe_raw_pointer: crate::types::NominalId,
    pub unsafe_mutable_raw_pointer: crate::types::NominalId,
    pub int: crate::types::NominalId,
}

/// Fatal setup-time failure: the symbol table the caller provided does
/// not declare one of the standard-library nominals this crate's well-known
/// table expects (e.g. it was never seeded via [`install`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupError {
    pub missing_name: &'static str,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "symbol table does not declare well-known type '{}'; did you forget to call wellknown::install?",
            self.missing_name
        )
    }
}

impl std::error::Error for SetupError {}

impl WellKnownIds {
    pub fn resolve(symbols: &dyn crate::types::SymbolTable) -> Result<Self, SetupError> {
        let lookup = |name: &'static str| -> Result<crate::types::NominalId, SetupError> {
            match symbols.resolve_type(&crate::ast::TypeSyntax::named(name)) {
                Ok(crate::types::Type::Nominal { decl, .. }) => Ok(decl),
                _ => Err(SetupError { missing_name: name }),
            }
        };
        Ok(WellKnownIds {
            unsafe_raw_pointer: lookup("UnsafeRawPointer")?,
            unsafe_mutable_raw_pointer: lookup("UnsafeMutableRawPointer")?,
            int: lookup("Int")?,
        })
    }

    pub fn raw_pointer_type(&self, mutable: bool) -> crate::types::Type {
        let decl = if mutable {
            self.unsafe_mutable_raw_pointer
        } else {
            self.unsafe_raw_pointer
        };
        crate::types::Type::Nominal {
            decl,
            generic_args: vec![],
        }
    }

    pub fn int_type(&self) -> crate::types::Type {
        crate::types::Type::Nominal {
            decl: self.int,
            generic_args: vec![],
        }
    }
}
