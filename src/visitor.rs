//! Declaration Visitor (spec.md §4.1): read-only traversal over a
//! caller-supplied syntax tree, selecting which declarations are
//! importable (carry a `public` access modifier, directly or by
//! extension inheritance) and producing one [`ImportedDeclaration`] per
//! signature a host should lower — a free function, an initializer, or
//! one property accessor (getter/setter).

use crate::ast::{
    FunctionDeclSyntax, InitializerDeclSyntax, NominalDeclSyntax, PropertyDeclSyntax, TopLevelItem,
};
use crate::config::SymbolNamer;
use crate::types::{NominalId, NominalKind};
use std::fmt;

/// One syntactic form selected for lowering, together with the enclosing
/// nominal (if any) its signature must be constructed against and the
/// cdecl symbol name a host-wrapper generator should emit it under.
#[derive(Clone, Debug)]
pub enum ImportedDeclaration<'a> {
    Function {
        decl: &'a FunctionDeclSyntax,
        enclosing: Option<NominalId>,
        cdecl_name: String,
    },
    Initializer {
        decl: &'a InitializerDeclSyntax,
        enclosing: NominalId,
        cdecl_name: String,
    },
    Getter {
        decl: &'a PropertyDeclSyntax,
        enclosing: Option<NominalId>,
        cdecl_name: String,
    },
    Setter {
        decl: &'a PropertyDeclSyntax,
        enclosing: Option<NominalId>,
        cdecl_name: String,
    },
}

/// Non-fatal observation raised while walking a declaration that is
/// still imported (or deliberately skipped) rather than the run aborting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A property with no explicit type annotation defaulted its
    /// accessor result/parameter type to void (spec.md §9 Open Question,
    /// decided in SPEC_FULL.md §12.1).
    UntypedPropertyAssumedVoid {
        enclosing: Option<NominalId>,
        property_name: String,
    },
    /// A failable initializer (`init?`) was skipped — spec.md §4.1 does
    /// not define a failure-channel projection for it.
    FailableInitializerSkipped {
        enclosing: NominalId,
    },
}

/// A per-declaration problem that does not abort the run: the visitor
/// records it and continues with sibling declarations (spec.md §7 "a
/// file with one bad declaration must not block importing every other
/// declaration in it").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisitorError {
    /// A module-scope (global) property. spec.md's visitor description
    /// calls this fatal; SPEC_FULL.md §12.2 deliberately implements the
    /// redesign spec.md itself invites instead, downgrading it to a
    /// structured, skippable error.
    UnsupportedGlobalProperty { name: String },
}

impl fmt::Display for VisitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitorError::UnsupportedGlobalProperty { name } => {
                write!(f, "module-scope property '{name}' cannot be lowered; global properties are unsupported")
            }
        }
    }
}

impl std::error::Error for VisitorError {}

/// A genuine programmer-invariant violation (spec.md §7: "Programmer-
/// invariant violations ... are fatal"). Unlike [`VisitorError`], this
/// aborts the whole visitor run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FatalImportError {
    /// A `protocol` declared an initializer. Language S protocols cannot
    /// carry an initializer implementation to export a thunk for.
    InitializerOnProtocol { nominal_name: String },
}

impl fmt::Display for FatalImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalImportError::InitializerOnProtocol { nominal_name } => write!(
                f,
                "protocol '{nominal_name}' declares an initializer; protocols cannot be constructed through"
            ),
        }
    }
}

impl std::error::Error for FatalImportError {}

/// Everything the visitor collects from one traversal.
#[derive(Debug, Default)]
pub struct VisitResult<'a> {
    pub declarations: Vec<ImportedDeclaration<'a>>,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: Vec<VisitorError>,
}

fn visit_property<'a>(
    decl: &'a PropertyDeclSyntax,
    enclosing: Option<NominalId>,
    namer: &dyn SymbolNamer,
    out: &mut VisitResult<'a>,
) {
    if decl.type_syntax.is_none() {
        log::warn!(
            "property '{}' has no type annotation; defaulting its accessors to void",
            decl.name
        );
        out.diagnostics.push(Diagnostic::UntypedPropertyAssumedVoid {
            enclosing,
            property_name: decl.name.clone(),
        });
    }

    out.declarations.push(ImportedDeclaration::Getter {
        decl,
        enclosing,
        cdecl_name: namer.cdecl_name(&decl.name),
    });

    if decl.is_settable {
        out.declarations.push(ImportedDeclaration::Setter {
            decl,
            enclosing,
            cdecl_name: namer.cdecl_name(&format!("set_{}", decl.name)),
        });
    }
}

fn visit_nominal<'a>(
    decl: &'a NominalDeclSyntax,
    enclosing: NominalId,
    namer: &dyn SymbolNamer,
    out: &mut VisitResult<'a>,
) -> Result<(), FatalImportError> {
    if !decl.initializers.is_empty() && matches!(decl.kind, NominalKind::Protocol) {
        return Err(FatalImportError::InitializerOnProtocol {
            nominal_name: decl.name.clone(),
        });
    }

    for function in &decl.functions {
        if function.visibility.is_public() {
            out.declarations.push(ImportedDeclaration::Function {
                decl: function,
                enclosing: Some(enclosing),
                cdecl_name: namer.cdecl_name(&function.name),
            });
        }
    }

    for initializer in &decl.initializers {
        if !initializer.visibility.is_public() {
            continue;
        }
        if initializer.is_failable {
            log::warn!(
                "skipping failable initializer on '{}': failable initializers are unsupported",
                decl.name
            );
            out.diagnostics
                .push(Diagnostic::FailableInitializerSkipped { enclosing });
            continue;
        }
        out.declarations.push(ImportedDeclaration::Initializer {
            decl: initializer,
            enclosing,
            cdecl_name: namer.cdecl_name(&format!("{}_init", decl.name)),
        });
    }

    for property in &decl.properties {
        if property.visibility.is_public() {
            visit_property(property, Some(enclosing), namer, out);
        }
    }

    Ok(())
}

/// Walk `items`, selecting importable declarations. `resolve_nominal`
/// maps a [`NominalDeclSyntax`]'s name to the [`NominalId`] an external
/// symbol table already declared it under — name resolution of the
/// declared nominals themselves is the caller's responsibility (spec.md
/// §1: "assumed: a syntax tree and a resolved symbol table are
/// provided"). A nominal the resolver cannot find is treated as
/// unimportable rather than fatal: it cannot have been declared into the
/// symbol table in the first place, which is a caller bug the visitor
/// has no way to recover from structurally, but also no reason to treat
/// as worse than "skip it".
pub fn visit<'a>(
    items: &'a [TopLevelItem],
    resolve_nominal: &dyn Fn(&str) -> Option<NominalId>,
    namer: &dyn SymbolNamer,
) -> Result<VisitResult<'a>, FatalImportError> {
    let mut out = VisitResult::default();

    for item in items {
        match item {
            TopLevelItem::Function(function) => {
                if function.visibility.is_public() {
                    out.declarations.push(ImportedDeclaration::Function {
                        decl: function,
                        enclosing: None,
                        cdecl_name: namer.cdecl_name(&function.name),
                    });
                }
            }
            TopLevelItem::GlobalProperty(property) => {
                if property.visibility.is_public() {
                    log::info!(
                        "skipping module-scope property '{}': global properties are unsupported",
                        property.name
                    );
                    out.errors.push(VisitorError::UnsupportedGlobalProperty {
                        name: property.name.clone(),
                    });
                }
            }
            TopLevelItem::Nominal(nominal) => {
                // An extension's own `visibility` field is already the
                // inherited visibility of the type it extends by the
                // time it reaches this module (spec.md §4.1); the
                // visitor does not re-derive it.
                if !nominal.visibility.is_public() {
                    continue;
                }
                let Some(enclosing) = resolve_nominal(&nominal.name) else {
                    continue;
                };
                visit_nominal(nominal, enclosing, namer, &mut out)?;
            }
        }
    }

    Ok(out)
}

/// Run [`visit`] over a whole source file's top-level items, with
/// `anyhow` context attached at this crate's one coarse integration
/// boundary (spec.md §7's fatal path). Per-declaration failures still
/// come back as [`VisitResult::errors`]/[`VisitResult::diagnostics`];
/// only a [`FatalImportError`] turns into an `Err` here.
pub fn visit_source<'a>(
    source_name: &str,
    items: &'a [TopLevelItem],
    resolve_nominal: &dyn Fn(&str) -> Option<NominalId>,
    namer: &dyn SymbolNamer,
) -> anyhow::Result<VisitResult<'a>> {
    use anyhow::Context;
    visit(items, resolve_nominal, namer)
        .with_context(|| format!("visiting top-level declarations in '{source_name}'"))
}
