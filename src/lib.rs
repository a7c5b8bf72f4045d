//! Type-directed lowering of public declarations in an ownership-managed
//! source language ("Language S") to C-ABI thunk signatures and matching
//! C function declarations.
//!
//! Parsing and name resolution are assumed to happen upstream: callers
//! hand this crate a resolved [`types::SymbolTable`] and a syntax tree
//! built from [`ast`]'s types, and walk it with [`visitor::visit`] to
//! find the importable declarations. [`signature::signature_from_function`]
//! (and its initializer/property siblings) build a [`signature::FunctionSignature`]
//! from one of those; [`lower_declaration`] is the single entry point that
//! takes it the rest of the way to a lowered cdecl signature, its
//! projected C declaration, and its thunk body.

pub mod ast;
pub mod c_projection;
pub mod config;
pub mod lowering;
pub mod signature;
pub mod thunk;
pub mod types;
pub mod visitor;
pub mod wellknown;

use lowering::LoweredFunctionSignature;

/// Everything produced by lowering one [`signature::FunctionSignature`]:
/// the lowered cdecl signature (with its per-parameter and result
/// reconstruction trees), the projected C declaration, and the thunk
/// body's rendering intent.
#[derive(Debug)]
pub struct LoweringOutput {
    pub lowered: LoweredFunctionSignature,
    pub c_function: c_projection::CFunction,
    pub thunk_body: thunk::ThunkBody,
}

/// Lower one resolved [`signature::FunctionSignature`] all the way to a
/// [`LoweringOutput`]: the engine's cdecl signature and conversion trees
/// (§4.3), its C projection (§4.4), and its thunk body (§4.5).
///
/// `original_name` is the declaration's name as written in source (used
/// to build the thunk's call expression); `cdecl_name` is the caller-
/// chosen, externally-unique symbol name for the generated thunk and C
/// declaration (spec.md §6 — this crate only consumes it, e.g. via
/// [`config::SymbolNamer`]); `config` carries the target-platform choices
/// C projection needs (currently just [`config::PointerWidth`]).
pub fn lower_declaration(
    original_name: &str,
    cdecl_name: &str,
    signature: &signature::FunctionSignature,
    ids: &wellknown::WellKnownIds,
    symbols: &dyn types::SymbolTable,
    config: &config::LoweringConfig,
) -> Result<LoweringOutput, lowering::LoweringError> {
    let lowered = lowering::lower_function_signature(signature, ids, symbols)?;
    let c_function = c_projection::project_function(cdecl_name, &lowered, symbols, config)
        .map_err(|e| lowering::LoweringError::UnhandledType(e.ty))?;
    let thunk_body = thunk::assemble(original_name, &lowered);

    Ok(LoweringOutput {
        lowered,
        c_function,
        thunk_body,
    })
}
