//! [`ConversionStep`]: the tagged-union tree describing how to reconstruct
//! one original argument (or the result) from one or more cdecl
//! placeholders (spec.md §3).

use crate::types::Type;

/// Which field of a multi-parameter group an [`ConversionStep::ExplodedComponent`]
/// picks out. Used only for buffer-pointer families (spec.md §4.3), where
/// a single original parameter lowers to a `(pointer, count)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Pointer,
    Count,
}

/// One named argument inside an [`ConversionStep::Initialize`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledArgument {
    pub label: &'static str,
    pub step: ConversionStep,
}

/// Tree describing how to reconstruct one original argument from the
/// lowered cdecl parameter(s) it corresponds to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionStep {
    /// The (sole) lowered cdecl value.
    Placeholder,
    /// Pick one field (`"pointer"` or `"count"`) of a multi-parameter
    /// group.
    ExplodedComponent(Box<ConversionStep>, Component),
    /// Reinterpret a raw pointer as a typed pointer to `swift_type`.
    TypedPointer(Box<ConversionStep>, Type),
    /// Dereference.
    Pointee(Box<ConversionStep>),
    /// Mark that the reconstructed value is read through an indirect
    /// pointer (used for value-type `inout`/indirect-result parameters).
    PassIndirectly(Box<ConversionStep>),
    /// Reinterpret an opaque reference-sized word as a reference to
    /// `swift_type`.
    UnsafeCastPointer(Box<ConversionStep>, Type),
    /// Construct `swift_type` via its named-argument initializer.
    Initialize(Type, Vec<LabeledArgument>),
    /// Build a tuple from element reconstructions.
    Tuplify(Vec<ConversionStep>),
}

impl ConversionStep {
    pub fn typed_pointer(inner: ConversionStep, ty: Type) -> Self {
        ConversionStep::TypedPointer(Box::new(inner), ty)
    }

    pub fn pointee(inner: ConversionStep) -> Self {
        ConversionStep::Pointee(Box::new(inner))
    }

    pub fn pass_indirectly(inner: ConversionStep) -> Self {
        ConversionStep::PassIndirectly(Box::new(inner))
    }

    pub fn unsafe_cast_pointer(inner: ConversionStep, ty: Type) -> Self {
        ConversionStep::UnsafeCastPointer(Box::new(inner), ty)
    }

    pub fn exploded(inner: ConversionStep, component: Component) -> Self {
        ConversionStep::ExplodedComponent(Box::new(inner), component)
    }

    /// The free `ExplodedComponent` leaves of this step, in left-to-right
    /// order (bare `Placeholder` leaves carry no component and are
    /// omitted — see [`Self::leaf_count`] for the full leaf count used by
    /// the round-trip law in spec.md §8).
    pub fn leaves(&self) -> Vec<Component> {
        match self {
            ConversionStep::Placeholder => vec![],
            ConversionStep::ExplodedComponent(_, component) => vec![*component],
            ConversionStep::TypedPointer(inner, _)
            | ConversionStep::Pointee(inner)
            | ConversionStep::PassIndirectly(inner)
            | ConversionStep::UnsafeCastPointer(inner, _) => inner.leaves(),
            ConversionStep::Initialize(_, args) => {
                args.iter().flat_map(|a| a.step.leaves()).collect()
            }
            ConversionStep::Tuplify(steps) => steps.iter().flat_map(|s| s.leaves()).collect(),
        }
    }

    /// Count of cdecl parameters this step's free leaves correspond to:
    /// every bare `Placeholder` reachable without crossing an
    /// `ExplodedComponent` counts as one, and every `ExplodedComponent`
    /// leaf counts as one (spec.md §8 invariant 2).
    pub fn leaf_count(&self) -> usize {
        match self {
            ConversionStep::Placeholder => 1,
            ConversionStep::ExplodedComponent(_, _) => 1,
            ConversionStep::TypedPointer(inner, _)
            | ConversionStep::Pointee(inner)
            | ConversionStep::PassIndirectly(inner)
            | ConversionStep::UnsafeCastPointer(inner, _) => inner.leaf_count(),
            ConversionStep::Initialize(_, args) => {
                args.iter().map(|a| a.step.leaf_count()).sum()
            }
            ConversionStep::Tuplify(steps) => steps.iter().map(|s| s.leaf_count()).sum(),
        }
    }
}
