//! Type references and the structural matcher used to compare method signatures.
//!
//! A `TypeRef` is what a method signature mentions: a plain named type, a generic parameter,
//! a closed or open generic instantiation, a modifier-wrapped type (modreq/modopt), or one of the
//! type-spec wrappers (array, pointer, by-reference, ...). The matcher answers a single question:
//! do two references denote the same slot shape, as the compiler already encoded it?

use std::fmt;

use serde::{Deserialize, Serialize};

/// A reference to a type as it appears in a method signature or a type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// A type named by its fully qualified name (e.g. `System.Int32`).
    Named(String),
    /// A generic parameter of the enclosing type or method (e.g. `T`).
    GenericParameter(String),
    /// An instantiation of a generic definition with positional arguments.
    GenericInstance {
        element: Box<TypeRef>,
        #[serde(default)]
        arguments: Vec<TypeRef>,
    },
    /// A type wrapped with a required or optional modifier token.
    Modified {
        #[serde(default)]
        kind: ModifierKind,
        modifier: Box<TypeRef>,
        element: Box<TypeRef>,
    },
    /// Array / pointer / by-reference and the other element-wrapping specs.
    Spec { kind: SpecKind, element: Box<TypeRef> },
}

/// Custom modifier flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    #[default]
    Required,
    Optional,
}

/// Element-wrapping type specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    Array,
    Pointer,
    ByReference,
    Pinned,
    Sentinel,
}

/// Knobs for the structural matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOptions {
    /// When false, two `Spec` references match on their element alone, so `int[]` and `int*`
    /// compare equal.
    pub compare_spec_kinds: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            compare_spec_kinds: true,
        }
    }
}

impl MatchOptions {
    /// Element-only comparison of type specs.
    pub fn element_only_specs() -> Self {
        Self {
            compare_spec_kinds: false,
        }
    }
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn generic_parameter(name: impl Into<String>) -> Self {
        TypeRef::GenericParameter(name.into())
    }

    pub fn instance(element: TypeRef, arguments: Vec<TypeRef>) -> Self {
        TypeRef::GenericInstance {
            element: Box::new(element),
            arguments,
        }
    }

    pub fn modified(kind: ModifierKind, modifier: TypeRef, element: TypeRef) -> Self {
        TypeRef::Modified {
            kind,
            modifier: Box::new(modifier),
            element: Box::new(element),
        }
    }

    pub fn spec(kind: SpecKind, element: TypeRef) -> Self {
        TypeRef::Spec {
            kind,
            element: Box::new(element),
        }
    }

    pub fn array(element: TypeRef) -> Self {
        Self::spec(SpecKind::Array, element)
    }

    pub fn pointer(element: TypeRef) -> Self {
        Self::spec(SpecKind::Pointer, element)
    }

    pub fn by_reference(element: TypeRef) -> Self {
        Self::spec(SpecKind::ByReference, element)
    }

    /// Name of the type definition this reference points at, if any.
    ///
    /// Instantiations and modifiers are stripped (`G<int>` resolves to `G`). Generic parameters
    /// and type specs never denote a definition.
    pub fn definition_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            TypeRef::GenericInstance { element, .. } | TypeRef::Modified { element, .. } => {
                element.definition_name()
            }
            TypeRef::GenericParameter(_) | TypeRef::Spec { .. } => None,
        }
    }

    fn is_wrapper(&self) -> bool {
        matches!(
            self,
            TypeRef::GenericInstance { .. } | TypeRef::Modified { .. } | TypeRef::Spec { .. }
        )
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) | TypeRef::GenericParameter(name) => f.write_str(name),
            TypeRef::GenericInstance { element, arguments } => {
                write!(f, "{element}<")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            TypeRef::Modified {
                kind,
                modifier,
                element,
            } => {
                let tag = match kind {
                    ModifierKind::Required => "modreq",
                    ModifierKind::Optional => "modopt",
                };
                write!(f, "{element} {tag}({modifier})")
            }
            TypeRef::Spec { kind, element } => match kind {
                SpecKind::Array => write!(f, "{element}[]"),
                SpecKind::Pointer => write!(f, "{element}*"),
                SpecKind::ByReference => write!(f, "{element}&"),
                SpecKind::Pinned => write!(f, "{element} pinned"),
                SpecKind::Sentinel => write!(f, "{element} sentinel"),
            },
        }
    }
}

/// Structural equality with default options.
pub fn types_match(a: &TypeRef, b: &TypeRef) -> bool {
    types_match_with(a, b, &MatchOptions::default())
}

/// Structural equality of two type references, left-biased on `a`.
///
/// A generic parameter on the left matches anything: parameter positions were already checked by
/// the compiler, only the enclosing instantiation's arguments carry information. Wrappers only
/// ever match a wrapper of the same variant.
pub fn types_match_with(a: &TypeRef, b: &TypeRef, options: &MatchOptions) -> bool {
    match (a, b) {
        (TypeRef::GenericParameter(_), _) => true,
        (
            TypeRef::GenericInstance {
                element: a_element,
                arguments: a_args,
            },
            TypeRef::GenericInstance {
                element: b_element,
                arguments: b_args,
            },
        ) => {
            if !types_match_with(a_element, b_element, options) {
                return false;
            }
            if a_args.len() != b_args.len() {
                return false;
            }
            a_args
                .iter()
                .zip(b_args)
                .all(|(x, y)| types_match_with(x, y, options))
        }
        (
            TypeRef::Modified {
                kind: a_kind,
                modifier: a_modifier,
                element: a_element,
            },
            TypeRef::Modified {
                kind: b_kind,
                modifier: b_modifier,
                element: b_element,
            },
        ) => {
            a_kind == b_kind
                && types_match_with(a_modifier, b_modifier, options)
                && types_match_with(a_element, b_element, options)
        }
        (
            TypeRef::Spec {
                kind: a_kind,
                element: a_element,
            },
            TypeRef::Spec {
                kind: b_kind,
                element: b_element,
            },
        ) => {
            (!options.compare_spec_kinds || a_kind == b_kind)
                && types_match_with(a_element, b_element, options)
        }
        (a, b) if a.is_wrapper() || b.is_wrapper() => false,
        (TypeRef::Named(a_name), TypeRef::Named(b_name) | TypeRef::GenericParameter(b_name)) => {
            a_name == b_name
        }
        _ => false,
    }
}
