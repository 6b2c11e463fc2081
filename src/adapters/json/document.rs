//! On-disk type-graph document: the JSON shape a metadata dumper writes for the tool.
//!
//! ```json
//! { "units": [ { "name": "Core", "types": [
//!     { "name": "Ns.Derived", "base": {"named": "Ns.Base"},
//!       "interfaces": [{"named": "Ns.IFoo"}],
//!       "methods": [ { "token": 1, "name": "M", "virtual": true,
//!                      "parameters": [{"named": "System.Int32"}],
//!                      "overrides": ["Ns.IFoo#1"] } ],
//!       "nested_types": [ { "name": "Inner" } ] } ] } ] }
//! ```
//!
//! Nested types are flattened into their unit under `Outer/Inner`, right after their outer type.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::method::{MethodId, MethodSig};
use crate::domain::type_graph::{TypeGraph, TypeGraphBuilder, TypeNode};
use crate::domain::type_ref::TypeRef;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeGraphDocument {
    #[serde(default)]
    pub units: Vec<UnitDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDocument {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDocument {
    /// Full name for top-level types, simple name for nested ones.
    pub name: String,
    #[serde(default)]
    pub base: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub methods: Vec<MethodDocument>,
    #[serde(default)]
    pub nested_types: Vec<TypeDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDocument {
    pub token: u32,
    pub name: String,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default = "void_type")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
    #[serde(default)]
    pub overrides: Vec<MethodId>,
}

fn void_type() -> TypeRef {
    TypeRef::named("System.Void")
}

impl TypeGraphDocument {
    /// Parse a document from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Failed to parse type graph JSON")
    }

    /// Validate and freeze into a [`TypeGraph`].
    pub fn into_graph(self) -> Result<TypeGraph> {
        let mut builder = TypeGraphBuilder::new();
        for unit in self.units {
            let mut types = Vec::new();
            for ty in unit.types {
                flatten_type(ty, None, &mut types);
            }
            builder
                .add_unit(unit.name.clone(), types)
                .with_context(|| format!("Invalid loading unit: {}", unit.name))?;
        }
        Ok(builder.build())
    }
}

fn flatten_type(doc: TypeDocument, outer: Option<&str>, out: &mut Vec<TypeNode>) {
    let name = match outer {
        Some(outer) => format!("{}/{}", outer, doc.name),
        None => doc.name,
    };

    let methods = doc
        .methods
        .into_iter()
        .map(|m| MethodSig {
            id: MethodId::new(name.clone(), m.token),
            name: m.name,
            is_virtual: m.is_virtual,
            return_type: m.return_type,
            parameters: m.parameters,
            explicit_overrides: m.overrides,
        })
        .collect();

    out.push(TypeNode {
        name: name.clone(),
        base: doc.base,
        interfaces: doc.interfaces,
        methods,
    });

    for nested in doc.nested_types {
        flatten_type(nested, Some(&name), out);
    }
}
