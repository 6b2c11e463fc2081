//! Type Graph - frozen, read-only view of every loaded type.
//!
//! Built once through [`TypeGraphBuilder`] and never mutated afterwards, so it can be shared
//! across resolver workers. References that point outside the loaded closure resolve to `None`.

use std::collections::{HashMap, HashSet};

use anyhow::{Result, bail};

use crate::domain::method::{MethodId, MethodSig};
use crate::domain::type_ref::TypeRef;

/// Type identifier (fully qualified name; nested types use `Outer/Inner`)
pub type TypeId = String;

/// A loaded type definition: class, interface or value type alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    pub name: TypeId,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub methods: Vec<MethodSig>,
}

impl TypeNode {
    pub fn new(name: impl Into<TypeId>) -> Self {
        Self {
            name: name.into(),
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn implementing(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_method(mut self, method: MethodSig) -> Self {
        self.methods.push(method);
        self
    }

    pub fn method(&self, token: u32) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.id.token == token)
    }

    pub fn virtual_methods(&self) -> impl Iterator<Item = &MethodSig> {
        self.methods.iter().filter(|m| m.is_virtual)
    }
}

/// One assembly/module worth of types, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingUnit {
    pub name: String,
    pub types: Vec<TypeId>,
}

/// Frozen type graph
#[derive(Debug, Default)]
pub struct TypeGraph {
    types: HashMap<TypeId, TypeNode>,
    units: Vec<LoadingUnit>,
}

impl TypeGraph {
    /// Convenience for a graph made of a single loading unit.
    pub fn single_unit(name: impl Into<String>, types: Vec<TypeNode>) -> Result<Self> {
        let mut builder = TypeGraphBuilder::new();
        builder.add_unit(name, types)?;
        Ok(builder.build())
    }

    /// Get a type definition by name
    pub fn get(&self, type_id: &str) -> Option<&TypeNode> {
        self.types.get(type_id)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    /// Resolve a type reference to its definition, or `None` when it is outside the closure.
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<&TypeNode> {
        type_ref.definition_name().and_then(|name| self.get(name))
    }

    /// Resolve a direct method reference.
    pub fn resolve_method(&self, id: &MethodId) -> Option<&MethodSig> {
        self.get(&id.declaring_type)?.method(id.token)
    }

    /// Resolved base type of `node`, if declared and loaded.
    pub fn base_of(&self, node: &TypeNode) -> Option<&TypeNode> {
        node.base.as_ref().and_then(|base| self.resolve(base))
    }

    pub fn units(&self) -> &[LoadingUnit] {
        &self.units
    }

    pub fn unit(&self, name: &str) -> Option<&LoadingUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Types of a unit in declaration order.
    pub fn types_in<'a>(&'a self, unit: &'a LoadingUnit) -> impl Iterator<Item = &'a TypeNode> {
        unit.types.iter().filter_map(|id| self.types.get(id))
    }

    /// All types, unit by unit, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeNode> {
        self.units.iter().flat_map(|unit| self.types_in(unit))
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &TypeId> {
        self.types.keys()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodSig> {
        self.types().flat_map(|t| t.methods.iter())
    }

    pub fn method_count(&self) -> usize {
        self.types.values().map(|t| t.methods.len()).sum()
    }

    pub fn virtual_method_count(&self) -> usize {
        self.types.values().map(|t| t.virtual_methods().count()).sum()
    }

    /// Get count of loaded types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Accumulates loading units, validating identities, then freezes into a [`TypeGraph`].
#[derive(Debug, Default)]
pub struct TypeGraphBuilder {
    graph: TypeGraph,
}

impl TypeGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loading unit and its types.
    ///
    /// Fails on a type name already defined in any unit, on duplicate method tokens within a type,
    /// and on methods whose id names a different declaring type. The whole unit is validated before
    /// any of it is registered, so a rejected unit leaves the builder unchanged.
    pub fn add_unit(&mut self, name: impl Into<String>, types: Vec<TypeNode>) -> Result<&mut Self> {
        let name = name.into();
        let mut names = HashSet::with_capacity(types.len());
        for node in &types {
            if self.graph.types.contains_key(&node.name) || !names.insert(node.name.as_str()) {
                bail!("Duplicate type definition: {} (unit {})", node.name, name);
            }
            let mut tokens = HashSet::new();
            for method in &node.methods {
                if method.id.declaring_type != node.name {
                    bail!(
                        "Method {} is declared on {} but names {} as its declaring type",
                        method.name,
                        node.name,
                        method.id.declaring_type
                    );
                }
                if !tokens.insert(method.id.token) {
                    bail!("Duplicate method token {} on type {}", method.id.token, node.name);
                }
            }
        }

        let ids = types.iter().map(|node| node.name.clone()).collect();
        for node in types {
            self.graph.types.insert(node.name.clone(), node);
        }
        self.graph.units.push(LoadingUnit { name, types: ids });
        Ok(self)
    }

    pub fn build(self) -> TypeGraph {
        self.graph
    }
}
