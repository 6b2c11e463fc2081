//! Type graph fixtures for integration tests.
#![allow(dead_code)]

use override_map::domain::method::{MethodId, MethodSig};
use override_map::domain::relationship::RelationshipStore;
use override_map::domain::resolver::{Cancellation, ResolveOptions, resolve_all};
use override_map::domain::type_graph::{TypeGraph, TypeNode};
use override_map::domain::type_ref::TypeRef;

pub fn virt(ty: &str, token: u32, name: &str) -> MethodSig {
    MethodSig::new(ty, token, name).with_virtual(true)
}

pub fn id(ty: &str, token: u32) -> MethodId {
    MethodId::new(ty, token)
}

pub fn int32() -> TypeRef {
    TypeRef::named("System.Int32")
}

pub fn string() -> TypeRef {
    TypeRef::named("System.String")
}

pub fn graph(types: Vec<TypeNode>) -> TypeGraph {
    TypeGraph::single_unit("Test", types).expect("valid fixture graph")
}

pub fn resolve(graph: &TypeGraph, options: ResolveOptions) -> RelationshipStore {
    let mut store = RelationshipStore::new();
    resolve_all(graph, &options, &mut store, &Cancellation::new());
    store
}

pub fn resolve_sequential(graph: &TypeGraph) -> RelationshipStore {
    resolve(
        graph,
        ResolveOptions {
            parallel: false,
            ..ResolveOptions::default()
        },
    )
}

/// A -> B -> C class chain, each declaring a virtual `M()` at token 1.
pub fn class_chain() -> TypeGraph {
    graph(vec![
        TypeNode::new("Ns.A").with_method(virt("Ns.A", 1, "M")),
        TypeNode::new("Ns.B")
            .with_base(TypeRef::named("Ns.A"))
            .with_method(virt("Ns.B", 1, "M")),
        TypeNode::new("Ns.C")
            .with_base(TypeRef::named("Ns.B"))
            .with_method(virt("Ns.C", 1, "M")),
    ])
}

/// `G<T>` declaring `Add(T)` and `Fill(List<int>)`; `D : G<int>` declaring `Add(int)` and
/// `Fill(List<string>)`.
pub fn generic_hierarchy() -> TypeGraph {
    let list_of = |arg: TypeRef| TypeRef::instance(TypeRef::named("System.List`1"), vec![arg]);
    graph(vec![
        TypeNode::new("Ns.G`1")
            .with_method(virt("Ns.G`1", 1, "Add").with_param(TypeRef::generic_parameter("T")))
            .with_method(virt("Ns.G`1", 2, "Fill").with_param(list_of(int32()))),
        TypeNode::new("Ns.D")
            .with_base(TypeRef::instance(TypeRef::named("Ns.G`1"), vec![int32()]))
            .with_method(virt("Ns.D", 1, "Add").with_param(int32()))
            .with_method(virt("Ns.D", 2, "Fill").with_param(list_of(string()))),
    ])
}

/// `C : IA, IB` where both interfaces declare `M()`.
pub fn two_interfaces() -> TypeGraph {
    graph(vec![
        TypeNode::new("Ns.IA").with_method(virt("Ns.IA", 1, "M")),
        TypeNode::new("Ns.IB").with_method(virt("Ns.IB", 1, "M")),
        TypeNode::new("Ns.C")
            .implementing(TypeRef::named("Ns.IA"))
            .implementing(TypeRef::named("Ns.IB"))
            .with_method(virt("Ns.C", 1, "M")),
    ])
}

/// A mixed graph exercising all three origins plus an unresolved base.
pub fn mixed() -> TypeGraph {
    graph(vec![
        TypeNode::new("Ns.IDisposable").with_method(virt("Ns.IDisposable", 1, "Dispose")),
        TypeNode::new("Ns.Stream")
            .with_base(TypeRef::named("System.Object"))
            .implementing(TypeRef::named("Ns.IDisposable"))
            .with_method(virt("Ns.Stream", 1, "Dispose"))
            .with_method(virt("Ns.Stream", 2, "Read").with_param(int32()).returning(int32())),
        TypeNode::new("Ns.FileStream")
            .with_base(TypeRef::named("Ns.Stream"))
            .with_method(virt("Ns.FileStream", 1, "Read").with_param(int32()).returning(int32()))
            .with_method(
                virt("Ns.FileStream", 2, "Ns.IDisposable.Dispose")
                    .overriding(id("Ns.IDisposable", 1)),
            ),
    ])
}
