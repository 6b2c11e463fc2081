//! Override resolution behavior over small hand-built hierarchies.

mod common;

use common::fixtures::*;
use override_map::domain::method::MethodSig;
use override_map::domain::relationship::{EdgeOrigin, RelationshipStore};
use override_map::domain::resolver::{
    Cancellation, OverrideResolver, ResolveOptions, resolve_all, resolve_overrides_for_assembly,
};
use override_map::domain::type_graph::{TypeGraph, TypeGraphBuilder, TypeNode};
use override_map::domain::type_ref::{MatchOptions, ModifierKind, TypeRef};

#[test]
fn unrelated_methods_produce_no_edges() {
    let g = graph(vec![
        TypeNode::new("Ns.A").with_method(virt("Ns.A", 1, "M")),
        TypeNode::new("Ns.B")
            .with_base(TypeRef::named("Ns.A"))
            .with_method(virt("Ns.B", 1, "N"))
            .with_method(virt("Ns.B", 2, "M").with_param(int32())),
    ]);
    let store = resolve_sequential(&g);
    assert!(store.is_empty());
}

#[test]
fn direct_override_records_one_class_edge() {
    let g = graph(vec![
        TypeNode::new("Ns.A").with_method(virt("Ns.A", 1, "M")),
        TypeNode::new("Ns.B")
            .with_base(TypeRef::named("Ns.A"))
            .with_method(virt("Ns.B", 1, "M")),
    ]);
    let store = resolve_sequential(&g);
    assert_eq!(store.len(), 1);
    assert!(store.contains(&id("Ns.A", 1), &id("Ns.B", 1)));
    assert_eq!(
        store.origin_of(&id("Ns.A", 1), &id("Ns.B", 1)),
        Some(EdgeOrigin::ClassHierarchy)
    );
}

#[test]
fn nearest_ancestor_wins() {
    let store = resolve_sequential(&class_chain());
    let c_bases: Vec<_> = store.bases_of(&id("Ns.C", 1)).iter().cloned().collect();
    assert_eq!(c_bases, vec![id("Ns.B", 1)]);
    assert!(!store.contains(&id("Ns.A", 1), &id("Ns.C", 1)));
    assert_eq!(store.overrides_of(&id("Ns.A", 1)).len(), 1);
}

#[test]
fn generic_parameters_match_positionally() {
    let store = resolve_sequential(&generic_hierarchy());
    assert!(store.contains(&id("Ns.G`1", 1), &id("Ns.D", 1)));
    // List<int> vs List<string>
    assert!(store.bases_of(&id("Ns.D", 2)).is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn first_declared_interface_wins() {
    let store = resolve_sequential(&two_interfaces());
    let bases: Vec<_> = store.bases_of(&id("Ns.C", 1)).iter().cloned().collect();
    assert_eq!(bases, vec![id("Ns.IA", 1)]);
    assert_eq!(
        store.origin_of(&id("Ns.IA", 1), &id("Ns.C", 1)),
        Some(EdgeOrigin::Interface)
    );
}

#[test]
fn inherited_interfaces_are_walked_depth_first() {
    // C : IOuter, IOther where IOuter : IInner and only IInner and IOther declare M.
    let g = graph(vec![
        TypeNode::new("Ns.IInner").with_method(virt("Ns.IInner", 1, "M")),
        TypeNode::new("Ns.IOuter").implementing(TypeRef::named("Ns.IInner")),
        TypeNode::new("Ns.IOther").with_method(virt("Ns.IOther", 1, "M")),
        TypeNode::new("Ns.C")
            .implementing(TypeRef::named("Ns.IOuter"))
            .implementing(TypeRef::named("Ns.IOther"))
            .with_method(virt("Ns.C", 1, "M")),
    ]);
    let store = resolve_sequential(&g);
    let bases: Vec<_> = store.bases_of(&id("Ns.C", 1)).iter().cloned().collect();
    assert_eq!(bases, vec![id("Ns.IInner", 1)]);
}

#[test]
fn explicit_override_binds_differently_named_method() {
    let store = resolve_sequential(&mixed());
    assert_eq!(
        store.origin_of(&id("Ns.IDisposable", 1), &id("Ns.FileStream", 2)),
        Some(EdgeOrigin::Explicit)
    );
    assert!(store.contains(&id("Ns.Stream", 2), &id("Ns.FileStream", 1)));
    assert!(store.contains(&id("Ns.IDisposable", 1), &id("Ns.Stream", 1)));
    assert_eq!(store.len(), 3);
}

#[test]
fn explicit_override_of_non_virtual_target_is_skipped() {
    let g = graph(vec![
        TypeNode::new("Ns.A").with_method(MethodSig::new("Ns.A", 1, "Helper")),
        TypeNode::new("Ns.B").with_method(virt("Ns.B", 1, "Other").overriding(id("Ns.A", 1))),
    ]);
    assert!(resolve_sequential(&g).is_empty());
}

#[test]
fn unresolved_references_end_the_search() {
    let g = graph(vec![
        TypeNode::new("Ns.B")
            .with_base(TypeRef::named("External.Base"))
            .implementing(TypeRef::named("External.IFoo"))
            .with_method(virt("Ns.B", 1, "M").overriding(id("External.IFoo", 7))),
    ]);
    assert!(resolve_sequential(&g).is_empty());
}

#[test]
fn resolving_twice_is_idempotent() {
    let g = mixed();
    let mut store = RelationshipStore::new();
    let unit = &g.units()[0];
    let first = resolve_overrides_for_assembly(&g, unit, &mut store);
    let len = store.len();
    let second = resolve_overrides_for_assembly(&g, unit, &mut store);

    assert_eq!(store.len(), len);
    assert_eq!(first.edges_added, len);
    assert_eq!(second.edges_found, len);
    assert_eq!(second.edges_added, 0);
    assert_eq!(store.bases_of(&id("Ns.FileStream", 1)).len(), 1);
}

#[test]
fn self_listing_interfaces_terminate() {
    let g = graph(vec![
        TypeNode::new("Ns.ILoop")
            .implementing(TypeRef::named("Ns.ILoop"))
            .implementing(TypeRef::named("Ns.IPeer")),
        TypeNode::new("Ns.IPeer").implementing(TypeRef::named("Ns.ILoop")),
        TypeNode::new("Ns.C")
            .implementing(TypeRef::named("Ns.ILoop"))
            .with_method(virt("Ns.C", 1, "M")),
    ]);
    let store = resolve_sequential(&g);
    assert!(store.is_empty());
}

#[test]
fn diamond_interfaces_yield_one_edge_to_the_shared_root() {
    let g = graph(vec![
        TypeNode::new("Ns.IRoot").with_method(virt("Ns.IRoot", 1, "M")),
        TypeNode::new("Ns.IL").implementing(TypeRef::named("Ns.IRoot")),
        TypeNode::new("Ns.IR").implementing(TypeRef::named("Ns.IRoot")),
        TypeNode::new("Ns.C")
            .implementing(TypeRef::named("Ns.IL"))
            .implementing(TypeRef::named("Ns.IR"))
            .with_method(virt("Ns.C", 1, "M")),
    ]);
    let store = resolve_sequential(&g);
    assert_eq!(store.len(), 1);
    let bases: Vec<_> = store.bases_of(&id("Ns.C", 1)).iter().cloned().collect();
    assert_eq!(bases, vec![id("Ns.IRoot", 1)]);
    assert_eq!(
        store.origin_of(&id("Ns.IRoot", 1), &id("Ns.C", 1)),
        Some(EdgeOrigin::Interface)
    );
}

#[test]
fn interface_cycle_does_not_hide_a_later_match() {
    let g = graph(vec![
        TypeNode::new("Ns.ILoop").implementing(TypeRef::named("Ns.ILoop")),
        TypeNode::new("Ns.IHit").with_method(virt("Ns.IHit", 1, "M")),
        TypeNode::new("Ns.C")
            .implementing(TypeRef::named("Ns.ILoop"))
            .implementing(TypeRef::named("Ns.IHit"))
            .with_method(virt("Ns.C", 1, "M")),
    ]);
    let store = resolve_sequential(&g);
    assert_eq!(store.len(), 1);
    assert!(store.contains(&id("Ns.IHit", 1), &id("Ns.C", 1)));
}

#[test]
fn modreq_on_a_parameter_decides_the_match() {
    let volatile_int = || {
        TypeRef::modified(
            ModifierKind::Required,
            TypeRef::named("System.Runtime.CompilerServices.IsVolatile"),
            int32(),
        )
    };
    let g = graph(vec![
        TypeNode::new("Ns.A")
            .with_method(virt("Ns.A", 1, "Set").with_param(volatile_int()))
            .with_method(virt("Ns.A", 2, "Get").with_param(volatile_int())),
        TypeNode::new("Ns.B")
            .with_base(TypeRef::named("Ns.A"))
            .with_method(virt("Ns.B", 1, "Set").with_param(volatile_int()))
            .with_method(virt("Ns.B", 2, "Get").with_param(int32())),
    ]);
    let store = resolve_sequential(&g);
    assert!(store.contains(&id("Ns.A", 1), &id("Ns.B", 1)));
    assert!(store.bases_of(&id("Ns.B", 2)).is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn chain_ending_at_an_unloaded_grandparent_finds_the_loaded_ancestor() {
    let g = graph(vec![
        TypeNode::new("Ns.A")
            .with_base(TypeRef::named("External.Root"))
            .with_method(virt("Ns.A", 1, "M")),
        TypeNode::new("Ns.B")
            .with_base(TypeRef::named("Ns.A"))
            .with_method(virt("Ns.B", 1, "N")),
        TypeNode::new("Ns.C")
            .with_base(TypeRef::named("Ns.B"))
            .with_method(virt("Ns.C", 1, "M"))
            .with_method(virt("Ns.C", 2, "Other")),
    ]);
    let store = resolve_sequential(&g);
    assert!(store.contains(&id("Ns.A", 1), &id("Ns.C", 1)));
    assert!(store.bases_of(&id("Ns.C", 2)).is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn cyclic_base_chain_terminates() {
    let g = graph(vec![
        TypeNode::new("Ns.A")
            .with_base(TypeRef::named("Ns.B"))
            .with_method(virt("Ns.A", 1, "M")),
        TypeNode::new("Ns.B")
            .with_base(TypeRef::named("Ns.A"))
            .with_method(virt("Ns.B", 1, "N")),
    ]);
    assert!(resolve_sequential(&g).is_empty());
}

#[test]
fn parallel_and_sequential_stores_are_identical() {
    for g in [class_chain(), generic_hierarchy(), two_interfaces(), mixed()] {
        let sequential = resolve_sequential(&g);
        let parallel = resolve(&g, ResolveOptions::default());
        assert_eq!(sequential.edges(), parallel.edges());
        assert_eq!(sequential.len(), parallel.len());
    }
}

#[test]
fn cancelled_run_records_nothing() {
    let g = mixed();
    let cancel = Cancellation::new();
    cancel.cancel();

    for parallel in [false, true] {
        let mut store = RelationshipStore::new();
        let options = ResolveOptions {
            parallel,
            ..ResolveOptions::default()
        };
        let summaries = resolve_all(&g, &options, &mut store, &cancel);
        assert!(store.is_empty());
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].cancelled);
        assert_eq!(summaries[0].types_visited, 0);
    }
}

#[test]
fn spec_kinds_are_compared_unless_disabled() {
    let g = graph(vec![
        TypeNode::new("Ns.A")
            .with_method(virt("Ns.A", 1, "M").with_param(TypeRef::array(int32()))),
        TypeNode::new("Ns.B")
            .with_base(TypeRef::named("Ns.A"))
            .with_method(virt("Ns.B", 1, "M").with_param(TypeRef::pointer(int32()))),
    ]);
    assert!(resolve_sequential(&g).is_empty());

    let loose = resolve(
        &g,
        ResolveOptions {
            match_options: MatchOptions::element_only_specs(),
            parallel: false,
        },
    );
    assert!(loose.contains(&id("Ns.A", 1), &id("Ns.B", 1)));
}

#[test]
fn units_resolve_in_load_order_across_unit_boundaries() {
    let mut builder = TypeGraphBuilder::new();
    builder
        .add_unit("Lib", vec![TypeNode::new("Lib.A").with_method(virt("Lib.A", 1, "M"))])
        .unwrap();
    builder
        .add_unit(
            "App",
            vec![
                TypeNode::new("App.B")
                    .with_base(TypeRef::named("Lib.A"))
                    .with_method(virt("App.B", 1, "M")),
            ],
        )
        .unwrap();
    let g: TypeGraph = builder.build();

    let mut store = RelationshipStore::new();
    let summaries = resolve_all(&g, &ResolveOptions::default(), &mut store, &Cancellation::new());
    let names: Vec<_> = summaries.iter().map(|s| s.unit.as_str()).collect();
    assert_eq!(names, vec!["Lib", "App"]);
    assert_eq!(summaries[0].edges_added, 0);
    assert_eq!(summaries[1].edges_added, 1);
    assert!(store.contains(&id("Lib.A", 1), &id("App.B", 1)));
}

#[test]
fn resolver_lookups_are_usable_directly() {
    let g = class_chain();
    let resolver = OverrideResolver::new(&g, MatchOptions::default());
    let c = g.get("Ns.C").unwrap();
    let found = resolver
        .base_method_in_type_hierarchy(c, &c.methods[0])
        .unwrap();
    assert_eq!(found.id, id("Ns.B", 1));
    assert!(resolver
        .base_method_in_interface_hierarchy(c, &c.methods[0])
        .is_none());
}

#[test]
fn dispatch_group_spans_the_whole_slot() {
    let store = resolve_sequential(&class_chain());
    let group = store.to_graph().dispatch_group(&id("Ns.C", 1));
    assert_eq!(group.len(), 3);
    assert!(group.contains(&id("Ns.A", 1)));
}
