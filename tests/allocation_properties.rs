//! Property tests for the allocation engine and the analyzer.

use proptest::prelude::*;
use topo_ids::{
    allocate, analyze, AllocationCandidate, ComponentDefinition, ComponentRegistry, Id, Instance,
    ModelContext, ModelError, Topology,
};

fn candidate(name: String, base_id: Option<Id>, window: Id) -> AllocationCandidate {
    AllocationCandidate {
        name,
        base_id,
        window,
        instance_index: 0,
        type_name: "T".into(),
        required_range: None,
        required_amount: None,
    }
}

/// Non-overlapping fixed candidates built from (gap, window) pairs.
fn fixed_layout(start: Id, spans: &[(Id, Id)]) -> Vec<AllocationCandidate> {
    let mut next = start;
    spans
        .iter()
        .enumerate()
        .map(|(i, &(gap, window))| {
            let base = next + gap;
            next = base + window;
            candidate(format!("fixed{i}"), Some(base), window)
        })
        .collect()
}

fn floating_set(windows: &[Id]) -> Vec<AllocationCandidate> {
    windows
        .iter()
        .enumerate()
        .map(|(i, &w)| candidate(format!("float{i}"), None, w))
        .collect()
}

proptest! {
    #[test]
    fn fixed_only_layouts_are_left_alone(
        base in 0u64..500,
        spans in prop::collection::vec((0u64..50, 1u64..40), 0..20),
    ) {
        let input = fixed_layout(base.max(1), &spans);
        let expected: Vec<(String, Id, Id)> = input
            .iter()
            .map(|c| (c.name.clone(), c.base_id.unwrap(), c.window))
            .collect();

        // Feed them reversed; the output is sorted back by base id.
        let result = allocate(base, input.into_iter().rev()).unwrap();
        let actual: Vec<(String, Id, Id)> = result
            .iter()
            .map(|a| (a.name.clone(), a.base_id, a.window))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn floating_only_layouts_are_back_to_back(
        base in 0u64..500,
        windows in prop::collection::vec(0u64..40, 0..20),
    ) {
        let result = allocate(base, floating_set(&windows)).unwrap();

        let mut sorted = windows.clone();
        sorted.sort();
        let placed: Vec<Id> = result.iter().map(|a| a.window).collect();
        prop_assert_eq!(placed, sorted);

        let mut expected_base = base.max(1);
        for a in &result {
            prop_assert_eq!(a.base_id, expected_base);
            expected_base += a.window;
        }
    }

    #[test]
    fn mixed_layouts_never_overlap_and_never_move_fixed(
        base in 0u64..200,
        spans in prop::collection::vec((0u64..60, 1u64..40), 0..12),
        windows in prop::collection::vec(0u64..40, 0..12),
    ) {
        let fixed = fixed_layout(base.max(1), &spans);
        let fixed_bases: Vec<(String, Id)> = fixed
            .iter()
            .map(|c| (c.name.clone(), c.base_id.unwrap()))
            .collect();

        let mut input = floating_set(&windows);
        input.extend(fixed);
        let result = allocate(base, input).unwrap();

        prop_assert_eq!(result.len(), spans.len() + windows.len());
        prop_assert!(result.is_disjoint());
        for pair in result.assignments().windows(2) {
            prop_assert!(pair[1].base_id >= pair[0].base_id + pair[0].window);
        }
        for (name, base_id) in fixed_bases {
            prop_assert_eq!(result.get(&name).unwrap().base_id, base_id);
        }
        for a in result.iter().filter(|a| !a.fixed) {
            prop_assert!(a.base_id >= base.max(1));
        }
    }

    #[test]
    fn analysis_is_a_pure_function(
        events in prop::collection::btree_set(0u64..100, 0..10),
        commands in prop::collection::btree_set(0u64..100, 0..10),
    ) {
        let mut def = ComponentDefinition::new("P");
        for id in &events {
            def = def.with_event(format!("E{id}"), id.to_string());
        }
        for id in &commands {
            def = def.with_command(format!("C{id}"), format!("{id:#x}"));
        }
        let first = analyze(&def).unwrap();
        let second = analyze(&def).unwrap();
        prop_assert_eq!(first, second);

        let highest = events.iter().chain(commands.iter()).max().copied();
        prop_assert_eq!(first.required_range, highest.map(|h| h + 1));
    }
}

fn registry() -> ComponentRegistry {
    ComponentRegistry::build([
        ComponentDefinition::new("Twenty").with_event("LAST", "19"),
        ComponentDefinition::new("Ten").with_channel("LAST", "9"),
    ])
    .unwrap()
}

#[test]
fn floating_instance_packs_before_fixed_instance() {
    let topology = Topology::new("Scenario")
        .with_base_id(0)
        .with_window(10)
        .with_instance(Instance::new("A", "Twenty"))
        .with_instance(Instance::new("B", "Ten").with_base_id("50").with_window("10"));

    let model = ModelContext::new(registry()).build(topology).unwrap();
    let layout: Vec<(&str, Id, Id)> = model
        .allocation
        .iter()
        .map(|a| (a.name.as_str(), a.base_id, a.window))
        .collect();
    assert_eq!(layout, vec![("A", 1, 20), ("B", 50, 10)]);
}

#[test]
fn overlapping_explicit_instances_are_rejected() {
    let topology = Topology::new("Scenario")
        .with_base_id(1)
        .with_window(5)
        .with_instance(Instance::new("C", "Ten").with_base_id("10").with_window("20"))
        .with_instance(Instance::new("D", "Ten").with_base_id("15").with_window("5"));

    let err = ModelContext::new(registry()).build(topology).unwrap_err();
    assert_eq!(
        err,
        ModelError::BaseIdCollision {
            instance: "D".into(),
            base_id: 15,
            window: 5,
            previous: "C".into(),
            previous_base_id: 10,
            previous_window: 20,
        }
    );
    assert!(err.to_string().contains("collides with the allocated IDs for component C"));
}

#[test]
fn duplicate_event_ids_fail_before_allocation() {
    let mut reg = registry();
    reg.register(
        ComponentDefinition::new("Twice")
            .with_event("A", "5")
            .with_event("B", "5"),
    )
    .unwrap();
    let topology = Topology::new("Scenario")
        .with_base_id(1)
        .with_window(5)
        .with_instance(Instance::new("t", "Twice"));

    let err = ModelContext::new(reg).build(topology).unwrap_err();
    assert!(matches!(err, ModelError::IntraComponentIdCollision { id: 5, .. }));
}

#[test]
fn literals_parse_as_documented() {
    assert_eq!(topo_ids::parse_int("0x1A"), Some(26));
    assert_eq!(topo_ids::parse_int("26"), Some(26));
    assert_eq!(topo_ids::parse_int("10.0"), Some(10));
    assert_eq!(topo_ids::parse_int(""), None);
    assert_eq!(topo_ids::parse_int("not a number"), None);
}
