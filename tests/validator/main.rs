use std::collections::BTreeMap;

use serde_json::json;

use ontotax::{
    ontology::MetaProperties,
    taxonomy::{GoldFile, TaxonomyGraph, TaxonomyRun},
    validator::{IntegrityNote, WarningKind, find_cycles, validate_domain, validate_run},
};

fn graph(value: serde_json::Value) -> TaxonomyGraph {
    serde_json::from_value(value).expect("taxonomy fixture parses")
}

fn properties(value: serde_json::Value) -> BTreeMap<String, MetaProperties> {
    serde_json::from_value(value).expect("properties fixture parses")
}

#[test]
fn given_three_node_cycle_when_validated_then_exactly_one_cycle_with_all_nodes_is_reported() {
    let taxonomy = graph(json!({"A": ["B"], "B": ["C"], "C": ["A"]}));
    let props = properties(json!({
        "A": {"R": "+R"}, "B": {"R": "+R"}, "C": {"R": "+R"}
    }));

    let report = validate_domain("loop", &props, &taxonomy);

    assert_eq!(report.cycles.len(), 1);
    let cycle = &report.cycles[0];
    assert_eq!(cycle.first(), cycle.last());
    for node in ["A", "B", "C"] {
        assert!(cycle.iter().any(|n| n == node), "{node} missing from {cycle:?}");
    }
    assert_eq!(report.critical_count(), 1);
}

#[test]
fn given_acyclic_graphs_when_searched_then_no_cycle_is_found() {
    let fixtures = [
        json!({"Bird": [], "Sparrow": ["Bird"], "Wing": []}),
        json!({
            "Mother": ["Female", "Parent"], "Female": ["Person"], "Parent": ["Person"], "Person": []
        }),
        json!({"Leaf": ["Mid"], "Mid": ["Top"]}),
    ];
    for fixture in fixtures {
        assert!(find_cycles(&graph(fixture.clone())).is_empty(), "{fixture}");
    }
}

#[test]
fn given_bird_sparrow_wing_scenario_when_validated_then_report_is_clean() {
    let taxonomy = graph(json!({"Bird": [], "Sparrow": ["Bird"], "Wing": []}));
    let props = properties(json!({
        "Bird": {"R": "+R", "I": "+I", "U": "+U", "D": "-D"},
        "Sparrow": {"R": "+R", "I": "+I", "U": "+U", "D": "-D"},
        "Wing": {"R": "-R", "I": "+I", "U": "+U", "D": "+D"}
    }));

    let report = validate_domain("animals", &props, &taxonomy);

    assert!(report.violations.is_empty());
    assert!(report.cycles.is_empty());
    assert!(report.integrity.is_empty());
    assert_eq!(report.links_count, 1);
}

#[test]
fn given_anti_rigid_student_under_rigid_person_when_validated_then_edge_is_valid() {
    let props = properties(json!({"Person": {"R": "+R"}, "Student": {"R": "~R"}}));

    let valid = validate_domain(
        "people",
        &props,
        &graph(json!({"Person": [], "Student": ["Person"]})),
    );
    assert_eq!(valid.violations.len(), 0);

    let reversed = validate_domain(
        "people",
        &props,
        &graph(json!({"Person": ["Student"], "Student": []})),
    );
    assert_eq!(reversed.violations.len(), 1);
    assert_eq!(reversed.violations[0].child, "Person");
    assert_eq!(reversed.violations[0].parent, "Student");
}

#[test]
fn given_many_rigid_under_anti_rigid_edges_when_validated_then_one_violation_per_edge() {
    let taxonomy = graph(json!({
        "Alice": ["Student"], "Bob": ["Student"], "Carol": ["Employee"], "Student": [], "Employee": []
    }));
    let props = properties(json!({
        "Alice": {"R": "+R"}, "Bob": {"R": "+R"}, "Carol": {"R": "+R"},
        "Student": {"R": "~R"}, "Employee": {"R": "~R"}
    }));

    let report = validate_domain("people", &props, &taxonomy);

    assert_eq!(report.violations.len(), 3);
}

#[test]
fn given_vase_under_clay_when_validated_then_constitution_trap_is_only_a_warning() {
    let taxonomy = graph(json!({"Vase": ["Clay"], "Clay": []}));
    let props = properties(json!({
        "Vase": {"R": "+R", "I": "+I", "U": "+U"},
        "Clay": {"R": "+R", "I": "-I", "U": "-U"}
    }));

    let report = validate_domain("pottery", &props, &taxonomy);

    assert!(report.violations.is_empty());
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.kind == WarningKind::ConstitutionTrap)
    );
    assert_eq!(report.critical_count(), 0);
}

#[test]
fn given_terms_without_metadata_when_validated_then_integrity_notes_are_reported() {
    let taxonomy = graph(json!({
        "Sparrow": ["Bird"], "Robin": ["Bird"], "Bird": [], "Ghost": ["Bird"]
    }));
    let props = properties(json!({
        "Sparrow": {"R": "+R"}, "Robin": {"R": "+R"}
    }));

    let report = validate_domain("animals", &props, &taxonomy);

    assert!(report.integrity.contains(&IntegrityNote::MissingChild {
        term: "Ghost".to_string()
    }));
    assert!(report.integrity.contains(&IntegrityNote::MissingParent {
        child: "Robin".to_string(),
        parent: "Bird".to_string()
    }));
    assert_eq!(report.links_count, 3);
    assert_eq!(report.critical_count(), 0);
}

#[test]
fn given_gold_and_run_files_when_validated_then_domains_are_matched_by_name() {
    let gold: GoldFile = serde_json::from_value(json!({
        "datasets": [
            {"domain": "people", "dataset": [
                {"term": "Person", "properties": {"R": "+R"}},
                {"term": "Student", "properties": {"R": "~R"}}
            ]},
            {"domain": "tools", "dataset": [{"term": "Hammer", "properties": {"R": "+R"}}]}
        ]
    }))
    .expect("gold parses");
    let run: TaxonomyRun = serde_json::from_value(json!({
        "model": "google/gemini-2.5-flash-agentic",
        "datasets": [{"domain": "people", "taxonomy": {"Person": ["Student"], "Student": []}}]
    }))
    .expect("run parses");

    let report = validate_run(&gold, &run);

    assert_eq!(report.model, "google/gemini-2.5-flash-agentic");
    assert_eq!(report.domains.len(), 1);
    assert_eq!(report.skipped, vec!["tools"]);
    assert!(report.is_failure());
    assert_eq!(report.critical_count(), 1);
}
