#[path = "../support/mod.rs"]
mod support;

use std::collections::{BTreeMap, BTreeSet};

use ontotax::{
    hierarchy::{HierarchicalClassifier, HierarchyError, OneShotClassifier, StepOutcome},
    ontology::{OntologyError, OntologyTree, Term, load_catalogue, tree::OntologyDefinition},
};

use support::{FnOracle, ScriptedOracle, TempDir, transport_failure};

fn dolce() -> OntologyTree {
    let classes = [
        (
            "Particular",
            vec!["Endurant", "Perdurant", "Quality", "Abstract"],
        ),
        ("Endurant", vec!["PhysicalEndurant", "NonPhysicalEndurant"]),
        ("PhysicalEndurant", vec!["PhysicalObject", "AmountOfMatter"]),
        ("Perdurant", vec!["Event", "Stative"]),
    ]
    .into_iter()
    .map(|(parent, children)| {
        (
            parent.to_string(),
            children.into_iter().map(String::from).collect::<Vec<_>>(),
        )
    })
    .collect::<BTreeMap<_, _>>();

    let definition = OntologyDefinition {
        root: "Particular".to_string(),
        classes,
        descriptions: BTreeMap::from([(
            "Quality".to_string(),
            "An individual aspect inhering in an entity.".to_string(),
        )]),
        examples: BTreeMap::from([(
            "Quality".to_string(),
            vec!["the color of a rose".to_string(), "a weight".to_string()],
        )]),
    };
    OntologyTree::from_definition("DOLCE", definition).expect("fixture tree is valid")
}

fn sparrow() -> Term {
    Term::new("Sparrow").with_description("A small passerine bird.")
}

/// First candidate listed in a descent prompt.
fn first_candidate(system_prompt: &str) -> Option<String> {
    let start = system_prompt.find("- **")? + 4;
    let end = system_prompt[start..].find("**")? + start;
    Some(system_prompt[start..end].to_string())
}

#[tokio::test]
async fn given_oracle_always_descending_when_classified_then_steps_are_bounded_by_depth() {
    let oracle = FnOracle::new(|request| {
        let class = first_candidate(&request.system_prompt).unwrap_or_default();
        Ok(format!(r#"{{"selected_class": "{class}", "reasoning": "first fits"}}"#))
    });
    let tree = dolce();
    let classifier = HierarchicalClassifier::new(oracle.clone());

    let result = classifier.classify(&tree, &sparrow()).await;

    assert_eq!(result.final_class, "PhysicalObject");
    assert_eq!(
        result.path,
        vec![
            "Particular",
            "Endurant",
            "PhysicalEndurant",
            "PhysicalObject"
        ]
    );
    assert!(result.trace.len() <= tree.depth());
    assert_eq!(oracle.calls(), tree.depth());
    let unique = result.path.iter().collect::<BTreeSet<_>>();
    assert_eq!(unique.len(), result.path.len(), "path revisits a node");
    assert!(
        result
            .trace
            .iter()
            .all(|step| step.outcome == StepOutcome::Descended)
    );
}

#[tokio::test]
async fn given_oracle_choosing_current_class_when_classified_then_descent_stops_there() {
    let oracle = ScriptedOracle::replying(&[
        r#"{"selected_class": "Endurant", "reasoning": "it persists"}"#,
        "```json\n{\"selected_class\": \"Endurant\", \"reasoning\": \"too generic to go further\",}\n```",
    ]);
    let classifier = HierarchicalClassifier::new(oracle.clone());

    let result = classifier.classify(&dolce(), &sparrow()).await;

    assert_eq!(result.final_class, "Endurant");
    assert_eq!(result.path, vec!["Particular", "Endurant"]);
    assert_eq!(result.trace.len(), 2);
    assert_eq!(result.trace[1].outcome, StepOutcome::Stayed);
    assert_eq!(
        result.trace[1].reasoning.as_deref(),
        Some("too generic to go further")
    );
    assert_eq!(oracle.calls(), 2);
}

#[tokio::test]
async fn given_class_outside_candidates_when_classified_then_descent_halts_with_violation() {
    let oracle = ScriptedOracle::replying(&[r#"{"selected_class": "Dragon"}"#]);
    let classifier = HierarchicalClassifier::new(oracle);

    let result = classifier.classify(&dolce(), &sparrow()).await;

    assert_eq!(result.final_class, "Particular");
    assert_eq!(result.path, vec!["Particular"]);
    assert_eq!(result.trace.len(), 1);
    assert_eq!(result.trace[0].outcome, StepOutcome::ClosedWorldViolation);
    assert_eq!(result.trace[0].selected.as_deref(), Some("Dragon"));
}

#[tokio::test]
async fn given_failure_mid_descent_when_classified_then_last_good_class_is_kept() {
    let oracle = ScriptedOracle::new([
        Ok(r#"{"selected_class": "Perdurant"}"#.to_string()),
        Err(transport_failure()),
    ]);
    let classifier = HierarchicalClassifier::new(oracle);

    let result = classifier.classify(&dolce(), &Term::new("Migration")).await;

    assert_eq!(result.final_class, "Perdurant");
    assert!(matches!(
        &result.trace[1].outcome,
        StepOutcome::Failed { error } if error.contains("connection reset")
    ));
}

#[tokio::test]
async fn given_unparseable_reply_when_classified_then_failure_is_recorded_not_raised() {
    let oracle = ScriptedOracle::replying(&["I think it is an Endurant."]);
    let classifier = HierarchicalClassifier::new(oracle);

    let result = classifier.classify(&dolce(), &sparrow()).await;

    assert_eq!(result.final_class, "Particular");
    assert!(matches!(result.trace[0].outcome, StepOutcome::Failed { .. }));
}

#[tokio::test]
async fn given_descent_prompt_when_built_then_candidates_carry_definitions_and_examples() {
    let oracle = ScriptedOracle::replying(&[r#"{"selected_class": "Particular"}"#]);
    let classifier = HierarchicalClassifier::new(oracle.clone());

    classifier.classify(&dolce(), &sparrow()).await;

    let prompt = &oracle.requests()[0].system_prompt;
    assert!(prompt.contains(
        "- **Quality**: An individual aspect inhering in an entity. (e.g. the color of a rose, a weight)"
    ));
    assert!(prompt.contains("- **Abstract**: No definition provided."));
    assert!(oracle.requests()[0].user_prompt.contains("A small passerine bird."));
}

#[tokio::test]
async fn given_one_shot_reply_when_classified_then_closed_world_is_checked() {
    let tree = dolce();

    let inside = OneShotClassifier::new(ScriptedOracle::replying(&[
        r#"{"classification": "PhysicalObject", "confidence": "High", "reasoning": "a bird is an object"}"#,
    ]))
    .classify(&tree, &sparrow())
    .await
    .expect("one-shot succeeds");
    assert_eq!(inside.classification, "PhysicalObject");
    assert_eq!(inside.confidence.as_deref(), Some("High"));
    assert!(!inside.closed_world_violation);

    let outside = OneShotClassifier::new(ScriptedOracle::replying(&[
        r#"{"classification": "Animal", "confidence": "Low"}"#,
    ]))
    .classify(&tree, &sparrow())
    .await
    .expect("out-of-list answers are flagged, not errors");
    assert!(outside.closed_world_violation);

    let missing = OneShotClassifier::new(ScriptedOracle::replying(&[r#"{"confidence": "Low"}"#]))
        .classify(&tree, &sparrow())
        .await;
    assert!(matches!(
        missing,
        Err(HierarchyError::MissingField("classification"))
    ));
}

#[test]
fn given_catalogue_with_shared_child_when_loaded_then_tree_is_rejected() {
    let dir = TempDir::new("catalogue");
    let path = dir.write(
        "ontologies.json",
        r#"{
            "BFO": {
                "root": "Entity",
                "classes": {
                    "Entity": ["Continuant", "Occurrent"],
                    "Continuant": ["Quality"],
                    "Occurrent": ["Quality"]
                }
            }
        }"#,
    );

    let err = load_catalogue(&path).expect_err("a class with two parents is not a tree");
    assert!(matches!(err, OntologyError::MalformedTree { ref ontology, .. } if ontology == "BFO"));
}

#[test]
fn given_valid_catalogue_when_loaded_then_every_tree_is_available() {
    let dir = TempDir::new("catalogue");
    let path = dir.write(
        "ontologies.json",
        r#"{
            "BFO": {"root": "Entity", "classes": {"Entity": ["Continuant", "Occurrent"]}},
            "Tiny": {"root": "Thing"}
        }"#,
    );

    let catalogue = load_catalogue(&path).expect("catalogue loads");
    assert_eq!(catalogue.len(), 2);
    assert_eq!(catalogue["BFO"].depth(), 1);
    assert_eq!(catalogue["Tiny"].depth(), 0);
    assert_eq!(
        catalogue["BFO"].classes(),
        vec!["Continuant", "Entity", "Occurrent"]
    );
}
