#[path = "../support/mod.rs"]
mod support;

use std::collections::BTreeMap;

use ontotax::{
    agentic::{
        AgenticBuilder, AgenticError, DiscardProgress, DomainContext, MAX_ATTEMPTS, ProgressSink,
        Resolution, RoundOutcome, TermResolution,
    },
    ontology::{MetaProperties, Rigidity},
    oracle::OracleRequest,
    taxonomy::TaxonomyGraph,
};

use support::{FnOracle, ScriptedOracle, cancelled};

fn animals() -> DomainContext {
    DomainContext::new("animals", ["Sparrow", "Bird", "Wing"])
}

/// Term named on the `Current Term to Place` line of a Taxonomist prompt.
fn term_to_place(request: &OracleRequest) -> String {
    request
        .user_prompt
        .lines()
        .find_map(|line| line.strip_prefix("Current Term to Place: "))
        .map(|term| term.trim_matches('"').to_string())
        .unwrap_or_default()
}

fn proposal(term: &str, parent: &str) -> String {
    format!(r#"{{"child": "{term}", "parent": "{parent}"}}"#)
}

#[derive(Default)]
struct RecordingSink {
    placed: Vec<(String, usize)>,
}

impl ProgressSink for RecordingSink {
    fn term_resolved(
        &mut self,
        _domain: &str,
        graph: &TaxonomyGraph,
        resolution: &TermResolution,
    ) -> Result<(), AgenticError> {
        self.placed.push((resolution.term.clone(), graph.len()));
        Ok(())
    }
}

#[tokio::test]
async fn given_approving_critic_when_domain_is_built_then_every_term_is_placed_in_order() {
    let taxonomist = FnOracle::new(|request| {
        let term = term_to_place(request);
        let parent = if term == "Sparrow" { "Bird" } else { "Thing" };
        Ok(proposal(&term, parent))
    });
    let critic = FnOracle::new(|_| Ok("APPROVE".to_string()));
    let builder = AgenticBuilder::new(taxonomist.clone(), critic.clone());
    let mut graph = TaxonomyGraph::new();
    let mut sink = RecordingSink::default();

    let resolutions = builder
        .build_domain(&animals(), &mut graph, &mut sink)
        .await
        .expect("build succeeds");

    assert_eq!(
        resolutions.iter().map(|r| r.term.as_str()).collect::<Vec<_>>(),
        vec!["Bird", "Sparrow", "Wing"]
    );
    assert!(resolutions.iter().all(|r| r.resolution == Resolution::Approved));
    assert_eq!(
        sink.placed,
        vec![
            ("Bird".to_string(), 1),
            ("Sparrow".to_string(), 2),
            ("Wing".to_string(), 3)
        ]
    );
    let expected: TaxonomyGraph = serde_json::from_value(serde_json::json!({
        "Bird": [], "Sparrow": ["Bird"], "Wing": []
    }))
    .expect("expected graph parses");
    assert_eq!(graph, expected);
    assert_eq!(taxonomist.calls(), 3);
    assert_eq!(critic.calls(), 3);
}

#[tokio::test]
async fn given_rejecting_critic_when_term_is_resolved_then_it_falls_back_after_max_attempts() {
    let taxonomist = FnOracle::new(|request| Ok(proposal(&term_to_place(request), "Bird")));
    let critic = FnOracle::new(|_| Ok("REJECT: a sparrow is not that kind of bird".to_string()));
    let builder = AgenticBuilder::new(taxonomist.clone(), critic.clone());

    let resolution = builder
        .resolve_term(&animals(), "Sparrow", &TaxonomyGraph::new())
        .await
        .expect("negotiation completes");

    assert_eq!(resolution.resolution, Resolution::FallbackRoot);
    assert!(resolution.parents.is_empty());
    assert_eq!(resolution.rounds.len(), MAX_ATTEMPTS as usize);
    assert!(
        resolution
            .rounds
            .iter()
            .all(|round| matches!(round.outcome, RoundOutcome::Rejected { .. }))
    );
    assert_eq!(taxonomist.calls(), 3);
    assert_eq!(critic.calls(), 3);
}

#[tokio::test]
async fn given_rejection_when_taxonomist_retries_then_critique_is_fed_back() {
    let taxonomist = ScriptedOracle::replying(&[
        &proposal("Sparrow", "Wing"),
        &proposal("Sparrow", "Bird"),
    ]);
    let critic = ScriptedOracle::replying(&["Reject: a sparrow is not a wing.", "APPROVE"]);
    let builder = AgenticBuilder::new(taxonomist.clone(), critic);

    let resolution = builder
        .resolve_term(&animals(), "Sparrow", &TaxonomyGraph::new())
        .await
        .expect("negotiation completes");

    assert_eq!(resolution.parents, vec!["Bird"]);
    assert_eq!(resolution.rounds.len(), 2);
    let retry_prompt = &taxonomist.requests()[1].user_prompt;
    assert!(retry_prompt.contains("Previous attempt REJECTED by Critic"));
    assert!(retry_prompt.contains("Reject: a sparrow is not a wing."));
}

#[tokio::test]
async fn given_unparseable_proposal_when_term_is_resolved_then_budget_is_spent_at_once() {
    let taxonomist = ScriptedOracle::replying(&["I would put it under birds, probably."]);
    let critic = ScriptedOracle::new([]);
    let builder = AgenticBuilder::new(taxonomist.clone(), critic.clone());

    let resolution = builder
        .resolve_term(&animals(), "Sparrow", &TaxonomyGraph::new())
        .await
        .expect("negotiation completes");

    // One malformed reply costs the whole budget, unlike a critic rejection.
    assert_eq!(resolution.resolution, Resolution::FallbackRoot);
    assert_eq!(resolution.rounds.len(), 1);
    assert!(matches!(
        resolution.rounds[0].outcome,
        RoundOutcome::NoDecision { .. }
    ));
    assert_eq!(taxonomist.calls(), 1);
    assert_eq!(critic.calls(), 0);
}

#[tokio::test]
async fn given_reply_without_parent_when_term_is_resolved_then_budget_is_spent_at_once() {
    let replies = [
        r#"{"child": "Sparrow"}"#,
        r#"{"child": "Sparrow", "parent": null}"#,
        r#"{"child": "Sparrow", "parent": "  "}"#,
    ];
    for reply in replies {
        let taxonomist = ScriptedOracle::replying([reply, proposal("Sparrow", "Bird").as_str()]);
        let critic = ScriptedOracle::replying(["APPROVE"]);
        let builder = AgenticBuilder::new(taxonomist.clone(), critic.clone());

        let resolution = builder
            .resolve_term(&animals(), "Sparrow", &TaxonomyGraph::new())
            .await
            .expect("negotiation completes");

        assert_eq!(resolution.resolution, Resolution::FallbackRoot, "{reply}");
        assert_eq!(resolution.rounds.len(), 1, "{reply}");
        assert!(
            matches!(
                resolution.rounds[0].outcome,
                RoundOutcome::NoDecision { .. }
            ),
            "{reply}"
        );
        assert_eq!(taxonomist.calls(), 1, "{reply}");
        assert_eq!(critic.calls(), 0, "{reply}");
    }
}

#[tokio::test]
async fn given_transport_failure_when_critic_is_asked_then_term_falls_back_without_retry() {
    let taxonomist = ScriptedOracle::replying(&[&proposal("Sparrow", "Bird")]);
    let critic = ScriptedOracle::new([Err(support::transport_failure())]);
    let builder = AgenticBuilder::new(taxonomist.clone(), critic);

    let resolution = builder
        .resolve_term(&animals(), "Sparrow", &TaxonomyGraph::new())
        .await
        .expect("negotiation completes");

    assert_eq!(resolution.resolution, Resolution::FallbackRoot);
    assert_eq!(resolution.rounds.len(), 1);
    assert_eq!(
        resolution.rounds[0].proposed_parent.as_deref(),
        Some("Bird")
    );
    assert_eq!(taxonomist.calls(), 1);
}

#[tokio::test]
async fn given_parent_outside_term_list_when_proposed_then_it_is_rejected_without_asking_critic() {
    let taxonomist = ScriptedOracle::replying(&[
        &proposal("Sparrow", "Animal"),
        &proposal("Sparrow", "Sparrow"),
        &proposal("Sparrow", "Bird"),
    ]);
    let critic = ScriptedOracle::replying(&["APPROVE"]);
    let builder = AgenticBuilder::new(taxonomist.clone(), critic.clone());

    let resolution = builder
        .resolve_term(&animals(), "Sparrow", &TaxonomyGraph::new())
        .await
        .expect("negotiation completes");

    assert_eq!(resolution.resolution, Resolution::Approved);
    assert_eq!(resolution.parents, vec!["Bird"]);
    assert!(matches!(
        &resolution.rounds[0].outcome,
        RoundOutcome::ClosedWorldViolation { critique } if critique.starts_with("REJECT:")
    ));
    assert!(matches!(
        resolution.rounds[1].outcome,
        RoundOutcome::ClosedWorldViolation { .. }
    ));
    assert_eq!(critic.calls(), 1);
    assert_eq!(taxonomist.calls(), 3);
}

#[tokio::test]
async fn given_approved_sentinel_when_term_is_resolved_then_parent_set_is_empty() {
    let taxonomist = ScriptedOracle::replying(&[&proposal("Bird", "Animalia")]);
    let critic = ScriptedOracle::replying(&["APPROVE: a root concept"]);
    let builder =
        AgenticBuilder::new(taxonomist, critic).with_root_sentinel("Animalia");

    let resolution = builder
        .resolve_term(&animals(), "Bird", &TaxonomyGraph::new())
        .await
        .expect("negotiation completes");

    assert_eq!(resolution.resolution, Resolution::Approved);
    assert!(resolution.parents.is_empty());
}

#[tokio::test]
async fn given_known_meta_properties_when_critic_is_asked_then_they_are_in_the_prompt() {
    let properties = BTreeMap::from([
        (
            "Student".to_string(),
            MetaProperties {
                rigidity: Some(Rigidity::AntiRigid),
                ..MetaProperties::default()
            },
        ),
        (
            "Person".to_string(),
            MetaProperties {
                rigidity: Some(Rigidity::Rigid),
                ..MetaProperties::default()
            },
        ),
    ]);
    let context = DomainContext::new("people", ["Person", "Student"]).with_properties(properties);
    let taxonomist = ScriptedOracle::replying(&[&proposal("Person", "Student")]);
    let critic = ScriptedOracle::replying(&["REJECT: ~R cannot subsume +R"]);
    let builder = AgenticBuilder::new(taxonomist, critic.clone());

    builder
        .resolve_term(&context, "Person", &TaxonomyGraph::new())
        .await
        .expect("negotiation completes");

    let request = &critic.requests()[0];
    assert!(request.user_prompt.contains("Known meta-properties"));
    assert!(request.user_prompt.contains("- Person: R=+R"));
    assert!(request.user_prompt.contains("- Student: R=~R"));
}

#[tokio::test]
async fn given_partially_built_graph_when_domain_is_built_then_placed_terms_are_skipped() {
    let taxonomist = FnOracle::new(|request| Ok(proposal(&term_to_place(request), "Thing")));
    let critic = FnOracle::new(|_| Ok("APPROVE".to_string()));
    let builder = AgenticBuilder::new(taxonomist.clone(), critic);
    let mut graph: TaxonomyGraph = serde_json::from_value(serde_json::json!({
        "Bird": [], "Sparrow": ["Bird"]
    }))
    .expect("graph parses");

    let resolutions = builder
        .build_domain(&animals(), &mut graph, &mut DiscardProgress)
        .await
        .expect("build succeeds");

    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].term, "Wing");
    assert_eq!(taxonomist.calls(), 1);
    assert_eq!(graph.parents("Sparrow").map(|p| p.len()), Some(1));
}

#[tokio::test]
async fn given_cancelled_oracle_when_domain_is_built_then_run_stops_and_keeps_placed_terms() {
    let taxonomist = ScriptedOracle::new([
        Ok(proposal("Bird", "Thing")),
        Err(cancelled()),
    ]);
    let critic = ScriptedOracle::replying(&["APPROVE"]);
    let builder = AgenticBuilder::new(taxonomist.clone(), critic);
    let mut graph = TaxonomyGraph::new();
    let mut sink = RecordingSink::default();

    let err = builder
        .build_domain(&animals(), &mut graph, &mut sink)
        .await
        .expect_err("cancellation aborts the run");

    assert!(matches!(err, AgenticError::Cancelled(_)));
    assert!(graph.contains("Bird"));
    assert!(!graph.contains("Sparrow"));
    assert_eq!(sink.placed.len(), 1);
    assert_eq!(taxonomist.calls(), 2);
}
