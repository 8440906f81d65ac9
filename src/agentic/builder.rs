use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use uuid::Uuid;

use crate::{
    agentic::{
        AgenticError,
        negotiation::{NegotiationAttempt, TermResolution},
        prompts,
    },
    ontology::MetaProperties,
    oracle::{
        Oracle, OracleError, OutputMode, RoleOracle, normalize, response_normalizer::string_field,
    },
    taxonomy::TaxonomyGraph,
};

pub const DEFAULT_ROOT_SENTINEL: &str = "Thing";

/// Everything the negotiation needs to know about one domain.
#[derive(Debug, Clone, Default)]
pub struct DomainContext {
    pub domain: String,
    pub terms: Vec<String>,
    pub properties: BTreeMap<String, MetaProperties>,
}

impl DomainContext {
    pub fn new<I, S>(domain: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into(),
            terms: terms.into_iter().map(Into::into).collect(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, MetaProperties>) -> Self {
        self.properties = properties;
        self
    }

    /// Distinct terms in lexicographic order.
    pub fn visitation_order(&self) -> Vec<&str> {
        self.universe().into_iter().collect()
    }

    fn universe(&self) -> BTreeSet<&str> {
        self.terms.iter().map(String::as_str).collect()
    }
}

/// Receives the domain graph after every resolved term.
pub trait ProgressSink: Send {
    fn term_resolved(
        &mut self,
        domain: &str,
        graph: &TaxonomyGraph,
        resolution: &TermResolution,
    ) -> Result<(), AgenticError>;
}

/// Sink for callers that keep the graph in memory only.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardProgress;

impl ProgressSink for DiscardProgress {
    fn term_resolved(
        &mut self,
        _domain: &str,
        _graph: &TaxonomyGraph,
        _resolution: &TermResolution,
    ) -> Result<(), AgenticError> {
        Ok(())
    }
}

/// Places terms one at a time through a Taxonomist proposal and a Critic review.
pub struct AgenticBuilder {
    taxonomist: RoleOracle,
    critic: RoleOracle,
    sentinel: String,
}

impl AgenticBuilder {
    pub fn new(taxonomist: Arc<dyn Oracle>, critic: Arc<dyn Oracle>) -> Self {
        Self {
            taxonomist: RoleOracle::new("taxonomist", prompts::TAXONOMIST_PROMPT, taxonomist),
            critic: RoleOracle::new("critic", prompts::CRITIC_PROMPT, critic)
                .with_output_mode(OutputMode::Text),
            sentinel: DEFAULT_ROOT_SENTINEL.to_string(),
        }
    }

    pub fn with_root_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn root_sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Resolves every term of `context` not yet in `graph`, in lexicographic order.
    ///
    /// `graph` may be pre-populated from an earlier run; placed terms are skipped and
    /// their edges kept. Only a cancelled oracle call or a failing sink stops the run.
    pub async fn build_domain(
        &self,
        context: &DomainContext,
        graph: &mut TaxonomyGraph,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<TermResolution>, AgenticError> {
        let mut resolutions = Vec::new();
        for term in context.visitation_order() {
            if graph.contains(term) {
                tracing::debug!(
                    target: "agentic",
                    domain = %context.domain,
                    term = term,
                    "term_already_placed"
                );
                continue;
            }

            let resolution = self.resolve_term(context, term, graph).await?;
            graph.place(term, resolution.parents.iter().cloned())?;
            tracing::info!(
                target: "agentic",
                domain = %context.domain,
                term = term,
                parents = ?resolution.parents,
                resolution = ?resolution.resolution,
                rounds = resolution.rounds.len(),
                "term_resolved"
            );
            sink.term_resolved(&context.domain, graph, &resolution)?;
            resolutions.push(resolution);
        }
        Ok(resolutions)
    }

    /// Runs the bounded negotiation for one term against the current graph.
    pub async fn resolve_term(
        &self,
        context: &DomainContext,
        term: &str,
        graph: &TaxonomyGraph,
    ) -> Result<TermResolution, AgenticError> {
        let universe = context.universe();
        let mut state = NegotiationAttempt::default();

        while state.has_budget() {
            let proposal = prompts::proposal_context(
                &context.domain,
                &context.terms,
                graph,
                term,
                &self.sentinel,
                state.last_critique(),
            );
            let text = match self.taxonomist.ask(request_id(), proposal).await {
                Ok(text) => text,
                Err(err) => {
                    abort_if_cancelled(&err)?;
                    self.log_failure(context, term, state.attempt(), &err.to_string());
                    state.fail(None, err.to_string());
                    continue;
                }
            };

            let parent = match normalize(&text) {
                Ok(decision) => string_field(&decision, "parent"),
                Err(err) => {
                    self.log_failure(context, term, state.attempt(), &err.to_string());
                    state.fail(None, err.to_string());
                    continue;
                }
            };
            let Some(parent) = parent else {
                self.log_failure(context, term, state.attempt(), "proposal has no parent");
                state.fail(None, "proposal has no parent".to_string());
                continue;
            };

            let is_root = parent == self.sentinel;
            if !is_root && (parent == term || !universe.contains(parent.as_str())) {
                let critique = format!(
                    "REJECT: \"{parent}\" is not an allowed parent for \"{term}\". \
                     Choose one of the listed terms other than \"{term}\", or \"{}\".",
                    self.sentinel
                );
                tracing::debug!(
                    target: "agentic",
                    domain = %context.domain,
                    term = term,
                    parent = %parent,
                    attempt = state.attempt(),
                    "proposal_outside_universe"
                );
                state.reject(parent, critique, true);
                continue;
            }

            let request = prompts::critique_request(
                &context.domain,
                term,
                &parent,
                &self.sentinel,
                context.properties.get(term),
                context.properties.get(&parent),
            );
            let critique = match self.critic.ask(request_id(), request).await {
                Ok(critique) => critique,
                Err(err) => {
                    abort_if_cancelled(&err)?;
                    self.log_failure(context, term, state.attempt(), &err.to_string());
                    state.fail(Some(parent), err.to_string());
                    continue;
                }
            };

            if prompts::is_rejection(&critique) {
                tracing::debug!(
                    target: "agentic",
                    domain = %context.domain,
                    term = term,
                    parent = %parent,
                    attempt = state.attempt(),
                    critique = %critique,
                    "proposal_rejected"
                );
                state.reject(parent, critique.trim().to_string(), false);
                continue;
            }

            let parents = if is_root {
                Vec::new()
            } else {
                vec![parent.clone()]
            };
            return Ok(state.approve(term, parent, parents));
        }

        tracing::info!(
            target: "agentic",
            domain = %context.domain,
            term = term,
            attempt = state.attempt(),
            "negotiation_exhausted_fallback_root"
        );
        Ok(state.fall_back_to_root(term))
    }

    fn log_failure(&self, context: &DomainContext, term: &str, attempt: u32, error: &str) {
        tracing::warn!(
            target: "agentic",
            domain = %context.domain,
            term = term,
            attempt = attempt,
            error = error,
            "proposal_failed"
        );
    }
}

fn request_id() -> String {
    Uuid::now_v7().to_string()
}

fn abort_if_cancelled(err: &OracleError) -> Result<(), AgenticError> {
    if err.is_cancelled() {
        return Err(AgenticError::Cancelled(err.clone()));
    }
    Ok(())
}
