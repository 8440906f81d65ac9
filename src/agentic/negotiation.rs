use serde::{Deserialize, Serialize};

/// Hard bound on proposal/critique rounds per term.
pub const MAX_ATTEMPTS: u32 = 3;
/// Charged for an explicit Critic rejection or an out-of-universe proposal.
pub const REJECTION_COST: u32 = 1;
/// Charged when the Taxonomist yields no usable decision; exhausts the budget at once.
pub const LOCAL_FAILURE_COST: u32 = MAX_ATTEMPTS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum RoundOutcome {
    Approved,
    Rejected { critique: String },
    ClosedWorldViolation { critique: String },
    NoDecision { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationRound {
    /// Attempt count before this round was charged.
    pub attempt: u32,
    pub proposed_parent: Option<String>,
    pub outcome: RoundOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Approved,
    /// The budget ran out; the term was forced to root.
    FallbackRoot,
}

/// Final placement of one term plus the rounds that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermResolution {
    pub term: String,
    pub parents: Vec<String>,
    pub resolution: Resolution,
    pub rounds: Vec<NegotiationRound>,
}

/// Per-term negotiation state; lives only while one term is being placed.
#[derive(Debug, Default)]
pub(crate) struct NegotiationAttempt {
    attempt: u32,
    last_critique: Option<String>,
    rounds: Vec<NegotiationRound>,
}

impl NegotiationAttempt {
    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }

    pub(crate) fn has_budget(&self) -> bool {
        self.attempt < MAX_ATTEMPTS
    }

    pub(crate) fn last_critique(&self) -> Option<&str> {
        self.last_critique.as_deref()
    }

    pub(crate) fn reject(&mut self, parent: String, critique: String, closed_world: bool) {
        let outcome = if closed_world {
            RoundOutcome::ClosedWorldViolation {
                critique: critique.clone(),
            }
        } else {
            RoundOutcome::Rejected {
                critique: critique.clone(),
            }
        };
        self.record(Some(parent), outcome, REJECTION_COST);
        self.last_critique = Some(critique);
    }

    pub(crate) fn fail(&mut self, proposed_parent: Option<String>, error: String) {
        self.record(
            proposed_parent,
            RoundOutcome::NoDecision { error },
            LOCAL_FAILURE_COST,
        );
    }

    pub(crate) fn approve(
        mut self,
        term: &str,
        parent: String,
        parents: Vec<String>,
    ) -> TermResolution {
        self.record(Some(parent), RoundOutcome::Approved, 0);
        TermResolution {
            term: term.to_string(),
            parents,
            resolution: Resolution::Approved,
            rounds: self.rounds,
        }
    }

    pub(crate) fn fall_back_to_root(self, term: &str) -> TermResolution {
        TermResolution {
            term: term.to_string(),
            parents: Vec::new(),
            resolution: Resolution::FallbackRoot,
            rounds: self.rounds,
        }
    }

    fn record(&mut self, proposed_parent: Option<String>, outcome: RoundOutcome, cost: u32) {
        self.rounds.push(NegotiationRound {
            attempt: self.attempt,
            proposed_parent,
            outcome,
        });
        self.attempt += cost;
    }
}
