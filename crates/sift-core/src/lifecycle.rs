//! Screening decision lifecycle.
//!
//! The storage layer asks this module what a decision *means* before writing
//! anything: whether the transition is legal, which PRISMA counters move, and
//! what happens to the included-studies projection. Keeping the rules pure
//! lets them be tested without a database.
//!
//! Screening is a flow-diagram stage, so `screened` moves once per candidate
//! (on its first confirmation). Inclusion tracks the current decision, so
//! `included` moves on every confirmation that enters or leaves `include`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Candidate, PrismaDelta};
use crate::enums::{CandidateState, Decision};
use crate::errors::CoreError;

/// What the included-studies projection must do after a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionChange {
    /// Create or refresh the projection row.
    Upsert,
    /// Delete the projection row.
    Remove,
    /// Leave the projection alone.
    Unchanged,
}

/// Side effects of confirming a decision on one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfirmationPlan {
    pub from: CandidateState,
    pub previous_decision: Option<Decision>,
    pub decision: Decision,
    pub first_confirmation: bool,
    pub delta: PrismaDelta,
    pub projection: ProjectionChange,
}

/// Plan the effects of `confirm_decision(candidate, decision)`.
///
/// Confirmation is legal from every state, so this never fails.
#[must_use]
pub fn plan_confirmation(candidate: &Candidate, decision: Decision) -> ConfirmationPlan {
    let from = candidate.state();
    let previous = candidate.decision;
    let first_confirmation = !candidate.user_confirmed;

    let mut delta = PrismaDelta::default();
    if first_confirmation {
        delta.screened = 1;
        if decision.is_include() {
            delta.included = 1;
        }
    } else if previous != Some(decision) {
        let was_included = previous.is_some_and(Decision::is_include);
        if was_included && !decision.is_include() {
            delta.included = -1;
        } else if !was_included && decision.is_include() {
            delta.included = 1;
        }
    }

    let projection = if decision.is_include() {
        ProjectionChange::Upsert
    } else if candidate.requires_projection() {
        ProjectionChange::Remove
    } else {
        ProjectionChange::Unchanged
    };

    ConfirmationPlan {
        from,
        previous_decision: previous,
        decision,
        first_confirmation,
        delta,
        projection,
    }
}

/// Validate that an automated (unconfirmed) decision may be recorded.
///
/// # Errors
///
/// Returns `CoreError::InvalidTransition` once the candidate is confirmed:
/// automation never overrides a user decision.
pub fn check_automated_decision(candidate: &Candidate) -> Result<CandidateState, CoreError> {
    let from = candidate.state();
    if from.can_transition_to(CandidateState::ScreenedUnconfirmed) {
        Ok(from)
    } else {
        Err(CoreError::InvalidTransition {
            entity_type: "candidate".to_string(),
            id: candidate.id.clone(),
            from: from.to_string(),
            to: CandidateState::ScreenedUnconfirmed.to_string(),
        })
    }
}
