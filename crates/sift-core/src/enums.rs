//! Status enums, decision values, sources, and audit vocabulary for Sift.
//!
//! Workflow enums use `snake_case` serialization. `Source` keeps the
//! kebab-case names the search collaborators emit (`semantic-scholar`,
//! `europe-pmc`). The string returned by `as_str()` is always identical to the
//! serde representation so rows can be parsed back with `serde_json`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// External bibliographic database a record was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    SemanticScholar,
    Pubmed,
    Crossref,
    EuropePmc,
}

impl Source {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SemanticScholar => "semantic-scholar",
            Self::Pubmed => "pubmed",
            Self::Crossref => "crossref",
            Self::EuropePmc => "europe-pmc",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Screening decision for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Include,
    Exclude,
    Uncertain,
}

impl Decision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
            Self::Uncertain => "uncertain",
        }
    }

    #[must_use]
    pub const fn is_include(self) -> bool {
        matches!(self, Self::Include)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ScreeningStatus
// ---------------------------------------------------------------------------

/// Whether any decision (automated or confirmed) has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    Unscreened,
    Screened,
}

impl ScreeningStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unscreened => "unscreened",
            Self::Screened => "screened",
        }
    }
}

impl fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Confidence attached to a screening justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CandidateState
// ---------------------------------------------------------------------------

/// Lifecycle state of a candidate, derived from its workflow fields.
///
/// ```text
/// pending → screened_unconfirmed → confirmed ⟲
///         ─────────────────────→ confirmed
/// ```
///
/// `confirmed` only loops back to itself (re-confirmation with the same or a
/// different decision). Automated decisions are rejected once confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CandidateState {
    Pending,
    ScreenedUnconfirmed,
    Confirmed,
}

impl CandidateState {
    /// Derive the state from a candidate's stored workflow fields.
    #[must_use]
    pub const fn from_fields(
        user_confirmed: bool,
        decision: Option<Decision>,
        status: ScreeningStatus,
    ) -> Self {
        if user_confirmed {
            Self::Confirmed
        } else if decision.is_some() || matches!(status, ScreeningStatus::Screened) {
            Self::ScreenedUnconfirmed
        } else {
            Self::Pending
        }
    }

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending | Self::ScreenedUnconfirmed => {
                &[Self::ScreenedUnconfirmed, Self::Confirmed]
            }
            Self::Confirmed => &[Self::Confirmed],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ScreenedUnconfirmed => "screened_unconfirmed",
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QualityStatus
// ---------------------------------------------------------------------------

/// Progress of the quality appraisal phase for an included study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QualityStatus {
    Pending,
    InProgress,
    Assessed,
}

impl QualityStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Assessed => "assessed",
        }
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExtractionStatus
// ---------------------------------------------------------------------------

/// Progress of the data extraction phase for an included study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Pending,
    InProgress,
    Extracted,
}

impl ExtractionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Extracted => "extracted",
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Ingested,
    AutoDecided,
    Confirmed,
    Reconciled,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Ingested => "ingested",
            Self::AutoDecided => "auto_decided",
            Self::Confirmed => "confirmed",
            Self::Reconciled => "reconciled",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    Candidate,
    IncludedStudy,
    PrismaStats,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Candidate => "candidate",
            Self::IncludedStudy => "included_study",
            Self::PrismaStats => "prisma_stats",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                assert_eq!(val.as_str(), $expected_str);
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(
        source_semantic_scholar,
        Source,
        Source::SemanticScholar,
        "semantic-scholar"
    );
    test_serde_roundtrip!(source_pubmed, Source, Source::Pubmed, "pubmed");
    test_serde_roundtrip!(source_europe_pmc, Source, Source::EuropePmc, "europe-pmc");

    test_serde_roundtrip!(decision_uncertain, Decision, Decision::Uncertain, "uncertain");
    test_serde_roundtrip!(
        screening_unscreened,
        ScreeningStatus,
        ScreeningStatus::Unscreened,
        "unscreened"
    );
    test_serde_roundtrip!(
        state_screened_unconfirmed,
        CandidateState,
        CandidateState::ScreenedUnconfirmed,
        "screened_unconfirmed"
    );
    test_serde_roundtrip!(
        quality_in_progress,
        QualityStatus,
        QualityStatus::InProgress,
        "in_progress"
    );
    test_serde_roundtrip!(
        audit_auto_decided,
        AuditAction,
        AuditAction::AutoDecided,
        "auto_decided"
    );
    test_serde_roundtrip!(
        entity_included_study,
        EntityType,
        EntityType::IncludedStudy,
        "included_study"
    );

    #[test]
    fn pending_can_reach_both_screened_states() {
        assert!(CandidateState::Pending.can_transition_to(CandidateState::ScreenedUnconfirmed));
        assert!(CandidateState::Pending.can_transition_to(CandidateState::Confirmed));
        assert!(!CandidateState::Pending.can_transition_to(CandidateState::Pending));
    }

    #[test]
    fn confirmed_only_loops_to_itself() {
        assert_eq!(
            CandidateState::Confirmed.allowed_next_states(),
            &[CandidateState::Confirmed]
        );
        assert!(!CandidateState::Confirmed.can_transition_to(CandidateState::ScreenedUnconfirmed));
    }

    #[test]
    fn state_derived_from_fields() {
        use CandidateState as S;
        assert_eq!(S::from_fields(false, None, ScreeningStatus::Unscreened), S::Pending);
        assert_eq!(
            S::from_fields(false, None, ScreeningStatus::Screened),
            S::ScreenedUnconfirmed
        );
        assert_eq!(
            S::from_fields(false, Some(Decision::Exclude), ScreeningStatus::Unscreened),
            S::ScreenedUnconfirmed
        );
        assert_eq!(
            S::from_fields(true, Some(Decision::Include), ScreeningStatus::Screened),
            S::Confirmed
        );
    }

    #[test]
    fn unknown_source_rejected() {
        let parsed = serde_json::from_str::<Source>("\"arxiv\"");
        assert!(parsed.is_err());
    }
}
