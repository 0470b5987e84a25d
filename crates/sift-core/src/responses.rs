//! Result types returned by service operations and printed by `sift`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Candidate, CounterAnomaly, PrismaCounters, PrismaDelta};
use crate::lifecycle::ProjectionChange;

/// Outcome of one batch ingestion call.
///
/// `saved + duplicates + without_abstract` always equals the number of papers
/// offered to the call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IngestReport {
    pub saved: u32,
    pub duplicates: u32,
    pub without_abstract: u32,
}

impl IngestReport {
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.saved + self.duplicates + self.without_abstract
    }
}

/// Outcome of confirming a decision.
///
/// `delta` is what the confirmation added to the project's PRISMA counters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConfirmResponse {
    pub candidate: Candidate,
    pub first_confirmation: bool,
    pub delta: PrismaDelta,
    pub projection: ProjectionChange,
}

/// One classifier verdict that could not be applied.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SkippedDecision {
    pub candidate_id: String,
    pub reason: String,
}

/// Outcome of applying a whole classifier response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AutomatedBatchReport {
    pub applied: Vec<String>,
    pub skipped: Vec<SkippedDecision>,
}

/// Candidate counts per lifecycle state and decision.
///
/// The per-decision counts cover every candidate carrying a decision, whether
/// automated or confirmed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScreeningProgress {
    pub total: u32,
    pub pending: u32,
    pub screened_unconfirmed: u32,
    pub confirmed: u32,
    pub include: u32,
    pub exclude: u32,
    pub uncertain: u32,
}

/// PRISMA counters together with the expected relations they violate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PrismaReport {
    pub project_id: String,
    pub counters: PrismaCounters,
    /// Identified records left after duplicates and missing abstracts.
    pub eligible_for_screening: u64,
    /// Screened records not included.
    pub excluded: u64,
    pub anomalies: Vec<CounterAnomaly>,
}

impl PrismaReport {
    /// Build the report for `counters`, deriving the flow-diagram boxes.
    #[must_use]
    pub fn from_counters(project_id: impl Into<String>, counters: PrismaCounters) -> Self {
        Self {
            project_id: project_id.into(),
            eligible_for_screening: counters.eligible_for_screening(),
            excluded: counters.excluded(),
            anomalies: counters.anomalies(),
            counters,
        }
    }
}

/// Outcome of rebuilding the included-studies projection from candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }
}
