//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! give the common shapes a schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::PrismaDelta;
use crate::enums::{CandidateState, Confidence, Decision};

/// Detail for `AuditAction::AutoDecided` and `AuditAction::Confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionDetail {
    pub from: CandidateState,
    pub to: CandidateState,
    pub previous_decision: Option<Decision>,
    pub decision: Decision,
    pub confidence: Option<Confidence>,
    pub reason: Option<String>,
}

/// Detail for `AuditAction::Ingested`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IngestDetail {
    pub offered: u32,
    pub saved: u32,
    pub duplicates: u32,
    pub without_abstract: u32,
    pub backfilled_keys: u32,
}

/// Detail for `AuditAction::Updated` on the PRISMA stats record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LedgerDetail {
    pub delta: PrismaDelta,
}

/// Detail for `AuditAction::Reconciled`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReconcileDetail {
    pub created: Vec<String>,
    pub removed: Vec<String>,
}
