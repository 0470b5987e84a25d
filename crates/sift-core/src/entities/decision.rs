use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Confidence, Decision};

/// One classifier verdict for a candidate, as returned by the screening agent.
///
/// Recording it never confirms the candidate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AutomatedDecision {
    #[serde(alias = "id")]
    pub candidate_id: String,
    pub decision: Decision,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub subtopic: Option<String>,
}
