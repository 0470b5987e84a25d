use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Candidate;
use crate::enums::{ExtractionStatus, QualityStatus};

/// Projection of a candidate whose confirmed decision is `include`.
///
/// Shares the candidate's id. The snapshot is refreshed on every confirmation
/// and read by the appraisal and extraction phases.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IncludedStudy {
    pub project_id: String,
    pub candidate_id: String,
    pub candidate: Candidate,
    pub confirmed_at: DateTime<Utc>,
    pub quality_status: QualityStatus,
    pub extraction_status: ExtractionStatus,
    pub updated_at: DateTime<Utc>,
}
