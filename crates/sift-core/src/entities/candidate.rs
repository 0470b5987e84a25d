use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::ExternalPaper;
use crate::enums::{CandidateState, Confidence, Decision, ScreeningStatus, Source};

/// An external record adopted into a project's screening set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub project_id: String,
    pub dedup_key: String,
    pub source: Source,
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub decision: Option<Decision>,
    pub user_confirmed: bool,
    pub screening_status: ScreeningStatus,
    pub reason: Option<String>,
    pub confidence: Option<Confidence>,
    pub subtopic: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    /// Build a fresh `pending` candidate from an ingested paper.
    #[must_use]
    pub fn from_paper(
        id: String,
        project_id: &str,
        dedup_key: String,
        paper: &ExternalPaper,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_id: project_id.to_string(),
            dedup_key,
            source: paper.source,
            title: paper.title.clone(),
            authors: paper.authors.clone(),
            year: paper.year,
            abstract_text: paper.abstract_text.clone(),
            doi: paper.doi.clone(),
            url: paper.url.clone(),
            decision: None,
            user_confirmed: false,
            screening_status: ScreeningStatus::Unscreened,
            reason: None,
            confidence: None,
            subtopic: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lifecycle state derived from the workflow fields.
    #[must_use]
    pub const fn state(&self) -> CandidateState {
        CandidateState::from_fields(self.user_confirmed, self.decision, self.screening_status)
    }

    /// Whether this candidate must be mirrored in the included-studies projection.
    #[must_use]
    pub const fn requires_projection(&self) -> bool {
        self.user_confirmed && matches!(self.decision, Some(Decision::Include))
    }
}
