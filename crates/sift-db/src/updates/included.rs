//! Included study update builder.

use serde::Serialize;
use sift_core::enums::{ExtractionStatus, QualityStatus};

#[derive(Debug, Clone, Default, Serialize)]
pub struct IncludedStudyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_status: Option<QualityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_status: Option<ExtractionStatus>,
}

pub struct IncludedStudyUpdateBuilder(IncludedStudyUpdate);

impl IncludedStudyUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(IncludedStudyUpdate::default())
    }

    #[must_use]
    pub const fn quality_status(mut self, status: QualityStatus) -> Self {
        self.0.quality_status = Some(status);
        self
    }

    #[must_use]
    pub const fn extraction_status(mut self, status: ExtractionStatus) -> Self {
        self.0.extraction_status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> IncludedStudyUpdate {
        self.0
    }
}

impl Default for IncludedStudyUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
