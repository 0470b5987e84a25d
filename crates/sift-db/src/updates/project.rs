//! Project update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_tasks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tasks: Option<u32>,
    /// Replaces the blob stored under `.0` in `phase_data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_data: Option<(String, serde_json::Value)>,
}

pub struct ProjectUpdateBuilder(ProjectUpdate);

impl ProjectUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ProjectUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub const fn completed_tasks(mut self, completed: u32) -> Self {
        self.0.completed_tasks = Some(completed);
        self
    }

    #[must_use]
    pub const fn total_tasks(mut self, total: u32) -> Self {
        self.0.total_tasks = Some(total);
        self
    }

    #[must_use]
    pub fn phase_data(mut self, phase: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.phase_data = Some((phase.into(), value));
        self
    }

    #[must_use]
    pub fn build(self) -> ProjectUpdate {
        self.0
    }
}

impl Default for ProjectUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
