use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A systematic review project. Owns candidates, included studies, and counters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Opaque per-phase blobs (protocol, synthesis state, ...) keyed by phase name.
    pub phase_data: serde_json::Map<String, serde_json::Value>,
    pub completed_tasks: u32,
    pub total_tasks: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
