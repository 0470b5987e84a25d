use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Source;

/// An unprocessed record fetched from an external bibliographic source.
///
/// This is the ingestion input. It carries the bibliographic fields of a
/// [`Candidate`](super::Candidate) and none of the workflow fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExternalPaper {
    /// Source-side identifier (Semantic Scholar paper id, PMID, ...).
    #[serde(default)]
    pub id: String,
    pub source: Source,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
