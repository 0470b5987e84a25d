//! # sift-schema
//!
//! JSON Schemas for the Sift data model, generated from sift-core types with
//! `schemars` and checked with `jsonschema`.
//!
//! The CLI uses the registry to print schemas for collaborators (search
//! adapters, the classifier) and to validate their JSON before ingestion.

mod error;
mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
