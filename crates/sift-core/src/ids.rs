//! ID prefix constants.
//!
//! IDs are generated by the database layer as `{prefix}-{8 hex chars}`.
//! Candidates normally reuse the external record id; the candidate prefix is
//! only used when a source returned a record without one.

pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_CANDIDATE: &str = "cnd";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix the database layer may be asked to generate.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_PROJECT, PREFIX_CANDIDATE, PREFIX_AUDIT];
