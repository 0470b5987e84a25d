//! # sift-core
//!
//! Core types, dedup key derivation, and screening lifecycle rules for Sift.
//!
//! This crate holds everything that does not touch storage:
//! - Entity structs (projects, candidates, included studies, PRISMA counters)
//! - Status enums with state machine transitions
//! - The dedup key deriver used by batch ingestion
//! - Pure planning of confirmation side effects (counter deltas, projection changes)
//! - ID prefix constants, audit detail payloads, and service response types

pub mod audit_detail;
pub mod dedup;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod lifecycle;
pub mod responses;
