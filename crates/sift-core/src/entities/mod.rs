//! Entity structs for all Sift domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `sift-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod audit;
mod candidate;
mod counters;
mod decision;
mod included;
mod paper;
mod project;

pub use audit::AuditEntry;
pub use candidate::Candidate;
pub use counters::{CounterAnomaly, PrismaCounters, PrismaDelta};
pub use decision::AutomatedDecision;
pub use included::IncludedStudy;
pub use paper::ExternalPaper;
pub use project::Project;
