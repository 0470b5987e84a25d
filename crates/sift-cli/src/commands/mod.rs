pub mod audit;
pub mod candidate;
pub mod confirm;
pub mod decide;
pub mod dispatch;
pub mod included;
pub mod ingest;
pub mod project;
pub mod schema;
pub mod shared;
pub mod stats;
