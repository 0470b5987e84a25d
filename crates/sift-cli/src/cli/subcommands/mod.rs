mod candidate;
mod included;
mod project;

pub use candidate::CandidateCommands;
pub use included::IncludedCommands;
pub use project::ProjectCommands;
