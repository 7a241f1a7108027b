// Ports for external collaborators the domain depends on

pub mod team_profile_source;

pub use team_profile_source::{ProfileSourceError, TeamProfileSource};
