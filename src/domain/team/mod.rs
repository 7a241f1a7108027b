// Team domain module
// Contains the team profile and its value objects

pub mod profile;
pub mod value_objects;

// Re-export main types for convenience
pub use profile::{ProfileError, TeamProfile, TeamProfileRecord};
pub use value_objects::TeamSlug;
