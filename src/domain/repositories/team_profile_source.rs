use async_trait::async_trait;
use thiserror::Error;

use crate::domain::team::TeamProfileRecord;

/// Failure to reach the store holding team profiles
#[derive(Debug, Error)]
pub enum ProfileSourceError {
    #[error("team profiles unavailable at {location}: {reason}")]
    Unavailable { location: String, reason: String },
}

/// Source of team profile records
///
/// Defines the contract the coordinator relies on to learn which teams exist.
/// Implementations decide the storage format; records come back unvalidated
/// and in a stable order.
#[async_trait]
pub trait TeamProfileSource: Send + Sync {
    /// Load every team profile record
    async fn load_profiles(&self) -> Result<Vec<TeamProfileRecord>, ProfileSourceError>;
}
