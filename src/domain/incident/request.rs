use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

/// Reasons an incident request is rejected before any team is consulted
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("incident description is required")]
    EmptyDescription,

    #[error("deadline {deadline} is not after {now}")]
    DeadlineNotInFuture {
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("hours to deadline must be a positive number, got {0}")]
    InvalidDeadlineOffset(f64),
}

/// A reported incident and its resolution deadline
///
/// # Invariants
/// - Description is non-empty after trimming
/// - Deadline is strictly after `reported_at`
///
/// # Example
/// ```
/// use chrono::Utc;
/// use incident_coordinator::domain::incident::IncidentRequest;
///
/// let now = Utc::now();
/// let incident = IncidentRequest::from_hours("Checkout API down", 12.0, now)
///     .expect("valid incident");
///
/// assert_eq!(incident.description(), "Checkout API down");
/// assert!(incident.deadline() > now);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRequest {
    description: String,
    deadline: DateTime<Utc>,
    reported_at: DateTime<Utc>,
}

impl IncidentRequest {
    /// Creates an incident with an absolute deadline
    ///
    /// # Errors
    /// * `ValidationError::EmptyDescription` - blank description
    /// * `ValidationError::DeadlineNotInFuture` - deadline not after `reported_at`
    pub fn new(
        description: impl Into<String>,
        deadline: DateTime<Utc>,
        reported_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        let incident = Self {
            description,
            deadline,
            reported_at,
        };
        incident.validate_at(reported_at)?;

        Ok(incident)
    }

    /// Creates an incident whose deadline is `hours` after `now`
    ///
    /// Fractional hours are honoured to the millisecond.
    pub fn from_hours(
        description: impl Into<String>,
        hours: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(ValidationError::InvalidDeadlineOffset(hours));
        }

        let millis = (hours * 3_600_000.0).round() as i64;
        if millis <= 0 {
            return Err(ValidationError::InvalidDeadlineOffset(hours));
        }

        let deadline = now
            .checked_add_signed(Duration::milliseconds(millis))
            .ok_or(ValidationError::InvalidDeadlineOffset(hours))?;

        Self::new(description, deadline, now)
    }

    /// Checks that the deadline is still ahead of `now`
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if self.deadline <= now {
            return Err(ValidationError::DeadlineNotInFuture {
                deadline: self.deadline,
                now,
            });
        }
        Ok(())
    }

    /// Returns the incident description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the resolution deadline
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns when the incident was reported
    pub fn reported_at(&self) -> DateTime<Utc> {
        self.reported_at
    }
}
