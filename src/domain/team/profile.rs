use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use super::value_objects::TeamSlug;

/// Errors raised when a team profile cannot take part in a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("team profile from {origin} has no name")]
    MissingName { origin: String },

    #[error("team name {0:?} does not produce a usable slug")]
    UnusableName(String),

    #[error("duplicate team name {0:?}")]
    DuplicateName(String),

    #[error("team {name:?} collides with team {existing:?} on slug {slug:?}")]
    SlugCollision {
        name: String,
        existing: String,
        slug: String,
    },
}

/// Raw team profile as produced by a profile source
///
/// Nothing is validated here; conversion into [`TeamProfile`] enforces the
/// invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamProfileRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lead: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    /// Where the record came from (file name, row id), used in error reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Static facts about one responding team
///
/// # Invariants
/// - Name is non-empty and produces a non-empty [`TeamSlug`]
/// - Expertise tags are trimmed, lowercase and non-empty (the set may be empty)
/// - Members keep their declared order
///
/// # Example
/// ```
/// use incident_coordinator::domain::team::TeamProfile;
///
/// let profile = TeamProfile::new(
///     "Backend",
///     "Alice",
///     vec!["Bob".to_string()],
///     ["Backend", " database "],
/// ).expect("valid profile");
///
/// assert_eq!(profile.slug().as_str(), "backend");
/// assert!(profile.has_expertise("database"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamProfile {
    name: String,
    lead: String,
    members: Vec<String>,
    expertise: BTreeSet<String>,
    #[serde(skip)]
    slug: TeamSlug,
}

impl TeamProfile {
    /// Creates a validated team profile
    ///
    /// # Errors
    /// * `ProfileError::MissingName` - name is empty after trimming
    /// * `ProfileError::UnusableName` - name has no characters usable in a slug
    pub fn new<I, S>(
        name: impl Into<String>,
        lead: impl Into<String>,
        members: Vec<String>,
        expertise: I,
    ) -> Result<Self, ProfileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(name.into(), lead.into(), members, expertise, None)
    }

    fn build<I, S>(
        name: String,
        lead: String,
        members: Vec<String>,
        expertise: I,
        origin: Option<String>,
    ) -> Result<Self, ProfileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ProfileError::MissingName {
                origin: origin.unwrap_or_else(|| "<unknown>".to_string()),
            });
        }

        let slug = TeamSlug::from_name(&name).ok_or_else(|| ProfileError::UnusableName(name.clone()))?;

        let members = members
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        let expertise = expertise
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();

        Ok(Self {
            name,
            lead: lead.trim().to_string(),
            members,
            expertise,
            slug,
        })
    }

    /// Returns the team's unique name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the team lead
    pub fn lead(&self) -> &str {
        &self.lead
    }

    /// Returns the members in declared order
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns the lowercase expertise tags
    pub fn expertise(&self) -> &BTreeSet<String> {
        &self.expertise
    }

    /// Returns the slug used to build task ids
    pub fn slug(&self) -> &TeamSlug {
        &self.slug
    }

    /// Checks whether the team declares the given (lowercase) tag
    pub fn has_expertise(&self, tag: &str) -> bool {
        self.expertise.contains(tag)
    }
}

impl TryFrom<TeamProfileRecord> for TeamProfile {
    type Error = ProfileError;

    fn try_from(record: TeamProfileRecord) -> Result<Self, Self::Error> {
        Self::build(
            record.name,
            record.lead,
            record.members,
            record.expertise,
            record.origin,
        )
    }
}
