use serde::{Deserialize, Serialize};
use std::fmt;

/// URL- and id-safe form of a team name
///
/// # Invariants
/// - Only lowercase ASCII alphanumerics and single `-` separators
/// - Never empty, never starts or ends with `-`
///
/// # Example
/// ```
/// use incident_coordinator::domain::team::value_objects::TeamSlug;
///
/// let slug = TeamSlug::from_name("Platform / SRE Team").expect("usable name");
/// assert_eq!(slug.as_str(), "platform-sre-team");
/// assert_eq!(slug.task_id(3), "platform-sre-team_3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamSlug(String);

impl TeamSlug {
    /// Derives a slug from a team name
    ///
    /// Letters and digits of any script are kept and lowercased. Returns `None`
    /// when the name has no alphanumeric characters.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_separator = false;

        for ch in name.chars() {
            if ch.is_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.extend(ch.to_lowercase());
            } else {
                pending_separator = true;
            }
        }

        if slug.is_empty() {
            None
        } else {
            Some(TeamSlug(slug))
        }
    }

    /// Returns the slug as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the task id for the given 1-based sequence number
    pub fn task_id(&self, sequence: usize) -> String {
        format!("{}_{}", self.0, sequence)
    }
}

impl fmt::Display for TeamSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_joins_words() {
        let slug = TeamSlug::from_name("Backend Team").unwrap();
        assert_eq!(slug.as_str(), "backend-team");
    }

    #[test]
    fn slug_collapses_separator_runs() {
        let slug = TeamSlug::from_name("  Data -- Platform__Ops ").unwrap();
        assert_eq!(slug.as_str(), "data-platform-ops");
    }

    #[test]
    fn slug_keeps_accented_letters() {
        let slug = TeamSlug::from_name("Équipe Réseau").unwrap();
        assert_eq!(slug.as_str(), "équipe-réseau");
    }

    #[test]
    fn slug_of_non_latin_name_is_usable() {
        let slug = TeamSlug::from_name("Команда Базы").unwrap();
        assert_eq!(slug.as_str(), "команда-базы");
        assert_eq!(slug.task_id(2), "команда-базы_2");
    }

    #[test]
    fn slug_of_punctuation_only_name_is_none() {
        assert!(TeamSlug::from_name("!!! ---").is_none());
        assert!(TeamSlug::from_name("").is_none());
    }

    #[test]
    fn task_id_concatenates_sequence() {
        let slug = TeamSlug::from_name("Security").unwrap();
        assert_eq!(slug.task_id(1), "security_1");
        assert_eq!(slug.task_id(12), "security_12");
    }

    #[test]
    fn slug_display() {
        let slug = TeamSlug::from_name("Frontend").unwrap();
        assert_eq!(slug.to_string(), "frontend");
    }
}
