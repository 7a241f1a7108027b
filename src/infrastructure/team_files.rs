use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::agents::scoring::mentions;
use crate::domain::repositories::{ProfileSourceError, TeamProfileSource};
use crate::domain::team::TeamProfileRecord;

/// Expertise areas and the words in a team file that reveal them
const EXPERTISE_VOCABULARY: &[(&str, &[&str])] = &[
    ("security", &["security", "vulnerability", "authentication", "encryption"]),
    ("frontend", &["frontend", "ui", "ux", "dashboard", "mobile", "responsive"]),
    ("backend", &["backend", "api", "database", "server", "infrastructure"]),
    ("infrastructure", &["infrastructure", "deployment", "scaling", "monitoring", "uptime"]),
    ("database", &["database", "migration", "sql", "cache", "redis"]),
    ("performance", &["performance", "optimization", "scaling", "rate limiting"]),
    ("monitoring", &["monitoring", "alerts", "logging", "metrics"]),
];

/// Team profiles stored as plain text files in one directory
///
/// Every `*.txt` file is one team:
///
/// ```text
/// Team Name: Backend
/// Team Lead: Alice Chen
/// Members: Bob, Carol, Dave
///
/// Responsibilities: API servers, database migrations, ...
/// ```
///
/// Expertise is not declared; it is identified by scanning the whole file for
/// the vocabulary of each area.
#[derive(Debug, Clone)]
pub struct FileTeamProfileSource {
    dir: PathBuf,
}

impl FileTeamProfileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn team_files(&self) -> Result<Vec<PathBuf>, ProfileSourceError> {
        let unavailable = |err: std::io::Error| ProfileSourceError::Unavailable {
            location: self.dir.display().to_string(),
            reason: err.to_string(),
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(unavailable)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl TeamProfileSource for FileTeamProfileSource {
    async fn load_profiles(&self) -> Result<Vec<TeamProfileRecord>, ProfileSourceError> {
        let files = self.team_files().await?;
        let mut records = Vec::with_capacity(files.len());

        for path in files {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    let origin = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    let record = parse_team_file(&content, origin);
                    debug!(file = ?path, team = %record.name, expertise = ?record.expertise, "parsed team file");
                    records.push(record);
                }
                Err(err) => {
                    warn!(file = ?path, error = %err, "skipping unreadable team file");
                }
            }
        }

        info!(dir = %self.dir.display(), count = records.len(), "loaded team profiles");
        Ok(records)
    }
}

/// Parse one team file into an unvalidated record
pub fn parse_team_file(content: &str, origin: impl Into<String>) -> TeamProfileRecord {
    let members = field(content, "Members:")
        .map(|list| {
            list.split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect()
        })
        .unwrap_or_default();

    TeamProfileRecord {
        name: field(content, "Team Name:").unwrap_or_default().to_string(),
        lead: field(content, "Team Lead:").unwrap_or_default().to_string(),
        members,
        expertise: identify_expertise(content),
        origin: Some(origin.into()),
    }
}

/// Value of the first line carrying `label`
fn field<'a>(content: &'a str, label: &str) -> Option<&'a str> {
    content
        .lines()
        .find_map(|line| line.split_once(label).map(|(_, value)| value.trim()))
        .filter(|value| !value.is_empty())
}

/// Expertise areas whose vocabulary appears in the content, in vocabulary order
pub fn identify_expertise(content: &str) -> Vec<String> {
    let text = content.to_lowercase();
    EXPERTISE_VOCABULARY
        .iter()
        .filter(|(_, words)| words.iter().any(|word| mentions(&text, word)))
        .map(|(area, _)| area.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const BACKEND: &str = "Team Name: Backend\n\
                           Team Lead: Alice Chen\n\
                           Members: Bob, Carol , ,Dave\n\
                           \n\
                           We own the REST API servers and run database migrations.\n";

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("team-files-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_header_fields() {
        let record = parse_team_file(BACKEND, "backend.txt");

        assert_eq!(record.name, "Backend");
        assert_eq!(record.lead, "Alice Chen");
        assert_eq!(record.members, vec!["Bob", "Carol", "Dave"]);
        assert_eq!(record.origin.as_deref(), Some("backend.txt"));
    }

    #[test]
    fn identifies_expertise_from_vocabulary() {
        let record = parse_team_file(BACKEND, "backend.txt");
        assert_eq!(record.expertise, vec!["backend", "database"]);
    }

    #[test]
    fn short_words_need_word_boundaries() {
        assert!(identify_expertise("We build guides").is_empty());
        assert_eq!(identify_expertise("Owns the UI kit"), vec!["frontend"]);
    }

    #[test]
    fn missing_fields_stay_empty() {
        let record = parse_team_file("Just some notes", "notes.txt");
        assert!(record.name.is_empty());
        assert!(record.lead.is_empty());
        assert!(record.members.is_empty());
    }

    #[tokio::test]
    async fn loads_txt_files_in_name_order() {
        let dir = temp_dir();
        std::fs::write(dir.join("b_security.txt"), "Team Name: Security\nMembers: Eve\nEncryption reviews").unwrap();
        std::fs::write(dir.join("a_backend.txt"), BACKEND).unwrap();
        std::fs::write(dir.join("readme.md"), "Team Name: Ignored").unwrap();

        let records = FileTeamProfileSource::new(&dir).load_profiles().await.unwrap();

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Backend", "Security"]);
        assert_eq!(records[1].expertise, vec!["security"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join(format!("team-files-missing-{}", Uuid::new_v4()));
        let result = FileTeamProfileSource::new(&dir).load_profiles().await;
        assert!(matches!(result, Err(ProfileSourceError::Unavailable { .. })));
    }
}
