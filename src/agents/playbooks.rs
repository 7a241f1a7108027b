// Expertise playbooks
//
// Rule tables the proposal agent draws its deterministic tasks from. Each
// playbook is keyed by the expertise tags it serves and only applies when the
// incident mentions one of its trigger words. Dependency hints name the key of
// an earlier entry in the same playbook (or generic list), so any prefix of a
// selection keeps its prerequisites.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::scoring::mentions;

/// Placeholder replaced by the team name in descriptions
pub const TEAM_PLACEHOLDER: &str = "{team}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybookEntry {
    /// Identifies the entry for dependency hints
    pub key: String,
    /// Description template, may contain `{team}`
    pub description: String,
    /// Added to the tier's base importance
    pub importance_offset: u32,
    pub estimated_hours: Decimal,
    /// Hours before the incident deadline the task should be done by
    #[serde(default)]
    pub lead_hours: Option<i64>,
    /// Keys of entries this one depends on, or literal task ids
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Words that must appear in the incident; empty means always applicable
    #[serde(default)]
    pub triggers: Vec<String>,
}

impl PlaybookEntry {
    pub fn new(key: &str, description: &str, importance_offset: u32, estimated_hours: i64) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            importance_offset,
            estimated_hours: Decimal::from(estimated_hours),
            lead_hours: None,
            depends_on: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn due_before(mut self, hours: i64) -> Self {
        self.lead_hours = Some(hours);
        self
    }

    pub fn after(mut self, key: &str) -> Self {
        self.depends_on.push(key.to_string());
        self
    }

    pub fn when_mentioned(mut self, words: &[&str]) -> Self {
        self.triggers.extend(words.iter().map(|w| w.to_lowercase()));
        self
    }

    fn triggered_by(&self, text: &str) -> bool {
        self.triggers.is_empty()
            || self.triggers.iter().any(|t| mentions(text, &t.to_lowercase()))
    }

    /// Renders the description for a team
    pub fn describe(&self, team_name: &str) -> String {
        self.description.replace(TEAM_PLACEHOLDER, team_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbook {
    pub name: String,
    /// Expertise tags served by this playbook
    pub tags: Vec<String>,
    /// Words that must appear in the incident; empty means always applicable
    #[serde(default)]
    pub triggers: Vec<String>,
    pub entries: Vec<PlaybookEntry>,
}

impl Playbook {
    fn serves(&self, expertise: &BTreeSet<String>) -> bool {
        self.tags.iter().any(|tag| expertise.contains(tag))
    }

    fn triggered_by(&self, text: &str) -> bool {
        self.triggers.is_empty() || self.triggers.iter().any(|t| mentions(text, t))
    }
}

/// All task rule tables known to the proposal agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbooks {
    /// Expertise playbooks, in the order their entries are gathered
    pub playbooks: Vec<Playbook>,
    /// Padding used when the expertise playbooks yield too few entries
    pub generic: Vec<PlaybookEntry>,
    /// The single task of a low-relevance team
    pub low_relevance: PlaybookEntry,
    /// The placeholder task of a team the incident does not concern
    pub standby: PlaybookEntry,
}

impl Playbooks {
    /// Picks between `min` and `max` entries for a team
    ///
    /// Entries from every applicable playbook come first, in table order.
    /// An entry whose own triggers are not mentioned is skipped, together with
    /// every later entry of its playbook that depends on it. Generic entries
    /// pad the selection up to `min`; anything past `max` is cut from the end.
    pub fn select(
        &self,
        expertise: &BTreeSet<String>,
        description: &str,
        min: usize,
        max: usize,
    ) -> Vec<&PlaybookEntry> {
        let text = description.to_lowercase();

        let mut selected: Vec<&PlaybookEntry> = Vec::new();
        for playbook in self
            .playbooks
            .iter()
            .filter(|playbook| playbook.serves(expertise) && playbook.triggered_by(&text))
        {
            let mut skipped: Vec<&str> = Vec::new();
            for entry in &playbook.entries {
                let blocked = entry
                    .depends_on
                    .iter()
                    .any(|dep| skipped.contains(&dep.as_str()));
                if blocked || !entry.triggered_by(&text) {
                    skipped.push(&entry.key);
                } else {
                    selected.push(entry);
                }
            }
        }

        for entry in &self.generic {
            if selected.len() >= min {
                break;
            }
            if selected.iter().all(|s| s.key != entry.key) {
                selected.push(entry);
            }
        }

        selected.truncate(max);
        selected
    }
}

impl Default for Playbooks {
    fn default() -> Self {
        Self {
            playbooks: vec![
                Playbook {
                    name: "security".to_string(),
                    tags: vec!["security".to_string()],
                    triggers: words(&["security", "breach", "vulnerability", "unauthorized"]),
                    entries: vec![
                        PlaybookEntry::new(
                            "sec.audit",
                            "Conduct immediate security audit of affected systems",
                            3,
                            4,
                        )
                        .due_before(8),
                        PlaybookEntry::new(
                            "sec.access-logs",
                            "Review access logs for suspicious activity",
                            2,
                            3,
                        )
                        .due_before(6)
                        .after("sec.audit"),
                        PlaybookEntry::new(
                            "sec.patch",
                            "Implement security patches and hotfixes",
                            4,
                            6,
                        )
                        .due_before(2)
                        .after("sec.audit"),
                    ],
                },
                Playbook {
                    name: "infrastructure".to_string(),
                    tags: vec!["infrastructure".to_string(), "backend".to_string()],
                    triggers: words(&["outage", "down", "unavailable"]),
                    entries: vec![
                        PlaybookEntry::new(
                            "infra.health",
                            "Check server health and resource utilization",
                            4,
                            2,
                        )
                        .due_before(10),
                        PlaybookEntry::new(
                            "infra.restart",
                            "Restart affected services",
                            5,
                            3,
                        )
                        .due_before(6)
                        .after("infra.health"),
                        PlaybookEntry::new(
                            "infra.connectivity",
                            "Verify connectivity between restarted services",
                            3,
                            2,
                        )
                        .due_before(5)
                        .after("infra.restart"),
                        PlaybookEntry::new("infra.scale", "Scale up resources if needed", 2, 4)
                            .due_before(4)
                            .after("infra.health"),
                    ],
                },
                Playbook {
                    name: "frontend".to_string(),
                    tags: vec!["frontend".to_string()],
                    triggers: words(&["ui", "frontend", "user"]),
                    entries: vec![
                        PlaybookEntry::new(
                            "front.notice",
                            "Display user-facing incident notification",
                            2,
                            2,
                        )
                        .due_before(8),
                        PlaybookEntry::new(
                            "front.degrade",
                            "Implement graceful degradation for affected features",
                            3,
                            5,
                        )
                        .due_before(4),
                    ],
                },
                Playbook {
                    name: "database".to_string(),
                    tags: vec!["database".to_string()],
                    triggers: words(&["database", "data", "slow"]),
                    entries: vec![
                        PlaybookEntry::new(
                            "db.analyze",
                            "Analyze database query performance",
                            3,
                            3,
                        )
                        .due_before(8),
                        PlaybookEntry::new(
                            "db.optimize",
                            "Optimize slow queries and add indexes",
                            4,
                            5,
                        )
                        .due_before(3)
                        .after("db.analyze"),
                        PlaybookEntry::new(
                            "db.restore",
                            "Verify backups and prepare a point-in-time restore",
                            5,
                            4,
                        )
                        .due_before(6)
                        .when_mentioned(&["corruption", "corrupted", "data loss", "lost"]),
                    ],
                },
                Playbook {
                    name: "performance".to_string(),
                    tags: vec!["performance".to_string()],
                    triggers: words(&["performance", "slow", "latency", "timeout"]),
                    entries: vec![
                        PlaybookEntry::new(
                            "perf.profile",
                            "Profile hot paths on the affected services",
                            3,
                            3,
                        )
                        .due_before(8),
                        PlaybookEntry::new(
                            "perf.limit",
                            "Apply rate limiting to shed excess load",
                            4,
                            2,
                        )
                        .due_before(5)
                        .after("perf.profile"),
                    ],
                },
                Playbook {
                    name: "monitoring".to_string(),
                    tags: vec!["monitoring".to_string()],
                    triggers: Vec::new(),
                    entries: vec![PlaybookEntry::new(
                        "mon.dashboards",
                        "Set up focused alerts and dashboards for the incident",
                        2,
                        2,
                    )
                    .due_before(9)],
                },
            ],
            generic: vec![
                PlaybookEntry::new(
                    "generic.investigate",
                    "Investigate incident impact on {team} systems",
                    2,
                    3,
                )
                .due_before(6),
                PlaybookEntry::new(
                    "generic.coordinate",
                    "Coordinate {team} response with the incident lead",
                    1,
                    1,
                ),
                PlaybookEntry::new(
                    "generic.findings",
                    "Document {team} findings for the post-incident review",
                    0,
                    2,
                )
                .after("generic.investigate"),
            ],
            low_relevance: PlaybookEntry::new(
                "support.monitor",
                "Monitor {team} systems for related issues and support responders",
                0,
                2,
            )
            .due_before(4),
            standby: PlaybookEntry::new(
                "support.standby",
                "Stand by and monitor {team} systems for related issues (non-critical support)",
                0,
                2,
            )
            .due_before(4),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn keys(entries: &[&PlaybookEntry]) -> Vec<String> {
        entries.iter().map(|e| e.key.clone()).collect()
    }

    #[test]
    fn dependency_hints_point_to_earlier_entries() {
        let playbooks = Playbooks::default();
        let lists = playbooks
            .playbooks
            .iter()
            .map(|p| &p.entries)
            .chain(std::iter::once(&playbooks.generic));

        for entries in lists {
            for (index, entry) in entries.iter().enumerate() {
                for dep in &entry.depends_on {
                    assert!(
                        entries[..index].iter().any(|e| &e.key == dep),
                        "{} depends on {} which is not an earlier entry",
                        entry.key,
                        dep
                    );
                }
            }
        }
    }

    #[test]
    fn keys_are_unique() {
        let playbooks = Playbooks::default();
        let mut seen = BTreeSet::new();
        for entry in playbooks
            .playbooks
            .iter()
            .flat_map(|p| p.entries.iter())
            .chain(playbooks.generic.iter())
        {
            assert!(seen.insert(entry.key.clone()), "duplicate key {}", entry.key);
        }
    }

    #[test]
    fn backend_and_infrastructure_share_one_playbook() {
        let playbooks = Playbooks::default();
        let selected = playbooks.select(
            &tags(&["backend", "infrastructure"]),
            "API outage",
            3,
            6,
        );

        assert_eq!(
            keys(&selected),
            vec!["infra.health", "infra.restart", "infra.connectivity", "infra.scale"]
        );
    }

    #[test]
    fn untriggered_playbook_is_skipped_and_generic_pads() {
        let playbooks = Playbooks::default();
        let selected = playbooks.select(&tags(&["security"]), "Checkout is broken", 3, 6);

        assert_eq!(
            keys(&selected),
            vec!["generic.investigate", "generic.coordinate", "generic.findings"]
        );
    }

    #[test]
    fn selection_is_truncated_to_max() {
        let playbooks = Playbooks::default();
        let selected = playbooks.select(
            &tags(&["backend", "database", "security"]),
            "security breach caused database outage",
            3,
            6,
        );

        assert_eq!(selected.len(), 6);
        // security playbook comes first in table order
        assert_eq!(selected[0].key, "sec.audit");
    }

    #[test]
    fn medium_selection_keeps_prefix() {
        let playbooks = Playbooks::default();
        let selected = playbooks.select(&tags(&["infrastructure"]), "service down", 2, 3);
        assert_eq!(
            keys(&selected),
            vec!["infra.health", "infra.restart", "infra.connectivity"]
        );
    }

    #[test]
    fn monitoring_playbook_always_applies() {
        let playbooks = Playbooks::default();
        let selected = playbooks.select(&tags(&["monitoring"]), "anything", 1, 6);
        assert_eq!(selected[0].key, "mon.dashboards");
    }

    #[test]
    fn entry_triggers_gate_single_entries() {
        let playbooks = Playbooks::default();
        let database = tags(&["database"]);

        let plain = playbooks.select(&database, "database is slow", 1, 6);
        assert_eq!(keys(&plain), vec!["db.analyze", "db.optimize"]);

        let corrupted = playbooks.select(&database, "database corruption after failover", 1, 6);
        assert_eq!(keys(&corrupted), vec!["db.analyze", "db.optimize", "db.restore"]);
    }

    #[test]
    fn skipped_entry_takes_its_dependents_along() {
        let playbooks = Playbooks {
            playbooks: vec![Playbook {
                name: "cache".to_string(),
                tags: vec!["cache".to_string()],
                triggers: Vec::new(),
                entries: vec![
                    PlaybookEntry::new("cache.flush", "Flush caches", 2, 1).when_mentioned(&["stale"]),
                    PlaybookEntry::new("cache.warm", "Warm caches", 1, 1).after("cache.flush"),
                    PlaybookEntry::new("cache.watch", "Watch hit ratio", 1, 1),
                ],
            }],
            generic: Vec::new(),
            ..Playbooks::default()
        };

        let fresh = playbooks.select(&tags(&["cache"]), "cache misses", 0, 6);
        assert_eq!(keys(&fresh), vec!["cache.watch"]);

        let stale = playbooks.select(&tags(&["cache"]), "stale cache entries", 0, 6);
        assert_eq!(keys(&stale), vec!["cache.flush", "cache.warm", "cache.watch"]);
    }

    #[test]
    fn describe_substitutes_team_name() {
        let playbooks = Playbooks::default();
        assert_eq!(
            playbooks.generic[0].describe("Payments"),
            "Investigate incident impact on Payments systems"
        );
    }
}
