// Relevance scoring
//
// Every score delta comes from an entry in `ScoringRules`, so a score can be
// explained rule by rule and each rule tested on its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::team::TeamProfile;

/// Bonus granted when the incident mentions one of `keywords` and the team
/// declares at least one of `tags`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordBonus {
    pub name: String,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub points: u32,
}

/// Table of score deltas used to rate an incident against a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Team name appears in the description
    pub team_name_points: u32,
    /// Per expertise tag (or alias of it) appearing in the description
    pub expertise_points: u32,
    /// Extra words that count as a mention of a tag
    pub expertise_aliases: BTreeMap<String, Vec<String>>,
    pub keyword_bonuses: Vec<KeywordBonus>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        let aliases: &[(&str, &[&str])] = &[
            ("backend", &["api", "database", "server"]),
            (
                "infrastructure",
                &["deployment", "scaling", "uptime", "outage", "unavailable", "server"],
            ),
            ("database", &["sql", "migration", "cache", "redis"]),
            (
                "security",
                &["vulnerability", "authentication", "encryption", "breach"],
            ),
            ("frontend", &["ui", "ux", "dashboard", "mobile", "responsive"]),
            (
                "performance",
                &["latency", "optimization", "rate limiting", "slow"],
            ),
            ("monitoring", &["alert", "logging", "metrics"]),
        ];

        Self {
            team_name_points: 20,
            expertise_points: 10,
            expertise_aliases: aliases
                .iter()
                .map(|(tag, words)| {
                    (
                        tag.to_string(),
                        words.iter().map(|w| w.to_string()).collect(),
                    )
                })
                .collect(),
            keyword_bonuses: vec![
                KeywordBonus::new("outage", &["outage", "down"], &["infrastructure", "backend"], 15),
                KeywordBonus::new("security", &["security", "breach"], &["security"], 20),
                KeywordBonus::new(
                    "performance",
                    &["performance", "slow"],
                    &["performance", "database"],
                    15,
                ),
            ],
        }
    }
}

impl KeywordBonus {
    pub fn new(name: &str, keywords: &[&str], tags: &[&str], points: u32) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            points,
        }
    }
}

/// Why points were awarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ScoreReason {
    TeamNameMentioned,
    ExpertiseMatched { tag: String, matched: String },
    KeywordBonus { name: String, keyword: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreContribution {
    pub reason: ScoreReason,
    pub points: u32,
}

/// How strongly an incident concerns a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelevanceTier {
    /// Score 0
    None,
    /// Score 1-9
    Low,
    /// Score 10-19
    Medium,
    /// Score 20 and above
    High,
}

/// Relevance score with the rules that produced it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelevanceScore {
    pub contributions: Vec<ScoreContribution>,
}

impl RelevanceScore {
    pub fn total(&self) -> u32 {
        self.contributions.iter().map(|c| c.points).sum()
    }

    pub fn tier(&self) -> RelevanceTier {
        match self.total() {
            0 => RelevanceTier::None,
            1..=9 => RelevanceTier::Low,
            10..=19 => RelevanceTier::Medium,
            _ => RelevanceTier::High,
        }
    }
}

impl ScoringRules {
    /// Scores an incident description against a team profile
    ///
    /// Matching is case-insensitive substring matching, except that words of
    /// three characters or fewer must stand alone. Rules accumulate and the
    /// result has no upper bound.
    pub fn score(&self, profile: &TeamProfile, description: &str) -> RelevanceScore {
        let text = description.to_lowercase();
        let mut contributions = Vec::new();

        if mentions(&text, &profile.name().to_lowercase()) {
            contributions.push(ScoreContribution {
                reason: ScoreReason::TeamNameMentioned,
                points: self.team_name_points,
            });
        }

        for tag in profile.expertise() {
            if let Some(matched) = self.tag_mention(tag, &text) {
                contributions.push(ScoreContribution {
                    reason: ScoreReason::ExpertiseMatched {
                        tag: tag.clone(),
                        matched,
                    },
                    points: self.expertise_points,
                });
            }
        }

        for bonus in &self.keyword_bonuses {
            if !bonus.tags.iter().any(|t| profile.has_expertise(&t.to_lowercase())) {
                continue;
            }
            if let Some(keyword) = bonus
                .keywords
                .iter()
                .find(|k| mentions(&text, &k.to_lowercase()))
            {
                contributions.push(ScoreContribution {
                    reason: ScoreReason::KeywordBonus {
                        name: bonus.name.clone(),
                        keyword: keyword.clone(),
                    },
                    points: bonus.points,
                });
            }
        }

        RelevanceScore { contributions }
    }

    /// Returns the first word (tag first, then aliases) that mentions `tag`
    fn tag_mention(&self, tag: &str, text: &str) -> Option<String> {
        if mentions(text, tag) {
            return Some(tag.to_string());
        }
        self.expertise_aliases
            .get(tag)
            .into_iter()
            .flatten()
            .find(|alias| mentions(text, &alias.to_lowercase()))
            .cloned()
    }
}

/// Whether lowercase `text` mentions lowercase `word`
///
/// Short words must stand alone ("ui" inside "build" is not a mention).
pub fn mentions(text: &str, word: &str) -> bool {
    if word.chars().count() > 3 {
        return text.contains(word);
    }
    text.split(|c: char| !c.is_alphanumeric()).any(|token| token == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, tags: &[&str]) -> TeamProfile {
        TeamProfile::new(name, "Lead", vec![], tags.iter().copied()).unwrap()
    }

    fn bare_rules() -> ScoringRules {
        ScoringRules {
            expertise_aliases: BTreeMap::new(),
            keyword_bonuses: vec![],
            ..ScoringRules::default()
        }
    }

    #[test]
    fn team_name_mention_scores_twenty() {
        let score = bare_rules().score(&team("Payments", &[]), "PAYMENTS are failing");
        assert_eq!(score.total(), 20);
        assert_eq!(score.contributions[0].reason, ScoreReason::TeamNameMentioned);
    }

    #[test]
    fn each_matching_tag_scores_ten() {
        let profile = team("Core", &["database", "cache", "frontend"]);
        let score = bare_rules().score(&profile, "Database cache stampede");
        assert_eq!(score.total(), 20);
    }

    #[test]
    fn alias_counts_as_tag_mention_once() {
        let profile = team("Guard", &["security"]);
        let score = ScoringRules {
            keyword_bonuses: vec![],
            ..ScoringRules::default()
        }
        .score(&profile, "authentication and encryption broken");

        assert_eq!(score.total(), 10);
        assert_eq!(
            score.contributions[0].reason,
            ScoreReason::ExpertiseMatched {
                tag: "security".to_string(),
                matched: "authentication".to_string()
            }
        );
    }

    #[test]
    fn outage_bonus_requires_matching_expertise() {
        let rules = ScoringRules {
            expertise_aliases: BTreeMap::new(),
            ..ScoringRules::default()
        };

        let infra = rules.score(&team("Ops", &["infrastructure"]), "site is down");
        assert_eq!(infra.total(), 15);

        let design = rules.score(&team("Design", &["ux"]), "site is down");
        assert_eq!(design.total(), 0);
    }

    #[test]
    fn bonuses_accumulate() {
        let rules = ScoringRules::default();
        let profile = team("Security", &["security"]);
        // name +20, tag +10, security bonus +20
        let score = rules.score(&profile, "Security breach in login");
        assert_eq!(score.total(), 50);
        assert_eq!(score.tier(), RelevanceTier::High);
    }

    #[test]
    fn short_aliases_need_word_boundaries() {
        let rules = ScoringRules::default();
        let web = team("Web", &["frontend"]);

        let unrelated = rules.score(&web, "CI build pipeline failing on linux runners");
        assert_eq!(unrelated.total(), 0);

        let related = rules.score(&web, "Checkout UI renders blank");
        assert_eq!(
            related.contributions[0].reason,
            ScoreReason::ExpertiseMatched {
                tag: "frontend".to_string(),
                matched: "ui".to_string()
            }
        );
    }

    #[test]
    fn short_team_name_must_stand_alone() {
        let ops = team("Ops", &[]);
        assert_eq!(bare_rules().score(&ops, "Ops paged twice").total(), 20);
        assert_eq!(bare_rules().score(&ops, "Cron job stops silently").total(), 0);
    }

    #[test]
    fn tiers_follow_score_bands() {
        let mk = |points| RelevanceScore {
            contributions: vec![ScoreContribution {
                reason: ScoreReason::TeamNameMentioned,
                points,
            }],
        };

        assert_eq!(RelevanceScore::default().tier(), RelevanceTier::None);
        assert_eq!(mk(1).tier(), RelevanceTier::Low);
        assert_eq!(mk(9).tier(), RelevanceTier::Low);
        assert_eq!(mk(10).tier(), RelevanceTier::Medium);
        assert_eq!(mk(19).tier(), RelevanceTier::Medium);
        assert_eq!(mk(20).tier(), RelevanceTier::High);
    }

    #[test]
    fn reference_scenario_scores() {
        let rules = ScoringRules::default();
        let description = "Production database outage affecting authentication";

        let backend = team("Backend", &["backend", "infrastructure", "database"]);
        let security = team("Security", &["security"]);
        let frontend = team("Frontend", &["frontend"]);

        assert_eq!(rules.score(&backend, description).total(), 45);
        assert_eq!(rules.score(&security, description).total(), 10);
        assert_eq!(rules.score(&frontend, description).total(), 0);
    }

    #[test]
    fn score_never_drops_when_text_is_added() {
        let rules = ScoringRules::default();
        let profile = team("Backend", &["backend", "database", "performance"]);
        let fragments = [
            "users report errors",
            " on the api",
            " and the database is slow",
            " after an outage",
            " backend team paged",
        ];

        let mut description = String::new();
        let mut previous = 0;
        for fragment in fragments {
            description.push_str(fragment);
            let total = rules.score(&profile, &description).total();
            assert!(total >= previous, "score dropped after {fragment:?}");
            previous = total;
        }
        assert!(previous > 0);
    }
}
