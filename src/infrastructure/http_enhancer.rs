use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::agents::enhancer::{
    EnhancementCandidate, EnhancementRequest, Enhancer, MAX_ENHANCED_TASKS,
};
use crate::agents::errors::EnhancementError;
use crate::agents::prompts::{library, PromptTemplate};
use crate::config::EnhancerConfig;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Enhancer backed by an OpenAI-compatible chat-completions endpoint
///
/// One request per call, no retries. The caller bounds the call with its own
/// timeout.
pub struct HttpEnhancer {
    config: EnhancerConfig,
    template: PromptTemplate,
    http_client: reqwest::Client,
}

impl HttpEnhancer {
    pub fn new(config: EnhancerConfig) -> Self {
        Self {
            config,
            template: library::task_enhancement(),
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.api_url)
    }

    fn build_request_body(&self, request: &EnhancementRequest) -> ChatRequest {
        let existing_tasks = if request.existing_tasks.is_empty() {
            "- none".to_string()
        } else {
            request
                .existing_tasks
                .iter()
                .map(|task| {
                    format!(
                        "- {} (importance {}, {}h)",
                        task.description, task.importance, task.estimated_hours
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let variables: HashMap<String, String> = [
            ("incident", request.incident_description.clone()),
            ("team", request.team_name.clone()),
            ("expertise", request.expertise.join(", ")),
            ("existing_tasks", existing_tasks),
            ("limit", MAX_ENHANCED_TASKS.to_string()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.template.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: self.template.render(&variables),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl Enhancer for HttpEnhancer {
    async fn suggest(
        &self,
        request: &EnhancementRequest,
    ) -> Result<Vec<EnhancementCandidate>, EnhancementError> {
        let body = self.build_request_body(request);
        debug!(
            team = %request.team_name,
            prompt = %self.template.name,
            version = %self.template.version,
            "requesting task suggestions"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EnhancementError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnhancementError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnhancementError::Malformed(e.to_string()))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EnhancementError::Malformed("no choices in reply".to_string()))?;

        parse_candidates(&content)
    }
}

/// Extract the JSON array of candidates from a model reply
///
/// Models often wrap the array in prose or a code fence. Each `[` is tried in
/// turn and the first array that is empty or holds objects wins, so bracketed
/// prose such as "[2]" is passed over. Elements that do not form a candidate
/// are dropped one by one.
pub fn parse_candidates(content: &str) -> Result<Vec<EnhancementCandidate>, EnhancementError> {
    let elements = content
        .match_indices('[')
        .find_map(|(start, _)| {
            serde_json::Deserializer::from_str(&content[start..])
                .into_iter::<Vec<Value>>()
                .next()
                .and_then(Result::ok)
                .filter(|elements| elements.is_empty() || elements.iter().any(Value::is_object))
        })
        .ok_or_else(|| {
            EnhancementError::Malformed("reply does not contain a JSON array".to_string())
        })?;

    Ok(elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| {
            serde_json::from_value::<EnhancementCandidate>(element)
                .map_err(|err| debug!(index, error = %err, "dropping unusable candidate"))
                .ok()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskSummary;
    use rust_decimal::Decimal;

    fn enhancer() -> HttpEnhancer {
        HttpEnhancer::new(EnhancerConfig {
            api_key: "sk-test".to_string(),
            api_url: "http://localhost:11434".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            max_tokens: 512,
        })
    }

    fn request() -> EnhancementRequest {
        EnhancementRequest {
            team_name: "Backend".to_string(),
            incident_description: "Database outage".to_string(),
            expertise: vec!["backend".to_string(), "database".to_string()],
            existing_tasks: vec![TaskSummary {
                description: "Analyze slow queries".to_string(),
                importance: 7,
                estimated_hours: Decimal::new(15, 1),
            }],
        }
    }

    #[test]
    fn request_body_matches_chat_completions_format() {
        let json = serde_json::to_value(enhancer().build_request_body(&request())).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["max_tokens"], 512);

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");

        let prompt = messages[1]["content"].as_str().unwrap();
        assert!(prompt.contains("Incident: Database outage"));
        assert!(prompt.contains("Team expertise: backend, database"));
        assert!(prompt.contains("- Analyze slow queries (importance 7, 1.5h)"));
    }

    #[test]
    fn endpoint_appends_chat_completions_path() {
        assert_eq!(
            enhancer().endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn parses_fenced_array() {
        let content = "Here you go:\n```json\n[{\"description\": \"Rotate credentials\", \
                       \"importance\": 8, \"estimated_hours\": 1.5, \"justification\": \"leak\"}]\n```";

        let candidates = parse_candidates(content).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].description, "Rotate credentials");
        assert_eq!(candidates[0].importance, 8);
        assert_eq!(candidates[0].estimated_hours, Decimal::new(15, 1));
        assert_eq!(candidates[0].justification.as_deref(), Some("leak"));
    }

    #[test]
    fn missing_fields_default() {
        let candidates = parse_candidates("[{\"description\": \"Check backups\"}]").unwrap();
        assert_eq!(candidates[0].importance, 0);
        assert_eq!(candidates[0].estimated_hours, Decimal::ZERO);
    }

    #[test]
    fn unusable_elements_are_dropped_individually() {
        let content = r#"[
            {"description": "Rotate credentials", "importance": 7.0, "estimated_hours": 1},
            {"description": "Page the vendor", "importance": "high"},
            {"description": null, "importance": 5},
            {"description": "Halve the cache TTL", "importance": 6.5},
            "not a candidate"
        ]"#;

        let candidates = parse_candidates(content).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].description, "Rotate credentials");
        assert_eq!(candidates[0].importance, 7);
        assert_eq!(candidates[1].description, "");
        assert_eq!(candidates[1].importance, 5);
    }

    #[test]
    fn bracketed_prose_before_the_array_is_skipped() {
        let content = "Here are [2] ideas:\n[{\"description\": \"Drain the queue\", \"importance\": 6}, \
                       {\"description\": \"Notify support\", \"importance\": 3}]\nGood luck [team].";

        let candidates = parse_candidates(content).unwrap();

        let descriptions: Vec<_> = candidates.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Drain the queue", "Notify support"]);
    }

    #[test]
    fn empty_array_means_no_suggestions() {
        assert!(parse_candidates("Nothing to add: []").unwrap().is_empty());
    }

    #[test]
    fn reply_without_array_is_malformed() {
        assert!(matches!(
            parse_candidates("I cannot help with that."),
            Err(EnhancementError::Malformed(_))
        ));
        assert!(matches!(
            parse_candidates("[not json]"),
            Err(EnhancementError::Malformed(_))
        ));
        assert!(matches!(
            parse_candidates("See [1] and [2]."),
            Err(EnhancementError::Malformed(_))
        ));
    }
}
