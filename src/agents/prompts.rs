// Prompt templates for the enhancement collaborator
//
// Templates are versioned so a change in wording shows up in the logs next
// to the suggestions it produced.

use std::collections::HashMap;

/// Prompt template structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    pub system: String,
    pub user_template: String,
}

impl PromptTemplate {
    /// Render the user template with variables
    ///
    /// Every `{{key}}` placeholder is replaced by its value. Placeholders
    /// without a value are left untouched.
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        let mut rendered = String::with_capacity(self.user_template.len());
        let mut rest = self.user_template.as_str();

        while let Some(start) = rest.find("{{") {
            rendered.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            match after_open.find("}}") {
                Some(end) => {
                    let key = after_open[..end].trim();
                    match variables.get(key) {
                        Some(value) => rendered.push_str(value),
                        None => rendered.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after_open[end + 2..];
                }
                None => {
                    rendered.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        rendered.push_str(rest);
        rendered
    }
}

pub mod library {
    use super::PromptTemplate;

    pub fn task_enhancement() -> PromptTemplate {
        PromptTemplate {
            name: "task_enhancement".to_string(),
            version: "1.0.0".to_string(),
            system: "You are an incident response lead helping one team plan its work. \
                     Reply with a JSON array only, no prose."
                .to_string(),
            user_template: "Incident: {{incident}}\n\
                            Team: {{team}}\n\
                            Team expertise: {{expertise}}\n\n\
                            Tasks already planned:\n\
                            {{existing_tasks}}\n\n\
                            Suggest up to {{limit}} additional tasks this team should perform. \
                            Do not repeat planned tasks. For each task provide an object with:\n\
                            - \"description\" (one sentence)\n\
                            - \"importance\" (integer 1-11, 11 is most urgent)\n\
                            - \"estimated_hours\" (number)\n\
                            - \"justification\" (why this task matters for the incident)"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn template(text: &str) -> PromptTemplate {
        PromptTemplate {
            name: "t".to_string(),
            version: "0".to_string(),
            system: String::new(),
            user_template: text.to_string(),
        }
    }

    #[test]
    fn substitutes_known_placeholders() {
        let rendered = template("Team {{team}} handles {{ incident }}.")
            .render(&vars(&[("team", "Ops"), ("incident", "the outage")]));
        assert_eq!(rendered, "Team Ops handles the outage.");
    }

    #[test]
    fn leaves_unknown_and_unterminated_placeholders() {
        let rendered = template("{{missing}} and {{open").render(&vars(&[]));
        assert_eq!(rendered, "{{missing}} and {{open");
    }

    #[test]
    fn enhancement_template_mentions_every_variable() {
        let template = library::task_enhancement();
        let rendered = template.render(&vars(&[
            ("incident", "Database outage"),
            ("team", "Backend"),
            ("expertise", "backend, database"),
            ("existing_tasks", "- Analyze slow queries"),
            ("limit", "3"),
        ]));

        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("Database outage"));
        assert!(rendered.contains("up to 3 additional tasks"));
    }
}
