//! Prompt Builder
//!
//! Standardized prompt construction for provider calls. Sections render in
//! insertion order, so the same inputs always yield the same prompt text.

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Context as ordered key-value pairs
    Context(Vec<(String, String)>),
    /// Text section under a header
    Text {
        header: String,
        content: String,
    },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives(mut self, objectives: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add a context item to the first context section, creating it if needed
    ///
    /// Setting an existing key replaces its value in place.
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let existing = self.sections.iter_mut().find_map(|section| match section {
            PromptSection::Context(items) => Some(items),
            _ => None,
        });

        match existing {
            Some(items) => match items.iter_mut().find(|(k, _)| k == key) {
                Some(item) => item.1 = value.to_string(),
                None => items.push((key.to_string(), value.to_string())),
            },
            None => self.sections.push(PromptSection::Context(vec![(
                key.to_string(),
                value.to_string(),
            )])),
        }
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: header.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add focus enforcement section
    pub fn focus(mut self, target: &str, restrictions: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.into_iter().map(String::from).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    prompt.push_str(&format!("# {}\n\n", header));
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    prompt.push_str(&format!("IMPORTANT: Focus EXCLUSIVELY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("business consultant", "retail plans")
            .objectives(vec!["Pick an idea", "Write the plan"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("business consultant"));
        assert!(prompt.contains("1. Pick an idea"));
        assert!(prompt.contains("2. Write the plan"));
    }

    #[test]
    fn test_context_items_keep_order() {
        let prompt = PromptBuilder::new()
            .context_item("Skills", "baking")
            .context_item("Budget", "$500")
            .context_item("Interests", "food")
            .build();

        let skills = prompt.find("**Skills**").unwrap();
        let budget = prompt.find("**Budget**").unwrap();
        let interests = prompt.find("**Interests**").unwrap();
        assert!(skills < budget && budget < interests);
    }

    #[test]
    fn test_context_item_replaces_existing_key() {
        let prompt = PromptBuilder::new()
            .context_item("Budget", "$500")
            .context_item("Budget", "$900")
            .build();

        assert!(prompt.contains("**Budget**: $900"));
        assert!(!prompt.contains("$500"));
    }

    #[test]
    fn test_focus_and_sections() {
        let prompt = PromptBuilder::new()
            .section("Format", "Use headings")
            .focus("one idea", vec!["Do NOT list alternatives"])
            .build();

        assert!(prompt.contains("# Format\n\nUse headings"));
        assert!(prompt.contains("<FOCUS>"));
        assert!(prompt.contains("- Do NOT list alternatives"));
        assert!(!prompt.ends_with('\n'));
    }
}
