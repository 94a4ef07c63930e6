/*!
 * Prompt template for document translation.
 */

use anyhow::Result;

use crate::app_config::Config;
use crate::language_utils::get_language_name;

/// Marker preceding the document body in every prompt
pub const CONTENT_MARKER: &str = "File Content:";

/// Builds the fixed translation prompt for one document
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    source_language: String,
    target_language: String,
    project_name: String,
    project_description: String,
    glossary: Vec<String>,
    tone: String,
}

impl PromptBuilder {
    /// Create a builder from the loaded configuration, resolving language names
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            source_language: get_language_name(&config.source_language)?,
            target_language: get_language_name(&config.target_language)?,
            project_name: config.prompt.project_name.clone(),
            project_description: config.prompt.project_description.clone(),
            glossary: config.prompt.glossary.clone(),
            tone: config.prompt.tone.clone(),
        })
    }

    /// Project context block with the do-not-translate glossary
    pub fn context_block(&self) -> String {
        let mut block = format!(
            "Project Context: \"{}\" - {}\n",
            self.project_name, self.project_description
        );

        if !self.glossary.is_empty() {
            block.push_str("\nGLOSSARY (DO NOT TRANSLATE THESE):\n");
            for term in &self.glossary {
                block.push_str("- ");
                block.push_str(term);
                block.push('\n');
            }
        }
        block
    }

    /// Render the full prompt for `text`
    pub fn build(&self, text: &str) -> String {
        let mut rules = vec![
            "KEEP all Markdown syntax (tables, links, code blocks, bold/italic) EXACTLY as is.".to_string(),
            "DO NOT translate code blocks or inline code (`const x = 1`).".to_string(),
        ];
        if !self.glossary.is_empty() {
            rules.push("DO NOT translate the glossary terms listed above.".to_string());
        }
        rules.push(format!("Tone: {}", self.tone));
        rules.push("Output ONLY the translated markdown.".to_string());

        let numbered: Vec<String> = rules.iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {}", i + 1, rule))
            .collect();

        format!(
            "Role: Senior Technical Translator ({source} -> {target}).\n\
             Task: Translate the Markdown documentation for the \"{project}\" project.\n\
             \n\
             {context}\n\
             STRICT RULES:\n\
             {rules}\n\
             \n\
             {marker}\n\
             {text}",
            source = self.source_language,
            target = self.target_language,
            project = self.project_name,
            context = self.context_block(),
            rules = numbered.join("\n"),
            marker = CONTENT_MARKER,
            text = text,
        )
    }
}
