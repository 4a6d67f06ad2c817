use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use storytime_clients::LlmClient;

use crate::{prompts, Agent, Character, GenerationError, Prompt, ToolCall, CHAPTER_COUNT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryChaptersTool {
    pub chapters: Vec<String>,
}

impl ToolCall for StoryChaptersTool {
    const NAME: &'static str = "write_story_chapters";
    const DESCRIPTION: &'static str = "Write the full text of every chapter of the story, in order.";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "chapters": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["chapters"],
            "additionalProperties": false
        })
    }
}

#[derive(Debug, Clone)]
pub struct StoryChaptersRequest {
    pub title: String,
    pub character: Character,
}

#[derive(Clone)]
pub struct StoryChaptersAgent {
    llm_client: LlmClient,
}

impl StoryChaptersAgent {
    pub fn new(llm_client: LlmClient) -> Self {
        Self { llm_client }
    }
}

fn normalize_chapters(chapters: Vec<String>) -> Result<Vec<String>, GenerationError> {
    let chapters = chapters.into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .take(CHAPTER_COUNT)
        .collect::<Vec<_>>();

    if chapters.is_empty() {
        return Err(GenerationError::InvalidResponse("The model returned no chapters".to_string()));
    }
    Ok(chapters)
}

#[async_trait::async_trait]
impl Agent for StoryChaptersAgent {
    const NAME: &'static str = "story_chapters_v0";
    type Tool = StoryChaptersTool;
    type Input = StoryChaptersRequest;
    type Output = Vec<String>;

    fn system_prompt() -> &'static str { prompts::STORY_CHAPTERS_SYSTEM_PROMPT }
    fn temperature() -> f32 { 0.7 }
    fn max_tokens() -> u32 { 3000 }

    fn llm_client(&self) -> &LlmClient { &self.llm_client }

    fn build_input(&self, input: &Self::Input) -> Result<Vec<Prompt>, GenerationError> {
        if input.title.trim().is_empty() {
            return Err(GenerationError::MissingInput("Story title is required".to_string()));
        }
        Ok(vec![
            Prompt::new_system(Self::system_prompt()),
            Prompt::new_user(&prompts::story_chapters_prompt(input.title.trim(), &input.character)),
        ])
    }

    fn handle_output(&self, _input: &Self::Input, tool: Self::Tool) -> Result<Self::Output, GenerationError> {
        normalize_chapters(tool.chapters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_than_ten_chapters_are_truncated() {
        let chapters = (1..=12).map(|i| format!("Capítulo {i}")).collect();
        let chapters = normalize_chapters(chapters).unwrap();
        assert_eq!(chapters.len(), CHAPTER_COUNT);
        assert_eq!(chapters.last().unwrap(), "Capítulo 10");
    }

    #[test]
    fn empty_chapters_are_removed() {
        let chapters = normalize_chapters(vec!["".into(), " Era uma vez ".into()]).unwrap();
        assert_eq!(chapters, vec!["Era uma vez".to_string()]);
        assert!(normalize_chapters(vec!["  ".into()]).is_err());
    }

    #[test]
    fn schema_requires_chapters() {
        let function = StoryChaptersTool::to_function_object();
        assert_eq!(function.name, "write_story_chapters");
        assert_eq!(function.parameters.unwrap()["required"][0], "chapters");
    }
}
