use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use storytime_clients::LlmClient;

use crate::{prompts, Agent, Gender, GenerationError, Prompt, ToolCall};

pub const TITLES_PER_REQUEST: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryTitle {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryTitlesTool {
    pub titles: Vec<StoryTitle>,
}

impl ToolCall for StoryTitlesTool {
    const NAME: &'static str = "propose_story_titles";
    const DESCRIPTION: &'static str = "Propose children's story titles, each with a short description of the adventure.";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "titles": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "description": { "type": "string" }
                        },
                        "required": ["id", "title", "description"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["titles"],
            "additionalProperties": false
        })
    }
}

#[derive(Debug, Clone)]
pub struct StoryTitlesRequest {
    pub character_name: String,
    pub gender: Option<Gender>,
}

#[derive(Clone)]
pub struct StoryTitlesAgent {
    llm_client: LlmClient,
}

impl StoryTitlesAgent {
    pub fn new(llm_client: LlmClient) -> Self {
        Self { llm_client }
    }
}

/// Keeps the first five titles that have text and fills in missing ids.
fn normalize_titles(titles: Vec<StoryTitle>) -> Result<Vec<StoryTitle>, GenerationError> {
    let titles = titles.into_iter()
        .filter(|t| !t.title.trim().is_empty())
        .take(TITLES_PER_REQUEST)
        .enumerate()
        .map(|(i, t)| StoryTitle {
            id: if t.id.trim().is_empty() { (i + 1).to_string() } else { t.id },
            title: t.title.trim().to_string(),
            description: t.description.trim().to_string(),
        })
        .collect::<Vec<_>>();

    if titles.is_empty() {
        return Err(GenerationError::InvalidResponse("The model returned no story titles".to_string()));
    }
    if titles.len() < TITLES_PER_REQUEST {
        tracing::warn!("[StoryTitlesAgent] expected {} titles, got {}", TITLES_PER_REQUEST, titles.len());
    }
    Ok(titles)
}

#[async_trait::async_trait]
impl Agent for StoryTitlesAgent {
    const NAME: &'static str = "story_titles_v0";
    type Tool = StoryTitlesTool;
    type Input = StoryTitlesRequest;
    type Output = Vec<StoryTitle>;

    fn system_prompt() -> &'static str { prompts::STORY_TITLES_SYSTEM_PROMPT }
    fn temperature() -> f32 { 0.8 }
    fn max_tokens() -> u32 { 1000 }

    fn llm_client(&self) -> &LlmClient { &self.llm_client }

    fn build_input(&self, input: &Self::Input) -> Result<Vec<Prompt>, GenerationError> {
        Ok(vec![
            Prompt::new_system(Self::system_prompt()),
            Prompt::new_user(&prompts::story_titles_prompt(&input.character_name, input.gender)),
        ])
    }

    fn handle_output(&self, _input: &Self::Input, tool: Self::Tool) -> Result<Self::Output, GenerationError> {
        normalize_titles(tool.titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(id: &str, text: &str) -> StoryTitle {
        StoryTitle { id: id.to_string(), title: text.to_string(), description: "desc".to_string() }
    }

    #[test]
    fn extra_titles_are_dropped() {
        let titles = (1..=7).map(|i| title(&i.to_string(), &format!("Título {i}"))).collect();
        let titles = normalize_titles(titles).unwrap();
        assert_eq!(titles.len(), TITLES_PER_REQUEST);
        assert_eq!(titles[4].id, "5");
    }

    #[test]
    fn blank_titles_are_skipped_and_ids_filled() {
        let titles = normalize_titles(vec![title("", "  "), title("", " O Dragão Azul ")]).unwrap();
        assert_eq!(titles, vec![title("1", "O Dragão Azul")]);
    }

    #[test]
    fn no_titles_is_an_invalid_response() {
        assert!(matches!(normalize_titles(vec![]), Err(GenerationError::InvalidResponse(_))));
    }

    #[test]
    fn tool_parses_from_fenced_content() {
        let content = "```json\n{\"titles\":[{\"id\":\"1\",\"title\":\"A Lua\",\"description\":\"d\"}]}\n```";
        let tool = StoryTitlesTool::try_from_content(content).unwrap();
        assert_eq!(tool.titles[0].title, "A Lua");
    }

    #[test]
    fn prompt_starts_with_system_message() {
        let agent = StoryTitlesAgent::new(LlmClient::default());
        let input = StoryTitlesRequest { character_name: "Luna".into(), gender: Some(Gender::Female) };
        let prompts = agent.build_input(&input).unwrap();
        assert!(Prompt::validate_messages(&prompts).is_ok());
        assert!(prompts[1].content.contains("Luna"));
    }
}
