use async_openai::types::{
    ChatCompletionNamedToolChoice, ChatCompletionToolArgs, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionName, FunctionObject,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use storytime_clients::LlmClient;
use storytime_common::ModuleClient;

use crate::{GenerationError, Prompt};

/// Structured output requested from the model through a single function call.
pub trait ToolCall: std::fmt::Debug + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// JSON schema of the function arguments.
    fn schema() -> Value;

    fn to_function_object() -> FunctionObject {
        FunctionObject {
            name: Self::NAME.to_string(),
            description: Some(Self::DESCRIPTION.to_string()),
            parameters: Some(Self::schema()),
            strict: Some(true),
        }
    }

    fn try_from_tool_call(tool_call: &FunctionCall) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&tool_call.arguments)
    }

    /// Models sometimes answer with the JSON in plain content, often fenced.
    fn try_from_content(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(strip_code_fences(content))
    }
}

pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[async_trait::async_trait]
pub trait Agent: Clone + Send + Sync + Sized {
    const NAME: &'static str;
    type Tool: ToolCall;
    type Input: std::fmt::Debug + Send + Sync;
    type Output: Send;

    fn system_prompt() -> &'static str;
    fn model() -> &'static str { "gpt-4o" }
    fn temperature() -> f32 { 0.7 }
    fn max_tokens() -> u32 { 2000 }

    fn llm_client(&self) -> &LlmClient;

    fn build_input(&self, input: &Self::Input) -> Result<Vec<Prompt>, GenerationError>;
    fn handle_output(&self, input: &Self::Input, tool: Self::Tool) -> Result<Self::Output, GenerationError>;

    async fn call(&self, input: &Self::Input) -> Result<Self::Output, GenerationError> {
        tracing::debug!("[Agent::call] Calling Agent: {}", Self::NAME);
        let messages = Prompt::pack(self.build_input(input)?)?;

        let tools = vec![
            ChatCompletionToolArgs::default()
                .function(Self::Tool::to_function_object())
                .build()?
        ];
        let tool_choice = ChatCompletionToolChoiceOption::Named(ChatCompletionNamedToolChoice {
            r#type: ChatCompletionToolType::Function,
            function: FunctionName { name: Self::Tool::NAME.to_string() },
        });

        let request = CreateChatCompletionRequestArgs::default()
            .model(Self::model())
            .messages(messages)
            .tools(tools)
            .tool_choice(tool_choice)
            .temperature(Self::temperature())
            .max_tokens(Self::max_tokens())
            .build()?;

        let response = self.llm_client().get_client().chat().create(request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                "[Agent::call] {} used {} prompt / {} completion tokens",
                Self::NAME, usage.prompt_tokens, usage.completion_tokens
            );
        }

        let choice = response.choices.into_iter().next()
            .ok_or_else(|| GenerationError::InvalidResponse(
                format!("No response from AI inference server for model {}", Self::model())
            ))?;

        let tool = match choice.message.tool_calls.as_deref() {
            Some([tool_call, ..]) => Self::Tool::try_from_tool_call(&tool_call.function)
                .map_err(|e| GenerationError::InvalidResponse(
                    format!("Malformed {} arguments: {}", Self::Tool::NAME, e)
                ))?,
            _ => {
                let content = choice.message.content
                    .ok_or_else(|| GenerationError::InvalidResponse("No function call in the response".to_string()))?;
                Self::Tool::try_from_content(&content)
                    .map_err(|e| GenerationError::InvalidResponse(
                        format!("Response content is not valid {}: {}", Self::Tool::NAME, e)
                    ))?
            }
        };

        self.handle_output(input, tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
