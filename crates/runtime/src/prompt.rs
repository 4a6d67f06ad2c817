use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use serde::{Deserialize, Serialize};

use crate::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub role: PromptRole,
    pub content: String,
}

impl Prompt {
    pub fn new_system(prompt: &str) -> Self {
        Self { role: PromptRole::System, content: prompt.to_string() }
    }

    pub fn new_user(prompt: &str) -> Self {
        Self { role: PromptRole::User, content: prompt.to_string() }
    }

    pub fn validate_messages(messages: &[Self]) -> Result<(), GenerationError> {
        // 1. exactly one system message, and it comes first
        let first = messages.first()
            .ok_or(GenerationError::InvalidPrompt("No messages to build input"))?;
        if first.role != PromptRole::System {
            return Err(GenerationError::InvalidPrompt("First message should be system message"));
        }
        if messages.iter().skip(1).any(|m| m.role == PromptRole::System) {
            return Err(GenerationError::InvalidPrompt("Only the first message may be a system message"));
        }
        // 2. the last message is the user's request
        if messages.len() == 1 || messages.last().map(|m| m.role) != Some(PromptRole::User) {
            return Err(GenerationError::InvalidPrompt("Last message should be user message"));
        }
        Ok(())
    }

    pub fn pack(messages: Vec<Self>) -> Result<Vec<ChatCompletionRequestMessage>, GenerationError> {
        Self::validate_messages(&messages)?;
        messages.into_iter().map(|m| -> Result<ChatCompletionRequestMessage, GenerationError> {
            Ok(match m.role {
                PromptRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(m.content)
                        .build()?
                ),
                PromptRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(m.content)
                        .build()?
                ),
            })
        }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_then_user_is_valid() {
        let messages = vec![Prompt::new_system("sys"), Prompt::new_user("hi")];
        assert!(Prompt::validate_messages(&messages).is_ok());
        assert_eq!(Prompt::pack(messages).unwrap().len(), 2);
    }

    #[test]
    fn ordering_rules_are_enforced() {
        assert!(Prompt::validate_messages(&[]).is_err());
        assert!(Prompt::validate_messages(&[Prompt::new_system("sys")]).is_err());
        assert!(Prompt::validate_messages(&[Prompt::new_user("hi")]).is_err());
        assert!(Prompt::validate_messages(&[
            Prompt::new_system("sys"), Prompt::new_user("hi"), Prompt::new_system("again"),
        ]).is_err());
    }
}
