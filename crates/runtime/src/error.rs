use async_openai::error::OpenAIError;
use serde_json::Value;

/// Failures while talking to the generation provider or storing its output.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The provider answered with a non-success status.
    #[error("{message}")]
    Provider { status: u16, message: String, details: Value },

    #[error("chat completion failed: {0}")]
    Llm(#[from] OpenAIError),

    #[error("invalid prompt: {0}")]
    InvalidPrompt(&'static str),

    #[error("invalid response from the model: {0}")]
    InvalidResponse(String),

    #[error("failed to download generated image: {0}")]
    Download(String),

    #[error("failed to store generated image: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("{0}")]
    MissingInput(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl GenerationError {
    /// HTTP status the API should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GenerationError::Provider { status, .. } => *status,
            GenerationError::MissingInput(_) => 400,
            GenerationError::InvalidResponse(_) | GenerationError::Download(_) => 502,
            GenerationError::Llm(OpenAIError::ApiError(_)) => 502,
            _ => 500,
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            GenerationError::Provider { details, .. } => Some(details),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_their_status() {
        let err = GenerationError::Provider {
            status: 429,
            message: "Rate limit reached".to_string(),
            details: serde_json::json!({ "error": { "type": "rate_limit" } }),
        };
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.to_string(), "Rate limit reached");
        assert!(err.details().is_some());
    }

    #[test]
    fn bad_model_output_is_a_gateway_error() {
        assert_eq!(GenerationError::InvalidResponse("no tool call".into()).status_code(), 502);
        assert_eq!(GenerationError::MissingInput("missing".into()).status_code(), 400);
    }
}
