use storytime_common::{define_module_client, env_or};

use async_openai::{config::OpenAIConfig, Client};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

define_module_client! {
    (struct LlmClient, "llm")
    client_type: Client<OpenAIConfig>,
    env: ["OPENAI_API_KEY"],
    setup: async {
        let base_url = env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
        let api_key = std::env::var("OPENAI_API_KEY")?;
        let openai_config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key);

        Ok::<_, anyhow::Error>(Client::with_config(openai_config))
    }
}
