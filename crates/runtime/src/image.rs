use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Uuid;

use storytime_clients::{Bucket, ImageUpload, LlmClient, StorageClient};
use storytime_common::ModuleClient;

use crate::{prompts, ChapterIllustration, Character, GenerationError};

pub const IMAGE_MODEL: &str = "dall-e-3";
pub const IMAGE_SIZE: &str = "1024x1024";

const MODERATION_ERROR_TYPE: &str = "image_generation_user_error";
const MODERATION_MESSAGE: &str =
    "The image prompt contains content that violates the provider's content policy. Please try different character attributes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Standard,
    Hd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    Vivid,
    Natural,
}

/// Body of an `images/generations` call.
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: u8,
    pub size: String,
    pub quality: ImageQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,
}

impl ImageGenerationRequest {
    fn new(prompt: String, quality: ImageQuality, style: Option<ImageStyle>) -> Self {
        Self {
            model: IMAGE_MODEL.to_string(),
            prompt,
            n: 1,
            size: IMAGE_SIZE.to_string(),
            quality,
            style,
        }
    }

    pub fn portrait(character: &Character) -> Self {
        Self::new(prompts::portrait_prompt(character), ImageQuality::Hd, Some(ImageStyle::Vivid))
    }

    pub fn illustration(request: &ChapterIllustrationRequest) -> Self {
        let prompt = prompts::illustration_prompt(
            &request.chapter_text,
            &request.character_name,
            &request.character_appearance,
            &request.character_image_url,
        );
        Self::new(prompt, ImageQuality::Standard, None)
    }
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
    revised_prompt: Option<String>,
}

/// Maps a failed provider response to a `GenerationError::Provider`, keeping
/// the status and the provider's JSON body.
pub fn provider_error(status: u16, details: Value) -> GenerationError {
    let error = &details["error"];
    let message = if error["type"].as_str() == Some(MODERATION_ERROR_TYPE) {
        MODERATION_MESSAGE.to_string()
    } else {
        error["message"].as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Image provider returned status {}", status))
    };
    GenerationError::Provider { status, message, details }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub url: String,
    pub storage_path: String,
}

#[derive(Debug, Clone)]
pub struct ChapterIllustrationRequest {
    pub story_id: Uuid,
    pub chapter_index: i32,
    pub chapter_text: String,
    pub character_name: String,
    pub character_appearance: String,
    pub character_image_url: String,
}

#[async_trait::async_trait]
pub trait ImageAgent: Send + Sync {
    fn llm_client(&self) -> &LlmClient;
    fn storage_client(&self) -> &StorageClient;
    fn http_client(&self) -> &reqwest::Client;

    /// Calls the image provider and returns the temporary URL of the image.
    async fn generate_image(&self, request: &ImageGenerationRequest) -> Result<String, GenerationError> {
        use async_openai::config::Config;
        tracing::debug!("[ImageAgent::generate_image] {} ({:?})", request.model, request.quality);

        let config = self.llm_client().get_client().config();
        let mut http_request = self.http_client()
            .post(format!("{}/images/generations", config.api_base()))
            .json(request);
        for (key, value) in config.headers().iter() {
            http_request = http_request.header(key, value);
        }

        let response = http_request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let details = response.json::<Value>().await.unwrap_or(Value::Null);
            tracing::error!("[ImageAgent::generate_image] provider returned {}: {}", status, details);
            return Err(provider_error(status.as_u16(), details));
        }

        let body: ImageGenerationResponse = response.json().await?;
        let image = body.data.into_iter().next()
            .ok_or_else(|| GenerationError::InvalidResponse("No image in the provider response".to_string()))?;
        if let Some(revised) = &image.revised_prompt {
            tracing::trace!("[ImageAgent::generate_image] revised prompt: {}", revised);
        }
        image.url.ok_or_else(|| GenerationError::InvalidResponse("No image URL in the provider response".to_string()))
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self.http_client().get(url).send().await?;
        if !response.status().is_success() {
            return Err(GenerationError::Download(format!("{} returned {}", url, response.status())));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Downloads an image and stores it as a PNG, replacing any previous object.
    async fn store_image(&self, source_url: &str, bucket: Bucket, key: String) -> Result<StoredImage, GenerationError> {
        let data = self.download_image(source_url).await?;
        let url = self.storage_client()
            .upload(ImageUpload::png(bucket, key.clone(), data))
            .await
            .map_err(GenerationError::Storage)?;
        Ok(StoredImage { url, storage_path: key })
    }

    /// Generates a portrait of a valid character. Returns the provider's temporary URL.
    async fn portrait(&self, character: &Character) -> Result<String, GenerationError> {
        self.generate_image(&ImageGenerationRequest::portrait(character)).await
    }

    /// Copies a generated portrait into `character-portraits/<id>.png`.
    async fn store_portrait(&self, character_id: Uuid, temporary_url: &str) -> Result<StoredImage, GenerationError> {
        self.store_image(temporary_url, Bucket::CharacterPortraits, format!("{}.png", character_id)).await
    }

    /// Generates and stores the illustration of one chapter.
    async fn illustration(&self, request: &ChapterIllustrationRequest) -> Result<StoredImage, GenerationError> {
        let temporary_url = self.generate_image(&ImageGenerationRequest::illustration(request)).await?;
        let key = ChapterIllustration::storage_path_for(request.story_id, request.chapter_index);
        self.store_image(&temporary_url, Bucket::StoryIllustrations, key).await
    }
}

#[derive(Clone)]
pub struct Illustrator {
    llm_client: LlmClient,
    storage_client: StorageClient,
    http_client: reqwest::Client,
}

impl Illustrator {
    pub fn new(llm_client: LlmClient, storage_client: StorageClient, http_client: reqwest::Client) -> Self {
        Self { llm_client, storage_client, http_client }
    }
}

impl ImageAgent for Illustrator {
    fn llm_client(&self) -> &LlmClient { &self.llm_client }
    fn storage_client(&self) -> &StorageClient { &self.storage_client }
    fn http_client(&self) -> &reqwest::Client { &self.http_client }
}
