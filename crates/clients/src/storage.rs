use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use storytime_common::{define_module_client, env_or, ModuleClient};

use aws_sdk_s3::{Client as S3Client, config::{Builder as S3ConfigBuilder, Credentials, Region}};

/// Public buckets the service writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    CharacterPortraits,
    StoryIllustrations,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::CharacterPortraits => "character-portraits",
            Bucket::StoryIllustrations => "story-illustrations",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bucket: Bucket,
    pub key: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    pub fn png(bucket: Bucket, key: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            bucket,
            key: key.into(),
            content_type: "image/png".to_string(),
            data,
        }
    }
}

define_module_client! {
    (struct StorageClient, "storage")
    client_type: S3Client,
    env: ["STORAGE_ENDPOINT", "STORAGE_ACCESS_KEY_ID", "STORAGE_SECRET_ACCESS_KEY", "STORAGE_PUBLIC_URL"],
    setup: async {
        let endpoint_url = std::env::var("STORAGE_ENDPOINT")?;
        let access_key_id = std::env::var("STORAGE_ACCESS_KEY_ID")?;
        let secret_access_key = std::env::var("STORAGE_SECRET_ACCESS_KEY")?;
        let region = env_or("STORAGE_REGION", "auto");

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "storytime-storage"
        );

        let s3_config = S3ConfigBuilder::new()
            .endpoint_url(endpoint_url)
            .credentials_provider(credentials)
            .region(Region::new(region))
            .force_path_style(true)
            .behavior_version_latest()
            .build();

        Ok::<_, anyhow::Error>(S3Client::from_conf(s3_config))
    }
}

impl StorageClient {
    pub fn public_base_url(&self) -> String {
        public_base_url()
    }

    pub fn public_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url(), bucket.as_str(), key)
    }

    /// Uploads an object, replacing any object already stored under the same key.
    /// Returns the public URL of the stored object.
    pub async fn upload(&self, upload: ImageUpload) -> Result<String> {
        tracing::debug!(
            "[StorageClient::upload] {}/{} ({} bytes)",
            upload.bucket.as_str(), upload.key, upload.data.len()
        );

        self.get_client()
            .put_object()
            .bucket(upload.bucket.as_str())
            .key(&upload.key)
            .body(aws_sdk_s3::primitives::ByteStream::from(upload.data))
            .content_type(upload.content_type)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to upload {} to {}: {}", upload.key, upload.bucket.as_str(), e))?;

        Ok(self.public_url(upload.bucket, &upload.key))
    }
}

fn public_base_url() -> String {
    env_or("STORAGE_PUBLIC_URL", "").trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_joins_base_bucket_and_key() {
        std::env::set_var("STORAGE_PUBLIC_URL", "https://project.supabase.co/storage/v1/object/public/");
        let client = StorageClient::default();
        assert_eq!(
            client.public_url(Bucket::StoryIllustrations, "abc/chapter_0.png"),
            "https://project.supabase.co/storage/v1/object/public/story-illustrations/abc/chapter_0.png"
        );
    }

    #[test]
    fn png_upload_sets_content_type() {
        let upload = ImageUpload::png(Bucket::CharacterPortraits, "id.png", vec![1, 2, 3]);
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.bucket.as_str(), "character-portraits");
    }
}
