#[cfg(feature = "llm")]
mod llm;
#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "storage")]
mod storage;

#[cfg(feature = "llm")]
pub use llm::{LlmClient, DEFAULT_OPENAI_BASE_URL};
#[cfg(feature = "postgres")]
pub use postgres::PostgresClient;
#[cfg(feature = "storage")]
pub use storage::{StorageClient, Bucket, ImageUpload};
