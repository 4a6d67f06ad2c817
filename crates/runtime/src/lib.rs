mod character;
mod story;
mod quiz;
mod flow;
mod translation;
mod error;
mod prompt;
mod llm;
mod image;
mod illustration;

pub mod prompts;
pub mod agents;

pub use character::{Character, CharacterInput, CharacterRow, CharacterValidationError, Gender};
pub use story::{Story, StoryRow, ChapterIllustration, CHAPTER_COUNT};
pub use quiz::{QuizStep, QuizStepKind, QuizField, QuizValue, CharacterDraft, QUIZ_STEPS};
pub use flow::{CreationFlow, FlowScreen, FlowError};
pub use translation::translate;
pub use error::GenerationError;
pub use prompt::{Prompt, PromptRole};

pub use llm::{Agent, ToolCall, strip_code_fences};
pub use image::{
    ImageAgent, Illustrator, ImageGenerationRequest, ImageQuality, ImageStyle,
    ChapterIllustrationRequest, StoredImage, provider_error, IMAGE_MODEL, IMAGE_SIZE,
};
pub use illustration::{
    illustrate_chapter, illustrate_story, find_story_illustrations, IllustrationReport, ChapterFailure,
};
