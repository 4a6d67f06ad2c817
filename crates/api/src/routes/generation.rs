use anyhow::anyhow;
use axum::{
    extract::State, http::StatusCode, middleware, routing::post, Extension, Router
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::types::Uuid;

use storytime_database::{QueryCriteria, SqlxCrud, SqlxFilterQuery};
use storytime_runtime::{
    agents::{StoryChaptersRequest, StoryTitlesRequest},
    illustrate_chapter, Agent, ChapterIllustrationRequest, Character, CharacterInput, Gender, ImageAgent,
    Story, CHAPTER_COUNT,
};

use crate::middleware::{authenticate, AuthUser};
use crate::response::{AppError, AppJson, AppSuccess};
use crate::GlobalState;

use super::load_character;

pub fn generation_routes() -> Router<GlobalState> {
    Router::new()
        .route("/character-image", post(generate_character_image))
        .route("/story-titles", post(generate_story_titles))
        .route("/story-chapters", post(generate_story_chapters))
        .route("/chapter-illustration", post(generate_chapter_illustration))
        .route_layer(middleware::from_fn(authenticate))
}

fn missing_character() -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, anyhow!("Character data is required"))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterImageRequest {
    pub character: Option<CharacterInput>,
    pub character_id: Option<Uuid>,
}

/// A stored character is drawn from its record, so the portrait attached to
/// it always matches its attributes.
fn portrait_subject<'a>(submitted: &'a Character, record: Option<&'a Character>) -> &'a Character {
    record.unwrap_or(submitted)
}

async fn generate_character_image(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    AppJson(payload): AppJson<CharacterImageRequest>,
) -> Result<AppSuccess, AppError> {
    let character = payload.character
        .ok_or_else(missing_character)?
        .into_character(caller.user_id())
        .map_err(AppError::from_validation)?;

    // Checked before the provider call so a forbidden record costs nothing.
    let record = match payload.character_id {
        Some(id) => Some(load_character(&state, id, &caller).await?),
        None => None,
    };

    let illustrator = state.illustrator();
    let temporary_url = illustrator.portrait(portrait_subject(&character, record.as_ref())).await
        .map_err(AppError::from_generation)?;

    let image_url = match record {
        Some(mut record) => {
            let stored = illustrator.store_portrait(record.id, &temporary_url).await
                .map_err(AppError::from_generation)?;
            record.image_url = Some(stored.url.clone());
            let record = record.update(state.pool()).await?;
            tracing::info!("[/character-image] portrait stored for {}", record.id);
            stored.url
        }
        None => temporary_url,
    };

    Ok(AppSuccess::new(StatusCode::OK, "Character image generated successfully", json!({
        "imageUrl": image_url,
    })))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTitlesPayload {
    pub character_name: Option<String>,
    pub character_gender: Option<String>,
}

async fn generate_story_titles(
    State(state): State<GlobalState>,
    AppJson(payload): AppJson<StoryTitlesPayload>,
) -> Result<AppSuccess, AppError> {
    let character_name = payload.character_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, anyhow!("Character name is required")))?;

    // An unknown gender falls back to the universal themes.
    let gender = payload.character_gender
        .and_then(|gender| gender.parse::<Gender>().ok());

    let titles = state.story_titles_agent()
        .call(&StoryTitlesRequest { character_name, gender })
        .await
        .map_err(AppError::from_generation)?;

    Ok(AppSuccess::new(StatusCode::OK, "Story titles generated successfully", json!({
        "titles": titles,
    })))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryChaptersPayload {
    pub story_title: Option<String>,
    pub character: Option<CharacterInput>,
    pub character_id: Option<Uuid>,
}

async fn generate_story_chapters(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    AppJson(payload): AppJson<StoryChaptersPayload>,
) -> Result<AppSuccess, AppError> {
    let user_id = caller.require()?;

    let title = payload.story_title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, anyhow!("Story title is required")))?;

    let character = payload.character
        .ok_or_else(missing_character)?
        .into_character(Some(user_id))
        .map_err(AppError::from_validation)?;

    let record = match payload.character_id {
        Some(id) => Some(load_character(&state, id, &caller).await?),
        None => None,
    };

    let chapters = state.story_chapters_agent()
        .call(&StoryChaptersRequest { title: title.clone(), character })
        .await
        .map_err(AppError::from_generation)?;

    let image_url = record.as_ref().and_then(|record| record.image_url.clone());
    let story = Story::new(title, record.map(|r| r.id), Some(user_id), chapters, image_url)
        .create(state.pool())
        .await?;

    tracing::info!("[/story-chapters] story {} saved with {} chapters", story.id, story.chapters.len());
    Ok(AppSuccess::new(StatusCode::OK, "Story generated and saved successfully", json!({
        "chapters": story.chapters,
        "storyId": story.id,
    })))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterIllustrationPayload {
    pub chapter_text: Option<String>,
    pub character_image_url: Option<String>,
    pub character_name: Option<String>,
    pub character_appearance: Option<String>,
    pub story_id: Option<Uuid>,
    pub chapter_index: Option<i32>,
}

impl ChapterIllustrationPayload {
    /// Every field is required; the error lists all that are missing.
    fn into_request(self) -> Result<ChapterIllustrationRequest, AppError> {
        fn text(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        let chapter_text = text(self.chapter_text);
        let character_image_url = text(self.character_image_url);
        let character_name = text(self.character_name);
        let character_appearance = text(self.character_appearance);

        let missing = [
            ("chapterText", chapter_text.is_none()),
            ("characterImageUrl", character_image_url.is_none()),
            ("characterName", character_name.is_none()),
            ("characterAppearance", character_appearance.is_none()),
            ("storyId", self.story_id.is_none()),
            ("chapterIndex", self.chapter_index.is_none()),
        ]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect::<Vec<_>>();

        match (chapter_text, character_image_url, character_name, character_appearance, self.story_id, self.chapter_index) {
            (Some(chapter_text), Some(character_image_url), Some(character_name), Some(character_appearance), Some(story_id), Some(chapter_index)) => {
                if chapter_index < 0 || chapter_index as usize >= CHAPTER_COUNT {
                    return Err(AppError::new(
                        StatusCode::BAD_REQUEST,
                        anyhow!("chapterIndex must be between 0 and {}", CHAPTER_COUNT - 1),
                    ));
                }
                Ok(ChapterIllustrationRequest {
                    story_id,
                    chapter_index,
                    chapter_text,
                    character_name,
                    character_appearance,
                    character_image_url,
                })
            }
            _ => Err(AppError::new(StatusCode::BAD_REQUEST, anyhow!("Missing required fields"))
                .with_details(json!(missing))),
        }
    }
}

async fn generate_chapter_illustration(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    AppJson(payload): AppJson<ChapterIllustrationPayload>,
) -> Result<AppSuccess, AppError> {
    let request = payload.into_request()?;

    let story = Story::find_one_by_criteria(QueryCriteria::by_id(request.story_id), state.pool()).await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, anyhow!("Story not found")))?;
    if story.user_id.is_some() && story.user_id != caller.user_id() {
        return Err(AppError::new(StatusCode::FORBIDDEN, anyhow!("Story belongs to another user")));
    }

    let illustration = illustrate_chapter(&state.illustrator(), state.pool(), &request).await
        .map_err(AppError::from_generation)?;

    Ok(AppSuccess::new(StatusCode::OK, "Chapter illustration generated successfully", json!({
        "illustrationUrl": illustration.image_url,
        "storagePath": illustration.storage_path,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> ChapterIllustrationPayload {
        ChapterIllustrationPayload {
            chapter_text: Some("Luna encontrou uma estrela cadente.".into()),
            character_image_url: Some("https://img/luna.png".into()),
            character_name: Some("Luna".into()),
            character_appearance: Some("Pele Morena".into()),
            story_id: Some(Uuid::nil()),
            chapter_index: Some(2),
        }
    }

    fn character(name: &str, hair_color: &str) -> Character {
        CharacterInput {
            name: Some(name.into()),
            age: Some(6),
            gender: Some("Masculino".into()),
            skin_color: Some("Pele Clara".into()),
            hair_color: Some(hair_color.into()),
            eye_color: Some("Azuis".into()),
            hair_style: Some("Liso e Curto".into()),
        }
        .into_character(None)
        .unwrap()
    }

    #[test]
    fn stored_record_is_the_portrait_subject() {
        let submitted = character("Theo", "Ruivo");
        let record = character("Theo", "Loiro");
        assert_eq!(portrait_subject(&submitted, Some(&record)).hair_color, "Loiro");
        assert_eq!(portrait_subject(&submitted, None).hair_color, "Ruivo");
    }

    #[test]
    fn complete_payload_builds_a_request() {
        let request = full_payload().into_request().unwrap();
        assert_eq!(request.chapter_index, 2);
        assert_eq!(request.character_name, "Luna");
    }

    #[test]
    fn missing_fields_are_all_listed() {
        let payload = ChapterIllustrationPayload {
            chapter_text: Some("  ".into()),
            story_id: None,
            ..full_payload()
        };
        let err = payload.into_request().unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.2, Some(json!(["chapterText", "storyId"])));
    }

    #[test]
    fn chapter_index_out_of_range_is_rejected() {
        let payload = ChapterIllustrationPayload { chapter_index: Some(10), ..full_payload() };
        assert_eq!(payload.into_request().unwrap_err().0, StatusCode::BAD_REQUEST);
    }
}
