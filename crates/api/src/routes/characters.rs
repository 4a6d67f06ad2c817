use anyhow::anyhow;
use axum::{
    extract::{Path, State}, http::StatusCode, middleware, routing::{get, post, put}, Extension, Router
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::types::Uuid;

use storytime_database::{OrderDirection, QueryCriteria, SqlxCrud, SqlxFilterQuery};
use storytime_runtime::{Character, CharacterInput, Story};

use crate::middleware::{authenticate, AuthUser};
use crate::response::{AppError, AppJson, AppSuccess};
use crate::GlobalState;

use super::load_character;

pub fn character_routes() -> Router<GlobalState> {
    Router::new()
        .route("/character", post(create_character))
        .route("/character/{id}", get(get_character))
        .route("/character/{id}/image", put(update_character_image))
        .route("/character/{id}/story", get(get_character_story))
        .route("/characters", get(list_characters))
        .route_layer(middleware::from_fn(authenticate))
}

async fn create_character(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    AppJson(payload): AppJson<CharacterInput>,
) -> Result<AppSuccess, AppError> {
    let character = payload
        .into_character(caller.user_id())
        .map_err(AppError::from_validation)?;

    let character = character.create(state.pool()).await?;
    tracing::info!("[/character] created {} for {:?}", character.id, caller.user_id());

    Ok(AppSuccess::new(StatusCode::CREATED, "Character created successfully", json!({
        "id": character.id,
        "character": character,
    })))
}

async fn get_character(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<AppSuccess, AppError> {
    let character = load_character(&state, id, &caller).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Character fetched successfully", json!(character)))
}

async fn list_characters(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<AppSuccess, AppError> {
    let user_id = caller.require()?;

    let characters = Character::find_by_criteria(
        QueryCriteria::new()
            .add_valued_filter("user_id", "=", user_id)
            .order_by("created_at", OrderDirection::Desc),
        state.pool(),
    ).await?;

    Ok(AppSuccess::new(StatusCode::OK, "Characters fetched successfully", json!(characters)))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacterImageRequest {
    pub image_url: Option<String>,
}

async fn update_character_image(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateCharacterImageRequest>,
) -> Result<AppSuccess, AppError> {
    let image_url = payload.image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, anyhow!("imageUrl is required")))?;

    let mut character = load_character(&state, id, &caller).await?;
    character.image_url = Some(image_url);
    let character = character.update(state.pool()).await?;

    Ok(AppSuccess::new(StatusCode::OK, "Character image updated successfully", json!(character)))
}

/// The newest story of a character, or `null` when it has none.
async fn get_character_story(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<AppSuccess, AppError> {
    load_character(&state, id, &caller).await?;

    let story = Story::find_by_criteria(
        QueryCriteria::new()
            .add_valued_filter("character_id", "=", id)
            .order_by("created_at", OrderDirection::Desc),
        state.pool(),
    ).await?
        .into_iter()
        .find(|story| story.user_id.is_none() || story.user_id == caller.user_id());

    Ok(AppSuccess::new(StatusCode::OK, "Character story fetched successfully", json!(story)))
}
