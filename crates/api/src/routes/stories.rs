use anyhow::anyhow;
use axum::{
    extract::{Path, State}, http::StatusCode, middleware, routing::{get, post}, Extension, Router
};
use serde_json::json;
use sqlx::types::Uuid;

use storytime_database::{OrderDirection, QueryCriteria, SqlxFilterQuery};
use storytime_runtime::{find_story_illustrations, illustrate_story, Character, Story};

use crate::middleware::{authenticate, AuthUser};
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

use super::load_owned_story;

pub fn story_routes() -> Router<GlobalState> {
    Router::new()
        .route("/stories", get(list_stories))
        .route("/story/{id}/illustrations", get(list_illustrations))
        .route_layer(middleware::from_fn(authenticate))
}

/// Whole-story illustration; served under its own timeout.
pub fn story_illustration_routes() -> Router<GlobalState> {
    Router::new()
        .route("/story/{id}/illustrations", post(illustrate_whole_story))
        .route_layer(middleware::from_fn(authenticate))
}

async fn list_stories(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<AppSuccess, AppError> {
    let user_id = caller.require()?;

    let stories = Story::find_by_criteria(
        QueryCriteria::new()
            .add_valued_filter("user_id", "=", user_id)
            .order_by("created_at", OrderDirection::Desc),
        state.pool(),
    ).await?;

    Ok(AppSuccess::new(StatusCode::OK, "Stories fetched successfully", json!(stories)))
}

async fn list_illustrations(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<AppSuccess, AppError> {
    let user_id = caller.require()?;
    let story = load_owned_story(&state, id, user_id).await?;

    let illustrations = find_story_illustrations(state.pool(), story.id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Illustrations fetched successfully", json!(illustrations)))
}

/// Illustrates the chapters of a story that have no image yet, one at a time.
async fn illustrate_whole_story(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<AppSuccess, AppError> {
    let user_id = caller.require()?;
    let story = load_owned_story(&state, id, user_id).await?;

    let character_id = story.character_id
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, anyhow!("Story has no character")))?;
    let character = Character::find_one_by_criteria(QueryCriteria::by_id(character_id), state.pool()).await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, anyhow!("Character not found")))?;

    let report = illustrate_story(&state.illustrator(), state.pool(), &story, &character).await
        .map_err(AppError::from_generation)?;

    tracing::info!(
        "[/story/{}/illustrations] generated {}, skipped {}, failed {}",
        story.id, report.generated.len(), report.skipped.len(), report.failed.len()
    );
    Ok(AppSuccess::new(StatusCode::OK, "Story illustration finished", json!(report)))
}
