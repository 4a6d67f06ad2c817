mod characters;
mod stories;
mod generation;
mod misc;

pub use characters::character_routes;
pub use stories::{story_illustration_routes, story_routes};
pub use generation::generation_routes;
pub use misc::misc_routes;

use anyhow::anyhow;
use axum::{http::StatusCode, Router};
use tower_http::timeout::TimeoutLayer;
use sqlx::types::Uuid;

use storytime_database::{QueryCriteria, SqlxFilterQuery};
use storytime_runtime::{Character, Story};

use crate::{middleware::AuthUser, response::AppError, ApiServerEnv, GlobalState};

/// Every route of the service with its timeout. Whole-story illustration runs
/// under `ILLUSTRATION_TIMEOUT_SECS`, everything else under `REQUEST_TIMEOUT_SECS`.
pub fn service_routes(env: &ApiServerEnv) -> Router<GlobalState> {
    Router::new()
        .merge(misc_routes())
        .merge(character_routes())
        .merge(story_routes())
        .merge(generation_routes())
        .layer(TimeoutLayer::new(env.request_timeout()))
        .merge(story_illustration_routes().layer(TimeoutLayer::new(env.illustration_timeout())))
}

/// Loads a character the caller may use. Anonymous characters are open to anyone.
async fn load_character(state: &GlobalState, id: Uuid, caller: &AuthUser) -> Result<Character, AppError> {
    let character = Character::find_one_by_criteria(QueryCriteria::by_id(id), state.pool()).await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, anyhow!("Character not found")))?;

    if !character.is_accessible_by(caller.user_id()) {
        return Err(AppError::new(StatusCode::FORBIDDEN, anyhow!("Character belongs to another user")));
    }
    Ok(character)
}

/// Loads a story owned by `owner`.
async fn load_owned_story(state: &GlobalState, id: Uuid, owner: Uuid) -> Result<Story, AppError> {
    let story = Story::find_one_by_criteria(QueryCriteria::by_id(id), state.pool()).await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, anyhow!("Story not found")))?;

    if !story.is_owned_by(owner) {
        return Err(AppError::new(StatusCode::FORBIDDEN, anyhow!("Story belongs to another user")));
    }
    Ok(story)
}
