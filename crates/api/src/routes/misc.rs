use axum::{http::StatusCode, routing::get, Router};
use serde_json::json;

use storytime_runtime::QUIZ_STEPS;

use crate::{response::AppSuccess, GlobalState};

pub fn misc_routes() -> Router<GlobalState> {
    Router::new()
        .route("/health",
            get(|| async { "OK" })
        )
        .route("/quiz/steps",
            get(quiz_steps)
        )
}

async fn quiz_steps() -> AppSuccess {
    AppSuccess::new(StatusCode::OK, "Quiz steps fetched successfully", json!(QUIZ_STEPS))
}
