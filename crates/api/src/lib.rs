mod env;
mod global_state;
mod middleware;
mod response;
mod routes;
mod utils;

pub use routes::{
    character_routes,
    story_routes,
    story_illustration_routes,
    generation_routes,
    misc_routes,
    service_routes,
};

pub use env::ApiServerEnv;
pub use global_state::GlobalState;
pub use utils::setup_tracing;
pub use middleware::{authenticate, validate_token, AuthUser, Claims};
pub use response::{AppError, AppJson, AppSuccess, GenericResponse};
