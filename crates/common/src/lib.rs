mod client;
mod env;

pub use client::ModuleClient;
pub use env::{EnvVars, env_or, env_flag};

pub fn get_current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
