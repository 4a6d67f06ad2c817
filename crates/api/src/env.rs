use std::time::Duration;

use storytime_common::{env_flag, env_or, EnvVars};

pub const DEFAULT_PORT: &str = "3033";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "120";
pub const DEFAULT_ILLUSTRATION_TIMEOUT_SECS: &str = "1200";

pub struct ApiServerEnv {
    pub jwt_secret: String,
    pub port: String,
    pub request_timeout_secs: String,
    pub illustration_timeout_secs: String,
    pub init_tables: bool,
}

impl ApiServerEnv {
    pub fn port(&self) -> anyhow::Result<u16> {
        self.port.parse()
            .map_err(|e| anyhow::anyhow!("PORT must be a number, got {:?}: {}", self.port, e))
    }

    /// Unparseable values fall back to 120 seconds.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.parse().unwrap_or(120))
    }

    /// Budget for a whole-story illustration pass. Unparseable values fall back to 1200 seconds.
    pub fn illustration_timeout(&self) -> Duration {
        Duration::from_secs(self.illustration_timeout_secs.parse().unwrap_or(1200))
    }
}

impl EnvVars for ApiServerEnv {
    fn load() -> Self {
        Self {
            jwt_secret: env_or("SUPABASE_JWT_SECRET", ""),
            port: env_or("PORT", DEFAULT_PORT),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            illustration_timeout_secs: env_or("ILLUSTRATION_TIMEOUT_SECS", DEFAULT_ILLUSTRATION_TIMEOUT_SECS),
            init_tables: env_flag("INIT_TABLES"),
        }
    }

    fn get_env_var(&self, key: &str) -> String {
        match key {
            "SUPABASE_JWT_SECRET" => self.jwt_secret.clone(),
            "PORT" => self.port.clone(),
            "REQUEST_TIMEOUT_SECS" => self.request_timeout_secs.clone(),
            "ILLUSTRATION_TIMEOUT_SECS" => self.illustration_timeout_secs.clone(),
            "INIT_TABLES" => self.init_tables.to_string(),
            _ => panic!("{} is not set", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(port: &str, timeout: &str) -> ApiServerEnv {
        ApiServerEnv {
            jwt_secret: String::new(),
            port: port.to_string(),
            request_timeout_secs: timeout.to_string(),
            illustration_timeout_secs: "soon".to_string(),
            init_tables: false,
        }
    }

    #[test]
    fn port_and_timeout_are_parsed() {
        let env = env("8080", "30");
        assert_eq!(env.port().unwrap(), 8080);
        assert_eq!(env.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn bad_values_are_reported_or_defaulted() {
        let env = env("http", "soon");
        assert!(env.port().is_err());
        assert_eq!(env.request_timeout(), Duration::from_secs(120));
        assert_eq!(env.illustration_timeout(), Duration::from_secs(1200));
    }
}
