pub trait EnvVars {
    fn load() -> Self;
    fn get_env_var(&self, key: &str) -> String;
}

/// Reads an optional variable, falling back to `default` when unset or blank.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Reads a boolean flag; `1`, `true` and `yes` (any case) are true.
pub fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_blank() {
        std::env::set_var("STORYTIME_TEST_BLANK", "  ");
        assert_eq!(env_or("STORYTIME_TEST_BLANK", "fallback"), "fallback");
        assert_eq!(env_or("STORYTIME_TEST_UNSET_VAR", "x"), "x");
    }

    #[test]
    fn env_flag_parses_truthy_values() {
        std::env::set_var("STORYTIME_TEST_FLAG_ON", "True");
        std::env::set_var("STORYTIME_TEST_FLAG_OFF", "0");
        assert!(env_flag("STORYTIME_TEST_FLAG_ON"));
        assert!(!env_flag("STORYTIME_TEST_FLAG_OFF"));
        assert!(!env_flag("STORYTIME_TEST_FLAG_MISSING"));
    }
}
