use std::env;

use crate::error::AppError;

/// Which database the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProfile {
    /// `DATABASE_URL`, required.
    Prod,
    /// `TEST_DATABASE_URL`, falling back to an in-memory sqlite database.
    Test,
}

pub const TEST_DEFAULT_URL: &str = "sqlite::memory:";

/// Resolves the connection URL for `profile` from the environment.
pub fn db_url(profile: DbProfile) -> Result<String, AppError> {
    match profile {
        DbProfile::Prod => must_var("DATABASE_URL"),
        DbProfile::Test => {
            let url = env_or("TEST_DATABASE_URL", TEST_DEFAULT_URL);
            if url.trim().is_empty() {
                return Err(AppError::config("TEST_DATABASE_URL is set but empty"));
            }
            Ok(url)
        }
    }
}

/// Required environment variable.
pub fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}

/// Environment variable with a fallback.
pub fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_profile_defaults_to_in_memory_sqlite() {
        env::remove_var("TEST_DATABASE_URL");
        assert_eq!(db_url(DbProfile::Test).unwrap(), TEST_DEFAULT_URL);
    }

    #[test]
    #[serial]
    fn prod_profile_requires_database_url() {
        env::remove_var("DATABASE_URL");
        let err = db_url(DbProfile::Prod).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        env::set_var("DATABASE_URL", "postgres://orchestrator@localhost/matches");
        assert_eq!(
            db_url(DbProfile::Prod).unwrap(),
            "postgres://orchestrator@localhost/matches"
        );
        env::remove_var("DATABASE_URL");
    }
}
