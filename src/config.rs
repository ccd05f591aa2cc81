use std::path::PathBuf;

pub const API_URL_VAR: &str = "GITAGUIDE_API_URL";
pub const LOG_FILE_VAR: &str = "GITAGUIDE_LOG_FILE";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Startup settings read once from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Read from the process environment (after any `.env` has been loaded)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let log_file = lookup(LOG_FILE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_log_file);

        Self { api_url, log_file }
    }
}

fn default_log_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("gitaguide").join("gitaguide.log"))
}
