use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "user-top-read",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-read-recently-played",
    "user-library-read",
];

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub client_id: String,
    /// Must match the redirect URI registered with the provider exactly.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub accounts_base_url: String,
    pub api_base_url: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub gemini_api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: "http://127.0.0.1:8888/callback".into(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            accounts_base_url: "https://accounts.spotify.com".into(),
            api_base_url: "https://api.spotify.com/v1".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            gemini_model: "gemini-2.0-flash".into(),
            gemini_api_key: String::new(),
        }
    }
}

impl Config {
    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_base_url.trim_end_matches('/'))
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base_url.trim_end_matches('/'))
    }

    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config(
                "client_id is not set (config file or AURASYNC_CLIENT_ID)".into(),
            ));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(Error::Config("redirect_uri is not set".into()));
        }
        if self.gemini_api_key.trim().is_empty() {
            return Err(Error::Config(
                "gemini_api_key is not set (config file or GEMINI_API_KEY)".into(),
            ));
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(v) = env::var("AURASYNC_CLIENT_ID") {
            self.client_id = v;
        }
        if let Ok(v) = env::var("AURASYNC_REDIRECT_URI") {
            self.redirect_uri = v;
        }
        if let Ok(v) = env::var("GEMINI_API_KEY") {
            self.gemini_api_key = v;
        }
    }
}

fn default_config_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("aurasync");
    }
    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home).join(".config").join("aurasync");
    }
    PathBuf::from(".").join(".config").join("aurasync")
}

pub fn config_path() -> PathBuf {
    if let Ok(p) = env::var("AURASYNC_CONFIG_PATH") {
        return PathBuf::from(p);
    }
    default_config_dir().join("config.json")
}

/// Read the config file (defaults when absent) and apply environment overrides.
pub fn load_config() -> Config {
    let mut cfg = load_file(&config_path());
    cfg.apply_env();
    cfg
}

fn load_file(path: &PathBuf) -> Config {
    let Ok(s) = fs::read_to_string(path) else {
        return Config::default();
    };
    match serde_json::from_str::<Config>(&s) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = std::env::temp_dir().join(format!("aurasync-config-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("config.json");
        fs::write(&path, r#"{"client_id":"abc","gemini_model":"gemini-pro"}"#).expect("write");

        let cfg = load_file(&path);
        assert_eq!(cfg.client_id, "abc");
        assert_eq!(cfg.gemini_model, "gemini-pro");
        assert_eq!(cfg.api_base_url, "https://api.spotify.com/v1");
        assert_eq!(cfg.scopes.len(), DEFAULT_SCOPES.len());

        fs::write(&path, "not json").expect("write");
        assert!(load_file(&path).client_id.is_empty());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn validate_requires_client_id_and_key() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        cfg.client_id = "id".into();
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        cfg.gemini_api_key = "key".into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn endpoint_urls() {
        let cfg = Config {
            accounts_base_url: "http://127.0.0.1:9/".into(),
            ..Config::default()
        };
        assert_eq!(cfg.authorize_url(), "http://127.0.0.1:9/authorize");
        assert_eq!(cfg.token_url(), "http://127.0.0.1:9/api/token");
        assert!(cfg.scope().starts_with("user-read-private user-top-read"));
    }
}
