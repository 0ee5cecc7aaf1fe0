use directories::BaseDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const API_URL_ENV: &str = "MAISCHAT_API_URL";
pub const ORIGIN_ENV: &str = "MAISCHAT_ORIGIN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server the relative `api_url` is resolved against.
    pub origin: String,
    pub api_url: String,
    pub debounce_ms: u64,
    pub calendar_close_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3001".to_string(),
            api_url: "/api".to_string(),
            debounce_ms: 500,
            calendar_close_ms: 300,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("maischat-viewer.toml"))
    }

    /// Reads the settings file (falling back to defaults) and applies the
    /// environment overrides on top.
    pub fn load() -> Self {
        let mut settings = Self::toml_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|text| match toml::from_str::<Settings>(&text) {
                Ok(s) => Some(s),
                Err(e) => {
                    log::warn!("ignoring invalid settings file: {e}");
                    None
                }
            })
            .unwrap_or_default();
        settings.apply_env();
        settings
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Applies `MAISCHAT_API_URL` / `MAISCHAT_ORIGIN` as returned by
    /// `lookup`; blank values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(origin) = lookup(ORIGIN_ENV).filter(|v| !v.trim().is_empty()) {
            self.origin = origin;
        }
    }

    /// Absolute base URL of the REST API.
    pub fn api_base(&self) -> String {
        let api = crate::utils::normalize_url(self.api_url.trim());
        if api.starts_with("http://") || api.starts_with("https://") {
            return api;
        }
        let origin = crate::utils::ensure_scheme(&self.origin);
        let origin = origin.trim_end_matches('/');
        let path = api.trim_start_matches('/');
        crate::utils::normalize_url(&format!("{origin}/{path}"))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn calendar_close_delay(&self) -> Duration {
        Duration::from_millis(self.calendar_close_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
