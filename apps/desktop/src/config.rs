use std::{fs, path::Path, time::Duration};

use client_core::{AcceptPolicy, DEFAULT_API_BASE_URL};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "resumematch.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub accept_text_uploads: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 30,
            accept_text_uploads: false,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn accept_policy(&self) -> AcceptPolicy {
        if self.accept_text_uploads {
            AcceptPolicy::DocumentsAndText
        } else {
            AcceptPolicy::Documents
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    accept_text_uploads: Option<bool>,
}

pub fn load_settings(config_path: &Path) -> Settings {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then the environment.
pub fn load_settings_with(config_path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg.request_timeout_secs.and_then(nonzero_timeout) {
                    settings.request_timeout_secs = v;
                }
                if let Some(v) = file_cfg.accept_text_uploads {
                    settings.accept_text_uploads = v;
                }
            }
            Err(err) => {
                warn!(path = %config_path.display(), error = %err, "ignoring unreadable config file");
            }
        }
    }

    if let Some(v) = env("RESUMEMATCH_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Some(parsed) = v.parse::<u64>().ok().and_then(nonzero_timeout) {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__ACCEPT_TEXT_UPLOADS") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.accept_text_uploads = parsed;
        }
    }

    settings
}

// A zero timeout would fail every request before it is sent.
fn nonzero_timeout(secs: u64) -> Option<u64> {
    if secs == 0 {
        warn!("ignoring request timeout of 0 seconds");
        return None;
    }
    Some(secs)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
