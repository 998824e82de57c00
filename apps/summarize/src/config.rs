use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::DEFAULT_BASE_URL;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "summarize.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub request_timeout_seconds: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            output_dir: PathBuf::from("."),
            request_timeout_seconds: None,
        }
    }
}

impl Settings {
    // Zero means no timeout, same as unset.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
    }

    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        output_dir: Option<PathBuf>,
        request_timeout_seconds: Option<u64>,
    ) -> Self {
        if let Some(v) = base_url {
            self.base_url = v;
        }
        if let Some(v) = output_dir {
            self.output_dir = v;
        }
        if let Some(v) = request_timeout_seconds {
            self.request_timeout_seconds = Some(v);
        }
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    base_url: Option<String>,
    output_dir: Option<PathBuf>,
    request_timeout_seconds: Option<u64>,
}

/// Defaults, then the config file, then environment variables.
///
/// An explicitly named config file must exist; the default `summarize.toml`
/// is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let raw = match config_path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };

    load_settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid summarizer config")?;
        if let Some(v) = file_cfg.base_url {
            settings.base_url = v;
        }
        if let Some(v) = file_cfg.output_dir {
            settings.output_dir = v;
        }
        if let Some(v) = file_cfg.request_timeout_seconds {
            settings.request_timeout_seconds = Some(v);
        }
    }

    if let Some(v) = env("SUMMARIZER_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("APP__OUTPUT_DIR") {
        settings.output_dir = PathBuf::from(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        let parsed = v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECONDS must be whole seconds, got '{v}'"))?;
        settings.request_timeout_seconds = Some(parsed);
    }

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
