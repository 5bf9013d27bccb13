use std::{collections::HashMap, fs, path::Path, sync::Arc};

use anyhow::Context;
use client_core::{
    dictation::DEFAULT_LANGUAGE, ClientConfig, CommandRecognizer, DictationCapability,
    RecognitionOptions, SpeechRecognizer,
};
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_PATH: &str = "reminders.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub dictation_command: Option<String>,
    pub dictation_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".into(),
            dictation_command: None,
            dictation_language: DEFAULT_LANGUAGE.into(),
        }
    }
}

impl Settings {
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        ClientConfig::new(&self.api_base_url)
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))
    }

    pub fn dictation_capability(&self) -> DictationCapability {
        let recognizer = self
            .dictation_command
            .as_deref()
            .and_then(CommandRecognizer::from_command_line)
            .map(|recognizer| Arc::new(recognizer) as Arc<dyn SpeechRecognizer>);
        DictationCapability::detect(
            recognizer,
            RecognitionOptions {
                language: self.dictation_language.clone(),
                ..RecognitionOptions::default()
            },
        )
    }
}

/// Defaults, then the config file, then the environment.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(config_path) {
        Ok(raw) => apply_file_overrides(&mut settings, &raw),
        Err(err) => debug!(path = %config_path.display(), error = %err, "no config file"),
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, "ignoring malformed config file");
            return;
        }
    };

    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("dictation_command") {
        settings.dictation_command = non_blank(v);
    }
    if let Some(v) = file_cfg.get("dictation_language") {
        settings.dictation_language = v.clone();
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("REMINDERS_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("REMINDERS_DICTATION_COMMAND") {
        settings.dictation_command = non_blank(&v);
    }
    if let Some(v) = lookup("APP__DICTATION_COMMAND") {
        settings.dictation_command = non_blank(&v);
    }

    if let Some(v) = lookup("APP__DICTATION_LANGUAGE") {
        settings.dictation_language = v;
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
