use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_point_at_local_backend() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, "http://127.0.0.1:8000");
    assert_eq!(settings.dictation_command, None);
    assert_eq!(settings.dictation_language, "en-US");
    assert!(!settings.dictation_capability().is_available());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
api_base_url = "http://reminders.internal:9000"
dictation_command = "whisper-listen --model base.en"
dictation_language = "en-GB"
"#,
    );

    assert_eq!(settings.api_base_url, "http://reminders.internal:9000");
    assert_eq!(
        settings.dictation_command.as_deref(),
        Some("whisper-listen --model base.en")
    );
    assert_eq!(settings.dictation_language, "en-GB");
    assert!(settings.dictation_capability().is_available());
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "api_base_url = [1, 2");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_short_name() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("REMINDERS_API_URL", "http://short:1"),
            ("APP__API_BASE_URL", "http://prefixed:2"),
        ]),
    );
    assert_eq!(settings.api_base_url, "http://prefixed:2");
}

#[test]
fn blank_dictation_command_disables_dictation() {
    let mut settings = Settings {
        dictation_command: Some("whisper-listen".into()),
        ..Settings::default()
    };
    apply_env_overrides(&mut settings, env_from(&[("REMINDERS_DICTATION_COMMAND", "  ")]));
    assert_eq!(settings.dictation_command, None);
}

#[test]
fn invalid_base_url_is_reported_with_context() {
    let settings = Settings {
        api_base_url: "not a url".into(),
        ..Settings::default()
    };
    let err = settings.client_config().expect_err("invalid url");
    assert!(err.to_string().contains("not a url"));
}

#[test]
fn load_settings_reads_config_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("reminders_cli_config_{suffix}.toml"));
    fs::write(&path, "dictation_language = \"fr-FR\"\n").expect("write config");

    let settings = load_settings(&path);
    assert_eq!(settings.dictation_language, "fr-FR");

    fs::remove_file(path).expect("cleanup");
}
