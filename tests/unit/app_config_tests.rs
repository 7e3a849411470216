/*!
 * Tests for application configuration
 */

use yamtwai::app_config::{Config, DEFAULT_WARNING, LogLevel, MarkdownConfig, TranslationProvider};

/// Test the default configuration values
#[test]
fn test_default_config_shouldTranslateEnglishToFrench() {
    let config = Config::default();
    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_languages, vec!["fr"]);
    assert_eq!(config.source_filenames, vec!["README", "index"]);
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_markdown_config_shouldMatchDocumentedTables() {
    let markdown = MarkdownConfig::default();
    assert!(markdown.insert_warnings);
    assert_eq!(markdown.compact_langs, vec!["ja"]);
    assert_eq!(markdown.full_width_langs, vec!["zh-TW"]);
    assert!(markdown.front_matter_key_value_keys.contains(&"title".to_string()));
    assert!(markdown.front_matter_transparent_keys.contains(&"date".to_string()));
    assert!(markdown.front_matter_key_value_array_keys.contains(&"tags".to_string()));
}

#[test]
fn test_markdown_lookups_shouldIgnoreCase() {
    let markdown = MarkdownConfig::default();
    assert!(markdown.is_compact("JA"));
    assert!(markdown.keeps_full_width("zh-tw"));
    assert!(!markdown.keeps_full_width("zh-CN"));
    assert_eq!(markdown.warning_for("ZH-tw"), markdown.warning_for("zh-TW"));
    assert!(markdown.warning_for("fr").is_some());
    assert!(markdown.warning_for("tlh").is_none());
    assert!(!DEFAULT_WARNING.is_empty());
}

/// A partial file falls back to defaults for every missing section
#[test]
fn test_deserialize_withMinimalJson_shouldFillDefaults() {
    let json = r#"{
        "source_language": "zh-CN",
        "target_languages": ["en", "ja"],
        "translation": { "provider": "ollama", "available_providers": [], "common": {} }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.target_languages, vec!["en", "ja"]);
    assert_eq!(config.markdown.compact_langs, vec!["ja"]);
    assert_eq!(config.translation.common.retry_count, 3);
    assert_eq!(config.max_concurrent_languages, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_serialize_roundTrip_shouldKeepMarkdownTables() {
    let mut config = Config::default();
    config.markdown.compact_langs = vec!["ja".to_string(), "ko".to_string()];
    config.max_concurrent_languages = Some(2);

    let json = serde_json::to_string_pretty(&config).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(back.markdown.compact_langs, vec!["ja", "ko"]);
    assert_eq!(back.max_concurrent_languages, Some(2));
    assert_eq!(back.effective_concurrent_languages(), 2);
}

#[test]
fn test_validate_withNoTargets_shouldFail() {
    let mut config = Config::default();
    config.target_languages.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withInvalidTarget_shouldFail() {
    let mut config = Config::default();
    config.target_languages = vec!["fr".to_string(), "zz-QQ".to_string()];
    let error = config.validate().unwrap_err();
    assert!(format!("{:#}", error).contains("zz-QQ"));
}

#[test]
fn test_validate_withRegionTargets_shouldPass() {
    let mut config = Config::default();
    config.target_languages = vec!["zh-TW".to_string(), "pt_BR".to_string()];
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.max_concurrent_languages = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBrokenScriptPattern_shouldFail() {
    let mut config = Config::default();
    config.markdown.script_run_pattern = "[\\p{Han}".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withHostedProviderWithoutKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    assert!(config.validate().is_err());

    config.translation.provider = TranslationProvider::LMStudio;
    assert!(config.validate().is_ok());
}

#[test]
fn test_set_model_shouldOnlyTouchActiveProvider() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;
    config.translation.set_model("gpt-4o-mini");
    assert_eq!(config.translation.get_model(), "gpt-4o-mini");

    config.translation.provider = TranslationProvider::Ollama;
    assert_ne!(config.translation.get_model(), "gpt-4o-mini");
}

#[test]
fn test_effective_concurrent_languages_withoutOverride_shouldUseProviderProfile() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    assert_eq!(config.effective_concurrent_languages(), 5);
}

#[test]
fn test_provider_from_str_shouldAcceptDisplayNames() {
    assert_eq!("lmstudio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert_eq!("OpenAI".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert!("bard".parse::<TranslationProvider>().is_err());
}

#[test]
fn test_log_level_shouldConvertToLevelFilter() {
    assert_eq!(log::LevelFilter::from(&LogLevel::Debug), log::LevelFilter::Debug);
    assert_eq!(log::LevelFilter::from(&LogLevel::Error), log::LevelFilter::Error);
}
