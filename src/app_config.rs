use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language codes (ISO, optionally with a region such as `zh-TW`)
    pub target_languages: Vec<String>,

    /// Document names (without `.md`) looked up when a folder is given
    #[serde(default = "default_source_filenames")]
    pub source_filenames: Vec<String>,

    /// Maximum number of languages translated at the same time.
    /// Falls back to the provider profile when unset.
    #[serde(default)]
    pub max_concurrent_languages: Option<usize>,

    /// Translation config
    pub translation: TranslationConfig,

    /// Markdown segmentation and post-processing tables
    #[serde(default)]
    pub markdown: MarkdownConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
                rate_limit: Some(60),
            },
            TranslationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_anthropic_timeout_secs(),
                rate_limit: Some(45),
            },
            TranslationProvider::LMStudio => Self {
                provider_type: "lmstudio".to_string(),
                model: default_lmstudio_model(),
                api_key: String::new(),
                endpoint: default_lmstudio_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}, {line_count}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed or misaligned batches
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Tables driving segment classification and post-processing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MarkdownConfig {
    /// Front-matter key prefixes whose scalar value is translated
    #[serde(default = "default_key_value_keys")]
    pub front_matter_key_value_keys: Vec<String>,

    /// Front-matter key prefixes copied verbatim
    #[serde(default = "default_transparent_keys")]
    pub front_matter_transparent_keys: Vec<String>,

    /// Front-matter key prefixes whose array elements are translated one by one
    #[serde(default = "default_key_value_array_keys")]
    pub front_matter_key_value_array_keys: Vec<String>,

    /// Insert a machine-translation banner once per document
    #[serde(default = "default_true")]
    pub insert_warnings: bool,

    /// Banner text per target language
    #[serde(default = "default_warnings_mapping")]
    pub warnings_mapping: HashMap<String, String>,

    /// Targets exempt from script-boundary spacing
    #[serde(default = "default_compact_langs")]
    pub compact_langs: Vec<String>,

    /// Targets that keep full-width punctuation in the source
    #[serde(default = "default_full_width_langs")]
    pub full_width_langs: Vec<String>,

    /// Regex matching runs of "wide" script characters
    #[serde(default = "default_script_run_pattern")]
    pub script_run_pattern: String,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            front_matter_key_value_keys: default_key_value_keys(),
            front_matter_transparent_keys: default_transparent_keys(),
            front_matter_key_value_array_keys: default_key_value_array_keys(),
            insert_warnings: default_true(),
            warnings_mapping: default_warnings_mapping(),
            compact_langs: default_compact_langs(),
            full_width_langs: default_full_width_langs(),
            script_run_pattern: default_script_run_pattern(),
        }
    }
}

impl MarkdownConfig {
    /// Whether `lang` is listed in `langs`, ignoring case
    fn lang_listed(langs: &[String], lang: &str) -> bool {
        langs.iter().any(|l| l.eq_ignore_ascii_case(lang))
    }

    pub fn is_compact(&self, target_language: &str) -> bool {
        Self::lang_listed(&self.compact_langs, target_language)
    }

    pub fn keeps_full_width(&self, target_language: &str) -> bool {
        Self::lang_listed(&self.full_width_langs, target_language)
    }

    /// Banner for `target_language`, if one is configured
    pub fn warning_for(&self, target_language: &str) -> Option<&str> {
        self.warnings_mapping
            .get(target_language)
            .or_else(|| {
                self.warnings_mapping
                    .iter()
                    .find(|(lang, _)| lang.eq_ignore_ascii_case(target_language))
                    .map(|(_, text)| text)
            })
            .map(String::as_str)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_anthropic_timeout_secs() -> u64 {
    180
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_lmstudio_endpoint() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_lmstudio_model() -> String {
    "local-model".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following Markdown lines from {source_language} to {target_language}. \
     The input has exactly {line_count} lines and your answer must have exactly {line_count} lines, one translated line per input line, in the same order. \
     Never merge, split, drop or add lines. Keep Markdown syntax, URLs and placeholders unchanged. \
     Only respond with the translated lines, without any explanations or notes."
        .to_string()
}

fn default_source_filenames() -> Vec<String> {
    vec!["README".to_string(), "index".to_string()]
}

fn default_key_value_keys() -> Vec<String> {
    vec!["title".to_string(), "description".to_string(), "summary".to_string()]
}

fn default_transparent_keys() -> Vec<String> {
    vec![
        "date".to_string(),
        "slug".to_string(),
        "layout".to_string(),
        "draft".to_string(),
        "image".to_string(),
    ]
}

fn default_key_value_array_keys() -> Vec<String> {
    vec!["tags".to_string(), "categories".to_string(), "keywords".to_string()]
}

fn default_warnings_mapping() -> HashMap<String, String> {
    [
        ("en", "This post is translated using machine translation. Please let me know if there are any omissions."),
        ("zh-CN", "该文章使用机器翻译，如有遗漏请指出。"),
        ("zh-TW", "該文章使用機器翻譯，如有遺漏請指出。"),
        ("ja", "この投稿は機械翻訳を使用して翻訳されています。抜け漏れがあればお知らせください。"),
        ("ko", "이 게시물은 기계 번역으로 번역되었습니다. 누락된 부분이 있으면 알려주세요."),
        ("fr", "Cet article a été traduit par traduction automatique. N'hésitez pas à signaler toute omission."),
        ("de", "Dieser Beitrag wurde maschinell übersetzt. Bitte melden Sie eventuelle Auslassungen."),
        ("es", "Esta publicación fue traducida mediante traducción automática. Avíseme si hay alguna omisión."),
        ("ru", "Этот пост переведён с помощью машинного перевода. Сообщите, если что-то упущено."),
    ]
    .into_iter()
    .map(|(lang, text)| (lang.to_string(), text.to_string()))
    .collect()
}

fn default_compact_langs() -> Vec<String> {
    vec!["ja".to_string()]
}

fn default_full_width_langs() -> Vec<String> {
    vec!["zh-TW".to_string()]
}

fn default_script_run_pattern() -> String {
    r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}\u{3000}-\u{303F}\u{FF00}-\u{FFEF}]+".to_string()
}

/// Fallback banner when a target language has no configured warning
pub const DEFAULT_WARNING: &str =
    "This post is translated using machine translation. Please let me know if there are any omissions.";

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.source_language)?;

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for target in &self.target_languages {
            crate::language_utils::get_language_name(target)
                .with_context(|| format!("Invalid target language: {}", target))?;
        }

        if self.max_concurrent_languages == Some(0) {
            return Err(anyhow!("max_concurrent_languages must be greater than zero"));
        }

        Regex::new(&self.markdown.script_run_pattern).with_context(|| {
            format!("Invalid script_run_pattern: {}", self.markdown.script_run_pattern)
        })?;

        let endpoint = self.translation.get_endpoint();
        let with_scheme = if endpoint.contains("://") {
            endpoint.clone()
        } else {
            format!("http://{}", endpoint)
        };
        let parsed =
            url::Url::parse(&with_scheme).with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;
        if parsed.host_str().is_none() {
            return Err(anyhow!("Endpoint URL has no host: {}", endpoint));
        }

        // Hosted providers need a key; local ones do not
        match self.translation.provider {
            TranslationProvider::OpenAI | TranslationProvider::Anthropic => {
                if self.translation.get_api_key().is_empty() {
                    return Err(anyhow!(
                        "Translation API key is required for {} provider",
                        self.translation.provider.display_name()
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Number of languages that may run at once for one document
    pub fn effective_concurrent_languages(&self) -> usize {
        crate::translation::concurrency::ProviderProfile::for_provider(self.translation.provider)
            .effective_concurrent_languages(self.max_concurrent_languages)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_languages: vec!["fr".to_string()],
            source_filenames: default_source_filenames(),
            max_concurrent_languages: None,
            translation: TranslationConfig::default(),
            markdown: MarkdownConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::Anthropic => default_anthropic_model(),
            TranslationProvider::LMStudio => default_lmstudio_model(),
        }
    }

    /// Override the model of the active provider
    pub fn set_model(&mut self, model: &str) {
        let provider_str = self.provider.to_lowercase_string();
        match self
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.to_string(),
            None => {
                let mut provider_config = ProviderConfig::new(self.provider);
                provider_config.model = model.to_string();
                self.available_providers.push(provider_config);
            }
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Anthropic => default_anthropic_endpoint(),
            TranslationProvider::LMStudio => default_lmstudio_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => match self.provider {
                TranslationProvider::Anthropic => default_anthropic_timeout_secs(),
                _ => default_timeout_secs(),
            },
        }
    }

    /// Get the number of requests allowed in flight for the active provider
    pub fn get_concurrent_requests(&self) -> usize {
        self.get_active_provider_config()
            .map(|p| p.concurrent_requests)
            .filter(|&n| n > 0)
            .unwrap_or_else(default_concurrent_requests)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        match self.get_active_provider_config() {
            Some(provider_config) => provider_config.rate_limit,
            None => ProviderConfig::new(self.provider).rate_limit,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
