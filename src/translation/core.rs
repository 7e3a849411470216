/*!
 * Core translation service implementation.
 *
 * `TranslationService` turns a batch of Markdown lines into one LLM request,
 * checks the reply keeps the line count, and retries with backoff when the
 * provider fails or the count is off.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};

use crate::app_config::TranslationConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};

use super::batch::BatchTranslator;
use super::concurrency::ProviderProfile;

/// Context window requested from Ollama; the default one is too small for whole documents
const OLLAMA_CONTEXT_WINDOW: u32 = 16384;

/// Keep the Ollama model loaded between the batches of one run
const OLLAMA_KEEP_ALIVE: &str = "10m";

/// Provider client selected from the configuration
#[derive(Debug)]
enum ProviderClient {
    Ollama(Ollama),
    /// OpenAI and LM Studio share the chat completions wire format
    OpenAI(OpenAI),
    Anthropic(Anthropic),
}

/// LLM-backed batch translator
pub struct TranslationService {
    provider: ProviderClient,
    config: TranslationConfig,
    /// Bounds requests in flight across all language tasks
    request_slots: Arc<Semaphore>,
    /// Minimum spacing between two requests, from the rate limit
    min_interval: Option<Duration>,
    last_request: Mutex<Option<Instant>>,
}

impl TranslationService {
    /// Create a new translation service
    pub fn new(config: TranslationConfig) -> Result<Self> {
        use crate::app_config::TranslationProvider as Kind;

        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_timeout_secs();
        let model = config.get_model();
        let provider = match config.provider {
            Kind::Ollama => ProviderClient::Ollama(Ollama::new(endpoint, timeout_secs)),
            Kind::OpenAI => {
                ProviderClient::OpenAI(OpenAI::new(config.get_api_key(), endpoint, model, timeout_secs))
            }
            Kind::LMStudio => ProviderClient::OpenAI(OpenAI::lm_studio(endpoint, model, timeout_secs)),
            Kind::Anthropic => {
                ProviderClient::Anthropic(Anthropic::new(config.get_api_key(), endpoint, model, timeout_secs))
            }
        };

        let rate_limit = config
            .get_rate_limit()
            .or(ProviderProfile::for_provider(config.provider).target_rpm);
        let min_interval = rate_limit
            .filter(|&rpm| rpm > 0)
            .map(|rpm| Duration::from_millis(60_000 / u64::from(rpm)));

        Ok(Self {
            provider,
            request_slots: Arc::new(Semaphore::new(config.get_concurrent_requests())),
            min_interval,
            last_request: Mutex::new(None),
            config,
        })
    }

    /// Check the configured provider answers
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            ProviderClient::Ollama(client) => client.test_connection().await,
            ProviderClient::OpenAI(client) => client.test_connection().await,
            ProviderClient::Anthropic(client) => client.test_connection().await,
        }
    }

    /// Fill the system prompt placeholders
    pub fn render_system_prompt(&self, source_language: &str, target_language: &str, line_count: usize) -> String {
        let name = |code: &str| language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string());
        self.config
            .common
            .system_prompt
            .replace("{source_language}", &name(source_language))
            .replace("{target_language}", &name(target_language))
            .replace("{line_count}", &line_count.to_string())
    }

    /// Wait until the rate limit allows another request
    async fn pace(&self) {
        let Some(interval) = self.min_interval else {
            return;
        };
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// One request to the provider, returning the raw text
    async fn request(&self, system_prompt: &str, user_text: &str) -> Result<String, ProviderError> {
        self.pace().await;
        let _permit = self
            .request_slots
            .acquire()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Request limiter closed: {}", e)))?;

        let model = self.config.get_model();
        let temperature = self.config.common.temperature;
        let text = match &self.provider {
            ProviderClient::Ollama(client) => {
                let request = GenerationRequest::new(model, user_text)
                    .system(system_prompt)
                    .temperature(temperature)
                    .context_window(OLLAMA_CONTEXT_WINDOW)
                    .keep_alive(OLLAMA_KEEP_ALIVE);
                Ollama::extract_text(&client.complete(request).await?)
            }
            ProviderClient::OpenAI(client) => {
                let request = OpenAIRequest::new(model.clone())
                    .add_message("system", system_prompt)
                    .add_message("user", user_text)
                    .temperature(temperature)
                    .max_tokens(max_tokens_for_model(&model));
                OpenAI::extract_text(&client.complete(request).await?)
            }
            ProviderClient::Anthropic(client) => {
                let request = AnthropicRequest::new(model.clone(), max_tokens_for_model(&model))
                    .system(system_prompt)
                    .add_message("user", user_text)
                    .temperature(temperature);
                Anthropic::extract_text(&client.complete(request).await?)
            }
        };
        Ok(text)
    }
}

#[async_trait]
impl BatchTranslator for TranslationService {
    async fn translate_batch(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let system_prompt = self.render_system_prompt(source_language, target_language, lines.len());
        let user_text = lines.join("\n");
        let policy = RetryPolicy {
            retry_count: self.config.common.retry_count,
            backoff_ms: self.config.common.retry_backoff_ms,
        };

        translate_with_retry(lines, target_language, &policy, || self.request(&system_prompt, &user_text)).await
    }

    async fn check_connection(&self) -> Result<(), ProviderError> {
        self.test_connection().await
    }
}

/// Retry settings for one batch
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub retry_count: u32,
    /// Delay before the first retry, doubled for each further one
    pub backoff_ms: u64,
}

impl RetryPolicy {
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.min(6);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// Run `request` until it yields as many lines as `lines`, or attempts run out.
///
/// Provider errors and wrong line counts are retried; authentication errors
/// are not. When every attempt answered with the wrong count, the last answer
/// is returned as is and the caller's splice reports the mismatch.
pub async fn translate_with_retry<F, Fut>(
    lines: &[String],
    target_language: &str,
    policy: &RetryPolicy,
    mut request: F,
) -> Result<Vec<String>, TranslationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, ProviderError>>,
{
    let leading_blanks = lines.iter().take_while(|l| l.trim().is_empty()).count();
    let trailing_blanks = lines.iter().rev().take_while(|l| l.trim().is_empty()).count();
    let attempts = policy.retry_count + 1;

    let mut last_error = TranslationError::EmptyResponse(lines.len());
    let mut last_mismatch: Option<Vec<String>> = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            let delay = policy.backoff(attempt - 1);
            debug!(
                "Retrying {} batch (attempt {}/{}) after {:?}",
                target_language,
                attempt + 1,
                attempts,
                delay
            );
            tokio::time::sleep(delay).await;
        }

        let started = Instant::now();
        match request().await {
            Ok(text) if text.trim().is_empty() => {
                warn!("Empty response for {} batch of {} lines", target_language, lines.len());
                last_error = TranslationError::EmptyResponse(lines.len());
            }
            Ok(text) => {
                let translated = normalize_response(&text, leading_blanks, trailing_blanks);
                debug!(
                    "{} batch answered in {:?} ({} of {} lines)",
                    target_language,
                    started.elapsed(),
                    translated.len(),
                    lines.len()
                );
                if translated.len() == lines.len() {
                    return Ok(translated);
                }
                warn!(
                    "Line count mismatch for {}: expected {}, got {}",
                    target_language,
                    lines.len(),
                    translated.len()
                );
                last_mismatch = Some(translated);
            }
            Err(e) => {
                warn!("Provider error for {} batch: {}", target_language, e);
                if matches!(e, ProviderError::AuthenticationError(_)) {
                    return Err(e.into());
                }
                last_error = e.into();
            }
        }
    }

    match last_mismatch {
        Some(translated) => Ok(translated),
        None => Err(last_error),
    }
}

/// Split a reply into lines, dropping a wrapping code fence and restoring
/// the number of leading and trailing blank lines the request had
pub fn normalize_response(text: &str, leading_blanks: usize, trailing_blanks: usize) -> Vec<String> {
    let mut lines: Vec<&str> = text.lines().collect();

    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let fenced = lines.len() >= 2
        && lines.first().is_some_and(|l| l.trim_start().starts_with("```"))
        && lines.last().is_some_and(|l| l.trim() == "```");
    if fenced {
        lines = lines[1..lines.len() - 1].to_vec();
    }

    // a reply of only blanks is padded once, from the trailing count
    let leading_blanks = if lines.is_empty() { 0 } else { leading_blanks };
    let mut owned: Vec<String> = std::iter::repeat_n(String::new(), leading_blanks).collect();
    owned.extend(lines.into_iter().map(str::to_string));
    owned.extend(std::iter::repeat_n(String::new(), trailing_blanks));
    owned
}

/// Get the maximum number of output tokens for a given model
fn max_tokens_for_model(model: &str) -> u32 {
    match model {
        m if m.starts_with("gpt-4o") || m.starts_with("gpt-4.1") => 16384,
        m if m.starts_with("gpt-4-turbo") => 4096,
        m if m.starts_with("gpt-3.5") => 4096,
        m if m.starts_with("claude-3-5") || m.starts_with("claude-3-7") => 8192,
        m if m.starts_with("claude-3") => 4096,
        m if m.starts_with("claude") => 8192,
        _ => 4096,
    }
}
