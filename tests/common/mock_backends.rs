/*!
 * Mock batch backends for testing
 *
 * These implement `BatchTranslator` without any network access, so the
 * pipeline and controller can be exercised end to end.
 */

use async_trait::async_trait;
use std::sync::Mutex;

use yamtwai::errors::{ProviderError, TranslationError};
use yamtwai::translation::BatchTranslator;

/// Returns every line unchanged
#[derive(Debug, Default)]
pub struct EchoBackend;

#[async_trait]
impl BatchTranslator for EchoBackend {
    async fn translate_batch(
        &self,
        lines: &[String],
        _source_language: &str,
        _target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        Ok(lines.to_vec())
    }
}

/// Tags each non-blank line with its target language, e.g. `[fr] Hello`
#[derive(Debug, Default)]
pub struct PrefixBackend;

pub fn tag_line(line: &str, target_language: &str) -> String {
    if line.trim().is_empty() {
        line.to_string()
    } else {
        format!("[{}] {}", target_language, line)
    }
}

#[async_trait]
impl BatchTranslator for PrefixBackend {
    async fn translate_batch(
        &self,
        lines: &[String],
        _source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        Ok(lines.iter().map(|l| tag_line(l, target_language)).collect())
    }
}

/// Fails for one language and behaves like `PrefixBackend` for the others
#[derive(Debug)]
pub struct FailingForLanguage {
    pub failing_language: String,
}

impl FailingForLanguage {
    pub fn new(language: &str) -> Self {
        Self {
            failing_language: language.to_string(),
        }
    }
}

#[async_trait]
impl BatchTranslator for FailingForLanguage {
    async fn translate_batch(
        &self,
        lines: &[String],
        _source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        if target_language == self.failing_language {
            return Err(ProviderError::ConnectionError(format!("backend down for {}", target_language)).into());
        }
        Ok(lines.iter().map(|l| tag_line(l, target_language)).collect())
    }
}

/// Drops the last line of every batch
#[derive(Debug, Default)]
pub struct ShortReplyBackend;

#[async_trait]
impl BatchTranslator for ShortReplyBackend {
    async fn translate_batch(
        &self,
        lines: &[String],
        _source_language: &str,
        _target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        Ok(lines[..lines.len().saturating_sub(1)].to_vec())
    }
}

/// One recorded backend call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub source_language: String,
    pub target_language: String,
    pub lines: Vec<String>,
}

/// Records every call and answers like `PrefixBackend`
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BatchTranslator for RecordingBackend {
    async fn translate_batch(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            lines: lines.to_vec(),
        });
        Ok(lines.iter().map(|l| tag_line(l, target_language)).collect())
    }
}

/// A backend whose provider cannot be reached at all
#[derive(Debug, Default)]
pub struct OfflineBackend;

#[async_trait]
impl BatchTranslator for OfflineBackend {
    async fn translate_batch(
        &self,
        _lines: &[String],
        _source_language: &str,
        _target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        Err(ProviderError::ConnectionError("connection refused".to_string()).into())
    }

    async fn check_connection(&self) -> Result<(), ProviderError> {
        Err(ProviderError::ConnectionError("connection refused".to_string()))
    }
}
