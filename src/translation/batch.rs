/*!
 * The batch translation seam.
 *
 * A document is translated for one language with a single call: the lines of
 * every translatable segment go in, the same number of translated lines must
 * come back in the same order.
 */

use async_trait::async_trait;

use crate::errors::{ProviderError, TranslationError};

/// Backend able to translate an ordered batch of lines
#[async_trait]
pub trait BatchTranslator: Send + Sync {
    /// Translate `lines` from `source_language` to `target_language`.
    ///
    /// Implementations should return exactly `lines.len()` lines. Callers treat
    /// any other count as a failure for this document and language.
    async fn translate_batch(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError>;

    /// Check the backend is reachable before a run. Offline backends have nothing to check.
    async fn check_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
