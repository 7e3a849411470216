/*!
 * Provider-specific concurrency tuning.
 *
 * Each target language of a document is one batch request, so the number of
 * languages translated at once is bounded by what the provider tolerates.
 */

use crate::app_config::TranslationProvider;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// Maximum languages translated at the same time
    pub max_concurrent_languages: usize,
    /// Target requests per minute when the config sets none
    pub target_rpm: Option<u32>,
}

impl ProviderProfile {
    /// Get the profile for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        match provider {
            TranslationProvider::Ollama => Self {
                // Local, bounded by the host GPU rather than a quota
                max_concurrent_languages: 4,
                target_rpm: None,
            },
            TranslationProvider::OpenAI => Self {
                max_concurrent_languages: 10,
                target_rpm: Some(60),
            },
            TranslationProvider::Anthropic => Self {
                max_concurrent_languages: 5,
                target_rpm: Some(45),
            },
            TranslationProvider::LMStudio => Self {
                max_concurrent_languages: 2,
                target_rpm: None,
            },
        }
    }

    /// Effective language concurrency, respecting any user override
    pub fn effective_concurrent_languages(&self, user_override: Option<usize>) -> usize {
        user_override
            .filter(|&n| n > 0)
            .unwrap_or(self.max_concurrent_languages)
    }
}
