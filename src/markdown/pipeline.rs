/*!
 * One document, one language: preprocess, classify, translate, expand.
 */

use anyhow::Result;

use crate::app_config::MarkdownConfig;
use crate::errors::TranslationError;
use crate::translation::BatchTranslator;

use super::classifier::{ClassifierRules, classify};
use super::expansion::Expander;
use super::preprocess::preprocess;
use super::realign::fill_segments;
use super::segment::Segment;

/// Reusable, immutable pipeline shared by every language task
#[derive(Debug, Clone)]
pub struct MarkdownPipeline {
    expander: Expander,
}

impl MarkdownPipeline {
    pub fn new(config: MarkdownConfig) -> Result<Self> {
        let expander = Expander::new(&config)?;
        Ok(Self { expander })
    }

    pub fn config(&self) -> &MarkdownConfig {
        self.expander.config()
    }

    /// Segments of `source` as they would be sent for `target_language`
    pub fn segment(&self, source: &str, target_language: &str) -> Vec<Segment> {
        let lines: Vec<&str> = source.lines().collect();
        let lines = preprocess(target_language, &lines, self.config());
        let rules = ClassifierRules::for_target(self.config(), target_language);
        classify(&lines, &rules)
    }

    /// Full translation of `source` into `target_language`
    pub async fn translate(
        &self,
        source: &str,
        backend: &dyn BatchTranslator,
        source_language: &str,
        target_language: &str,
        document: &str,
    ) -> Result<String, TranslationError> {
        let segments = self.segment(source, target_language);
        let segments = fill_segments(segments, backend, source_language, target_language, document).await?;
        Ok(self.expander.expand_segments(&segments, target_language))
    }
}
