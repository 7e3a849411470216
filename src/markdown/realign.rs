/*!
 * Batch extraction and positional realignment.
 *
 * All translatable lines of a document go to the backend as one ordered
 * batch. The reply is walked with a single cursor: each segment takes the
 * number of lines it contributed, in order, and nothing else identifies
 * which line belongs where.
 */

use log::debug;

use crate::errors::TranslationError;
use crate::translation::BatchTranslator;

use super::segment::Segment;

/// Ordered concatenation of every segment's translatable lines
pub fn build_batch(segments: &[Segment]) -> Vec<String> {
    segments.iter().flat_map(Segment::translatable_text).collect()
}

/// Fill `segments` from `translated`, in order.
///
/// Fails instead of reading past the end of `translated`; `document` and
/// `target_language` only label the error.
pub fn splice(
    segments: &mut [Segment],
    translated: &[String],
    document: &str,
    target_language: &str,
) -> Result<usize, TranslationError> {
    let expected: usize = segments.iter().map(Segment::expected_line_count).sum();
    let mut cursor = 0;

    for segment in segments.iter_mut() {
        let count = segment.expected_line_count();
        if count == 0 {
            continue;
        }
        let end = cursor + count;
        let Some(lines) = translated.get(cursor..end) else {
            return Err(TranslationError::LineCountMismatch {
                document: document.to_string(),
                target_language: target_language.to_string(),
                expected,
                actual: translated.len(),
            });
        };
        segment.fill(lines.to_vec());
        cursor = end;
    }

    Ok(cursor)
}

/// Concatenate the composed output of every segment
pub fn compose_all(segments: &[Segment]) -> String {
    segments.iter().map(Segment::compose).collect()
}

/// Translate a classified document with one backend call and rebuild its text
pub async fn translate_segments(
    segments: Vec<Segment>,
    backend: &dyn BatchTranslator,
    source_language: &str,
    target_language: &str,
    document: &str,
) -> Result<String, TranslationError> {
    let segments = fill_segments(segments, backend, source_language, target_language, document).await?;
    Ok(compose_all(&segments))
}

/// Send the batch of `segments` in one backend call and splice the reply back in
pub async fn fill_segments(
    mut segments: Vec<Segment>,
    backend: &dyn BatchTranslator,
    source_language: &str,
    target_language: &str,
    document: &str,
) -> Result<Vec<Segment>, TranslationError> {
    let batch = build_batch(&segments);
    if batch.is_empty() {
        debug!("{}: nothing to translate for {}", document, target_language);
        return Ok(segments);
    }

    debug!("{}: sending {} lines to translate into {}", document, batch.len(), target_language);
    let translated = backend.translate_batch(&batch, source_language, target_language).await?;

    if translated.len() != batch.len() {
        return Err(TranslationError::LineCountMismatch {
            document: document.to_string(),
            target_language: target_language.to_string(),
            expected: batch.len(),
            actual: translated.len(),
        });
    }

    splice(&mut segments, &translated, document, target_language)?;
    Ok(segments)
}
