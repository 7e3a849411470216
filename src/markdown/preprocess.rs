/*!
 * Line normalization applied before classification.
 */

use crate::app_config::MarkdownConfig;

const FULL_WIDTH_START: u32 = 0xFF01;
const FULL_WIDTH_END: u32 = 0xFF5E;
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Fold full-width ASCII-range characters (`！` .. `～`) and the ideographic
/// space to their half-width forms.
pub fn fold_full_width(line: &str) -> String {
    line.chars()
        .map(|c| {
            let code = c as u32;
            if (FULL_WIDTH_START..=FULL_WIDTH_END).contains(&code) {
                char::from_u32(code - FULL_WIDTH_OFFSET).unwrap_or(c)
            } else if c == IDEOGRAPHIC_SPACE {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Normalize source lines for `target_language`.
///
/// Targets that natively use full-width punctuation keep their lines as-is.
/// A blank line is always appended so the last real line is never the final
/// input of the classifier.
pub fn preprocess<S: AsRef<str>>(target_language: &str, lines: &[S], config: &MarkdownConfig) -> Vec<String> {
    let keep_full_width = config.keeps_full_width(target_language);
    let mut normalized: Vec<String> = lines
        .iter()
        .map(|line| {
            if keep_full_width {
                line.as_ref().to_string()
            } else {
                fold_full_width(line.as_ref())
            }
        })
        .collect();
    normalized.push(String::new());
    normalized
}
