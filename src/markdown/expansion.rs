/*!
 * Script-boundary spacing.
 *
 * After translation, a line that mixes a wide script (Han, kana, Hangul)
 * with Latin words gets a space wherever a letter or digit of one side
 * touches a letter or digit of the other. The last emitted character is
 * carried across lines, so the first run of a line is compared with the
 * end of the previous non-blank line. Transparent segments are copied
 * untouched and do not move the carried character.
 */

use anyhow::{Context, Result};
use regex::Regex;

use crate::app_config::MarkdownConfig;

use super::segment::Segment;

/// Compiled spacing rules for one run
#[derive(Debug, Clone)]
pub struct Expander {
    wide_run: Regex,
    config: MarkdownConfig,
}

impl Expander {
    pub fn new(config: &MarkdownConfig) -> Result<Self> {
        let wide_run = Regex::new(&config.script_run_pattern)
            .with_context(|| format!("Invalid script_run_pattern: {}", config.script_run_pattern))?;
        Ok(Self {
            wide_run,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &MarkdownConfig {
        &self.config
    }

    pub fn is_compact(&self, target_language: &str) -> bool {
        self.config.is_compact(target_language)
    }

    fn is_wide(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.wide_run.is_match(c.encode_utf8(&mut buf))
    }

    /// Split `line` into alternating wide and narrow runs
    pub fn split_runs<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let mut parts = Vec::new();
        let mut last = 0;
        for m in self.wide_run.find_iter(line) {
            if m.start() > last {
                parts.push(&line[last..m.start()]);
            }
            parts.push(m.as_str());
            last = m.end();
        }
        if last < line.len() {
            parts.push(&line[last..]);
        }
        parts
    }

    /// Whether `part` needs a space before it when it follows `last_char`
    fn needs_leading_space(&self, part: &str, last_char: Option<char>) -> bool {
        let (Some(prev), Some(first)) = (last_char, part.chars().next()) else {
            return false;
        };
        prev.is_alphanumeric() && first.is_alphanumeric() && self.is_wide(prev) != self.is_wide(first)
    }

    /// Append one spaced line (without its newline) to `output`
    fn expand_line(&self, line: &str, last_char: &mut Option<char>, output: &mut String) {
        if line.trim().is_empty() {
            output.push_str(line);
            return;
        }
        for part in self.split_runs(line) {
            if self.needs_leading_space(part, *last_char) {
                output.push(' ');
            }
            output.push_str(part);
            *last_char = part.chars().last().or(*last_char);
        }
    }

    /// Expand a block of translated text for `target_language`
    pub fn expand(&self, text: &str, target_language: &str) -> String {
        let compact = self.is_compact(target_language);
        let mut output = String::with_capacity(text.len() + text.len() / 8);
        let mut last_char: Option<char> = None;

        for line in text.lines() {
            if compact {
                output.push_str(line);
            } else {
                self.expand_line(line, &mut last_char, &mut output);
            }
            output.push('\n');
        }

        output.trim_end_matches('\n').to_string()
    }

    /// Compose and expand a whole document, leaving transparent segments byte-identical
    pub fn expand_segments(&self, segments: &[Segment], target_language: &str) -> String {
        let compact = self.is_compact(target_language);
        let mut output = String::new();
        let mut last_char: Option<char> = None;

        for segment in segments {
            let composed = segment.compose();
            if compact || segment.is_transparent() {
                output.push_str(&composed);
                continue;
            }
            for line in composed.lines() {
                self.expand_line(line, &mut last_char, &mut output);
                output.push('\n');
            }
        }

        output.trim_end_matches('\n').to_string()
    }
}
