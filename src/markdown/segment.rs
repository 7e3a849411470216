/*!
 * Typed document segments.
 *
 * A segment is one classified piece of a Markdown document. It knows which
 * lines it contributes to the translation batch and how to rebuild its output
 * once the translated lines for it have been spliced in.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Inline image or link: `[label](target)` or `![alt](target)`
pub static IMAGE_OR_LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!?\[[^\]]*\]\([^)]*\)").unwrap());

/// The `(target)` half of an image or link, starting at the closing bracket
static LINK_TARGET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\(([^)]*)\)").unwrap());

/// One element of a YAML block sequence: `  - value`
static BLOCK_ITEM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*-\s+)(.*)$").unwrap());

/// Heading markers with their indentation and trailing blanks
static TITLE_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*#+\s*)(.*)$").unwrap());

/// Translated text of a segment, filled once by the splice
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TranslatedValue {
    #[default]
    Pending,
    Filled(Vec<String>),
}

/// A scalar that may have been wrapped in YAML quotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedText {
    pub text: String,
    pub quote: Option<char>,
}

impl QuotedText {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        for quote in ['"', '\''] {
            if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
                return Self {
                    text: raw[1..raw.len() - 1].to_string(),
                    quote: Some(quote),
                };
            }
        }
        Self { text: raw.to_string(), quote: None }
    }

    /// Render `value` with this scalar's quoting
    fn render(&self, value: &str) -> String {
        let value = value.trim();
        match self.quote {
            Some(quote) => {
                let inner = value
                    .strip_prefix(quote)
                    .and_then(|v| v.strip_suffix(quote))
                    .unwrap_or(value);
                format!("{}{}{}", quote, inner, quote)
            }
            None => value.to_string(),
        }
    }
}

/// Array element with the text that precedes it on its own line (block style)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayItem {
    pub prefix: String,
    pub value: QuotedText,
}

/// Layout of a front-matter array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayStyle {
    /// `key: [a, b]`
    Flow,
    /// `key:` followed by `- a` lines
    Block,
    /// `key: a`
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Transparent { line: String },
    Solid { line: String },
    Title { prefix: String, text: String },
    ImageOrLink { line: String, template: String, targets: Vec<String> },
    KeyValue { key: String, value: QuotedText },
    KeyValueArray { key: String, style: ArrayStyle, items: Vec<ArrayItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    kind: SegmentKind,
    value: TranslatedValue,
}

impl Segment {
    fn new(kind: SegmentKind) -> Self {
        Self { kind, value: TranslatedValue::Pending }
    }

    pub fn transparent(line: impl Into<String>) -> Self {
        Self::new(SegmentKind::Transparent { line: line.into() })
    }

    pub fn solid(line: impl Into<String>) -> Self {
        Self::new(SegmentKind::Solid { line: line.into() })
    }

    pub fn title(line: &str) -> Self {
        match TITLE_PREFIX_REGEX.captures(line) {
            Some(caps) => Self::new(SegmentKind::Title {
                prefix: caps[1].to_string(),
                text: caps[2].trim_end().to_string(),
            }),
            None => Self::solid(line),
        }
    }

    /// Image or link line; targets are stripped from the batch text and put
    /// back by position when composing.
    pub fn image_or_link(line: &str) -> Self {
        let targets = LINK_TARGET_REGEX
            .captures_iter(line)
            .map(|caps| caps[1].to_string())
            .collect();
        let template = LINK_TARGET_REGEX.replace_all(line, "]()").into_owned();
        Self::new(SegmentKind::ImageOrLink {
            line: line.to_string(),
            template,
            targets,
        })
    }

    /// Front-matter scalar; lines without a `:` degrade to plain prose
    pub fn key_value(line: &str) -> Self {
        match line.split_once(':') {
            Some((key, value)) => Self::new(SegmentKind::KeyValue {
                key: key.to_string(),
                value: QuotedText::parse(value),
            }),
            None => Self::solid(line),
        }
    }

    /// Front-matter array in flow, block or bare style
    pub fn key_value_array(line: &str) -> Self {
        let Some((key, value)) = line.split_once(':') else {
            return Self::solid(line);
        };
        let value = value.trim();
        let (style, items) = if value.is_empty() {
            (ArrayStyle::Block, Vec::new())
        } else if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            let items = split_flow_items(inner)
                .into_iter()
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| ArrayItem {
                    prefix: String::new(),
                    value: QuotedText::parse(item),
                })
                .collect();
            (ArrayStyle::Flow, items)
        } else {
            let item = ArrayItem {
                prefix: String::new(),
                value: QuotedText::parse(value),
            };
            (ArrayStyle::Bare, vec![item])
        };
        Self::new(SegmentKind::KeyValueArray {
            key: key.to_string(),
            style,
            items,
        })
    }

    /// Append `line` to a block-style array if it is one of its `- item` lines.
    /// Returns false, leaving the segment untouched, otherwise.
    pub fn push_block_item(&mut self, line: &str) -> bool {
        let SegmentKind::KeyValueArray { style: ArrayStyle::Block, items, .. } = &mut self.kind else {
            return false;
        };
        match BLOCK_ITEM_REGEX.captures(line) {
            Some(caps) => {
                items.push(ArrayItem {
                    prefix: caps[1].to_string(),
                    value: QuotedText::parse(&caps[2]),
                });
                true
            }
            None => false,
        }
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn value(&self) -> &TranslatedValue {
        &self.value
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self.kind, SegmentKind::Transparent { .. })
    }

    /// Lines this segment submits to the batch, in order
    pub fn translatable_text(&self) -> Vec<String> {
        match &self.kind {
            SegmentKind::Transparent { .. } => Vec::new(),
            SegmentKind::Solid { line } => vec![line.clone()],
            SegmentKind::Title { text, .. } => vec![text.clone()],
            SegmentKind::ImageOrLink { template, .. } => vec![template.clone()],
            SegmentKind::KeyValue { value, .. } => vec![value.text.clone()],
            SegmentKind::KeyValueArray { items, .. } => {
                items.iter().map(|item| item.value.text.clone()).collect()
            }
        }
    }

    /// Number of translated lines this segment consumes from the response
    pub fn expected_line_count(&self) -> usize {
        match &self.kind {
            SegmentKind::Transparent { .. } => 0,
            SegmentKind::KeyValueArray { items, .. } => items.len(),
            _ => 1,
        }
    }

    /// Store the translated lines for this segment
    pub(crate) fn fill(&mut self, lines: Vec<String>) {
        debug_assert_eq!(lines.len(), self.expected_line_count());
        self.value = TranslatedValue::Filled(lines);
    }

    /// Rebuild this segment's output, one `\n`-terminated line per output line.
    /// A segment that was never filled is rebuilt from its source text.
    pub fn compose(&self) -> String {
        let source;
        let values: &[String] = match &self.value {
            TranslatedValue::Filled(lines) => lines,
            TranslatedValue::Pending => {
                source = self.translatable_text();
                &source
            }
        };
        let first = values.first().map(String::as_str).unwrap_or_default();

        match &self.kind {
            SegmentKind::Transparent { line } => format!("{}\n", line),
            SegmentKind::Solid { .. } => format!("{}\n", first),
            SegmentKind::Title { prefix, .. } => format!("{}{}\n", prefix, first.trim()),
            SegmentKind::ImageOrLink { targets, .. } => {
                format!("{}\n", restore_link_targets(first, targets))
            }
            SegmentKind::KeyValue { key, value } => format!("{}: {}\n", key, value.render(first)),
            SegmentKind::KeyValueArray { key, style, items } => {
                let rendered = items.iter().zip(values).map(|(item, v)| (item, item.value.render(v)));
                match style {
                    ArrayStyle::Flow => {
                        let joined: Vec<String> = rendered.map(|(_, v)| v).collect();
                        format!("{}: [{}]\n", key, joined.join(", "))
                    }
                    ArrayStyle::Bare => {
                        let joined: Vec<String> = rendered.map(|(_, v)| v).collect();
                        format!("{}: {}\n", key, joined.join(", "))
                    }
                    ArrayStyle::Block => {
                        let mut out = format!("{}:\n", key);
                        for (item, v) in rendered {
                            out.push_str(&item.prefix);
                            out.push_str(&v);
                            out.push('\n');
                        }
                        out
                    }
                }
            }
        }
    }
}

/// Split the inside of a `[a, b]` flow sequence on commas outside quotes.
/// A quote only opens at the start of an item, so `don't` stays plain.
fn split_flow_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut open_quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match (open_quote, c) {
            (None, '"' | '\'') if inner[start..i].trim().is_empty() => open_quote = Some(c),
            (Some(quote), _) if c == quote => open_quote = None,
            (None, ',') => {
                items.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&inner[start..]);
    items
}

/// Put the original `(target)` parts back into a translated line, by position.
/// Links the translation dropped lose their target; extra ones keep theirs.
fn restore_link_targets(translated: &str, targets: &[String]) -> String {
    let mut index = 0;
    LINK_TARGET_REGEX
        .replace_all(translated, |caps: &regex::Captures| {
            let restored = match targets.get(index) {
                Some(target) => format!("]({})", target),
                None => caps[0].to_string(),
            };
            index += 1;
            restored
        })
        .into_owned()
}
