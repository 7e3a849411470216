/*!
 * Line classifier.
 *
 * A small state machine folded over the preprocessed lines of a document.
 * Front matter, code fences and do-not-translate regions are independent
 * toggles; every line is classified against the state left by the lines
 * before it.
 */

use log::warn;

use crate::app_config::{DEFAULT_WARNING, MarkdownConfig};

use super::segment::{ArrayStyle, IMAGE_OR_LINK_REGEX, Segment, SegmentKind};

pub const FRONT_MATTER_DELIMITER: &str = "---";
pub const CODE_FENCE: &str = "```";
pub const DO_NOT_TRANSLATE_MARKER: &str = "__do_not_translate__";

/// Key tables and banner used to classify one document for one target
#[derive(Debug, Clone)]
pub struct ClassifierRules<'a> {
    pub key_value_keys: &'a [String],
    pub transparent_keys: &'a [String],
    pub array_keys: &'a [String],
    /// Banner to insert once, or `None` when insertion is disabled
    pub disclaimer: Option<String>,
}

impl<'a> ClassifierRules<'a> {
    pub fn for_target(config: &'a MarkdownConfig, target_language: &str) -> Self {
        let disclaimer = config.insert_warnings.then(|| {
            config
                .warning_for(target_language)
                .unwrap_or_else(|| {
                    warn!("No warning text configured for {}, using the English one", target_language);
                    DEFAULT_WARNING
                })
                .to_string()
        });
        Self {
            key_value_keys: &config.front_matter_key_value_keys,
            transparent_keys: &config.front_matter_transparent_keys,
            array_keys: &config.front_matter_key_value_array_keys,
            disclaimer,
        }
    }

    fn disclaimer_segment(&self) -> Option<Segment> {
        self.disclaimer
            .as_ref()
            .map(|text| Segment::transparent(format!("\n> {}\n", text)))
    }
}

fn starts_with_any(line: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| line.starts_with(prefix.as_str()))
}

/// Scanner state carried from one line to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierState {
    pub in_front_matter: bool,
    pub in_code_block: bool,
    pub do_not_translate: bool,
    pub disclaimer_pending: bool,
    /// The last emitted segment is a block-style array still taking `- item` lines
    pub open_block_array: bool,
}

impl ClassifierState {
    pub fn new(disclaimer_enabled: bool) -> Self {
        Self {
            disclaimer_pending: disclaimer_enabled,
            ..Self::default()
        }
    }
}

/// What a single line turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Zero or more new segments, in order
    Emit(Vec<Segment>),
    /// An element of the block-style array emitted just before
    ArrayItem,
}

/// Classify one line against `state`, returning the next state
pub fn classify_line(mut state: ClassifierState, line: &str, rules: &ClassifierRules) -> (ClassifierState, Classified) {
    let continues_array = state.open_block_array;
    state.open_block_array = false;

    if line.trim() == FRONT_MATTER_DELIMITER {
        state.in_front_matter = !state.in_front_matter;
        let mut segments = vec![Segment::transparent(line)];
        if !state.in_front_matter && state.disclaimer_pending {
            segments.extend(rules.disclaimer_segment());
            state.disclaimer_pending = false;
        }
        return (state, Classified::Emit(segments));
    }

    if line.starts_with(CODE_FENCE) {
        state.in_code_block = !state.in_code_block;
        return (state, Classified::Emit(vec![Segment::transparent(line)]));
    }

    if line.starts_with(DO_NOT_TRANSLATE_MARKER) {
        state.do_not_translate = !state.do_not_translate;
        return (state, Classified::Emit(Vec::new()));
    }

    if state.in_front_matter {
        if continues_array && line.trim_start().starts_with("- ") {
            state.open_block_array = true;
            return (state, Classified::ArrayItem);
        }
        let segment = if starts_with_any(line, rules.key_value_keys) {
            Segment::key_value(line)
        } else if starts_with_any(line, rules.transparent_keys) {
            Segment::transparent(line)
        } else if starts_with_any(line, rules.array_keys) {
            let segment = Segment::key_value_array(line);
            state.open_block_array = matches!(
                segment.kind(),
                SegmentKind::KeyValueArray { style: ArrayStyle::Block, .. }
            );
            segment
        } else {
            Segment::solid(line)
        };
        return (state, Classified::Emit(vec![segment]));
    }

    if state.in_code_block || state.do_not_translate {
        return (state, Classified::Emit(vec![Segment::transparent(line)]));
    }

    let trimmed = line.trim();
    let segments = if trimmed.is_empty() || line.starts_with("<audio") || line.starts_with("<img ") {
        vec![Segment::transparent(line)]
    } else if IMAGE_OR_LINK_REGEX.is_match(line) {
        vec![Segment::image_or_link(line)]
    } else if trimmed.starts_with('#') {
        let mut segments = vec![Segment::title(line)];
        if trimmed.starts_with("# ") && state.disclaimer_pending {
            segments.extend(rules.disclaimer_segment());
            state.disclaimer_pending = false;
        }
        segments
    } else {
        vec![Segment::solid(line)]
    };
    (state, Classified::Emit(segments))
}

/// Classify every line of a document, in order
pub fn classify<S: AsRef<str>>(lines: &[S], rules: &ClassifierRules) -> Vec<Segment> {
    let mut state = ClassifierState::new(rules.disclaimer.is_some());
    let mut segments: Vec<Segment> = Vec::with_capacity(lines.len() + 1);

    for line in lines {
        let line = line.as_ref();
        let (next, classified) = classify_line(state, line, rules);
        state = next;
        match classified {
            Classified::Emit(new_segments) => segments.extend(new_segments),
            Classified::ArrayItem => {
                let appended = segments
                    .last_mut()
                    .is_some_and(|segment| segment.push_block_item(line));
                if !appended {
                    // keep the line rather than lose it
                    segments.push(Segment::solid(line));
                    state.open_block_array = false;
                }
            }
        }
    }

    segments
}
