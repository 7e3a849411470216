/*!
 * Line-based Markdown segmentation and reassembly.
 *
 * - `preprocess`: full-width folding and the trailing blank line
 * - `segment`: the typed segments and their batch contract
 * - `classifier`: the line state machine producing segments
 * - `realign`: batch extraction, backend call and positional splice
 * - `expansion`: script-boundary spacing of the translated text
 * - `pipeline`: the above chained for one document and one language
 */

pub mod classifier;
pub mod expansion;
pub mod pipeline;
pub mod preprocess;
pub mod realign;
pub mod segment;

pub use self::classifier::{ClassifierRules, ClassifierState, classify, classify_line};
pub use self::expansion::Expander;
pub use self::pipeline::MarkdownPipeline;
pub use self::preprocess::preprocess;
pub use self::realign::{build_batch, fill_segments, splice, translate_segments};
pub use self::segment::{Segment, SegmentKind, TranslatedValue};
