/*!
 * Translation backends for Markdown batches.
 *
 * - `batch`: the `BatchTranslator` trait the Markdown pipeline talks to
 * - `core`: the LLM-backed `TranslationService`
 * - `concurrency`: per-provider concurrency defaults
 */

pub use self::batch::BatchTranslator;
pub use self::core::TranslationService;

pub mod batch;
pub mod concurrency;
pub mod core;
