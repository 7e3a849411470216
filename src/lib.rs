/*!
 * # YAMTwAI - Yet Another Markdown Translator with AI
 *
 * A Rust library for translating Markdown documents line by line using AI,
 * without ever parsing them into a tree.
 *
 * ## Features
 *
 * - Line classification with front matter, code fences and do-not-translate regions
 * - One batch request per document and language, realigned by position
 * - Translate with various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 *   - LM Studio (OpenAI-compatible)
 * - Machine translation disclaimer after the front matter or the first top-level heading
 * - Script-boundary spacing for mixed CJK and Latin text
 * - Concurrent languages with per-language failure isolation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `markdown`: Segmentation, realignment and post-processing:
 *   - `markdown::classifier`: Line state machine
 *   - `markdown::segment`: Segment kinds and their batch contract
 *   - `markdown::realign`: Batch extraction and splice
 *   - `markdown::expansion`: Script-boundary spacing
 * - `translation`: AI-powered batch translation
 * - `providers`: Client implementations for various LLM providers
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![cfg_attr(test, allow(non_snake_case))]

pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod markdown;
pub mod providers;
pub mod translation;

pub use app_config::Config;
pub use app_controller::{Controller, DocumentReport, LanguageOutcome};
pub use errors::{AppError, DocumentError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use markdown::MarkdownPipeline;
pub use translation::{BatchTranslator, TranslationService};
