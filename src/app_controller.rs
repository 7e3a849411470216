use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use crate::app_config::Config;
use crate::errors::{AppError, DocumentError};
use crate::file_utils::FileManager;
use crate::markdown::MarkdownPipeline;
use crate::translation::{BatchTranslator, TranslationService};

// @module: Application controller for Markdown documents

/// Result of one target language for one document
#[derive(Debug)]
pub struct LanguageOutcome {
    pub target_language: String,
    /// Written output file, or why this language failed
    pub result: Result<PathBuf, DocumentError>,
}

/// Everything that happened to one source document
#[derive(Debug)]
pub struct DocumentReport {
    pub document: PathBuf,
    /// Languages skipped because their output already existed
    pub skipped: Vec<String>,
    pub outcomes: Vec<LanguageOutcome>,
    pub elapsed: Duration,
}

impl DocumentReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Main application controller for Markdown translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared, immutable segmentation pipeline
    pipeline: Arc<MarkdownPipeline>,
    // @field: Batch translation backend
    backend: Arc<dyn BatchTranslator>,
    // @field: Language worker pool, reused for every document
    language_slots: Arc<Semaphore>,
    // @field: Draw a progress bar per document
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(config.translation.clone())?;
        let mut controller = Self::with_backend(config, Arc::new(service))?;
        controller.show_progress = true;
        Ok(controller)
    }

    // @method: Create a controller around any batch backend
    pub fn with_backend(config: Config, backend: Arc<dyn BatchTranslator>) -> Result<Self> {
        let pipeline = MarkdownPipeline::new(config.markdown.clone())?;
        let workers = config.effective_concurrent_languages();
        debug!("Translating up to {} languages at once", workers);

        Ok(Self {
            pipeline: Arc::new(pipeline),
            backend,
            language_slots: Arc::new(Semaphore::new(workers)),
            show_progress: false,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make sure the backend answers before any document is touched
    pub async fn check_connection(&self) -> Result<(), AppError> {
        self.backend.check_connection().await?;
        debug!("Translation backend is reachable");
        Ok(())
    }

    /// Target languages whose output does not exist yet for `document`.
    /// Repeated languages are kept once, in first-seen order.
    pub fn pending_languages(&self, document: &Path) -> (Vec<String>, Vec<String>) {
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        let mut skipped = Vec::new();
        for target in &self.config.target_languages {
            if !seen.insert(target.as_str()) {
                debug!("{} is listed more than once, translating it once", target);
                continue;
            }
            let output = FileManager::generate_output_path(document, target);
            if FileManager::file_exists(&output) {
                warn!("{:?} already exists, Skipped!", output.file_name().unwrap_or_default());
                skipped.push(target.clone());
            } else {
                pending.push(target.clone());
            }
        }
        (pending, skipped)
    }

    /// Translate one document into every pending target language
    pub async fn translate_document(&self, document: &Path) -> Result<DocumentReport, DocumentError> {
        let start_time = Instant::now();
        let (pending, skipped) = self.pending_languages(document);
        if pending.is_empty() {
            return Ok(DocumentReport {
                document: document.to_path_buf(),
                skipped,
                outcomes: Vec::new(),
                elapsed: start_time.elapsed(),
            });
        }

        let source: Arc<str> = tokio::fs::read_to_string(document)
            .await
            .map_err(|source| DocumentError::Read {
                path: document.to_path_buf(),
                source,
            })?
            .into();
        let document_name = document
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| document.display().to_string());

        let progress = self.progress_bar(pending.len() as u64, &document_name);

        let mut handles = Vec::with_capacity(pending.len());
        for target in &pending {
            let task = LanguageTask {
                pipeline: Arc::clone(&self.pipeline),
                backend: Arc::clone(&self.backend),
                source: Arc::clone(&source),
                document: document.to_path_buf(),
                document_name: document_name.clone(),
                source_language: self.config.source_language.clone(),
                target_language: target.clone(),
            };
            let slots = Arc::clone(&self.language_slots);
            let progress = progress.clone();
            handles.push(tokio::spawn(async move {
                let target_language = task.target_language.clone();
                let result = match slots.acquire_owned().await {
                    Ok(_permit) => task.run().await,
                    Err(e) => Err(DocumentError::TaskAborted {
                        target_language: target_language.clone(),
                        message: e.to_string(),
                    }),
                };
                progress.inc(1);
                result
            }));
        }

        let joined = futures::future::join_all(handles).await;
        let mut outcomes = Vec::with_capacity(pending.len());
        for (target, joined) in pending.into_iter().zip(joined) {
            let result = joined.unwrap_or_else(|e| {
                Err(DocumentError::TaskAborted {
                    target_language: target.clone(),
                    message: e.to_string(),
                })
            });
            match &result {
                Ok(path) => info!("{} -> {} completed: {:?}", document_name, target, path),
                Err(e) => error!("Error occurred when translating {} to {}: {}", document_name, target, e),
            }
            outcomes.push(LanguageOutcome {
                target_language: target,
                result,
            });
        }
        progress.finish_and_clear();

        let elapsed = start_time.elapsed();
        let average = elapsed / outcomes.len() as u32;
        info!(
            "Total time cost: {}, average per lang cost: {}",
            Self::format_duration(elapsed),
            Self::format_duration(average)
        );

        Ok(DocumentReport {
            document: document.to_path_buf(),
            skipped,
            outcomes,
            elapsed,
        })
    }

    /// Run on one path: a Markdown file, or a folder holding the configured source names
    pub async fn run(&self, input_path: &Path) -> Result<Vec<DocumentReport>, AppError> {
        if FileManager::file_exists(input_path) {
            let report = self.translate_document(input_path).await?;
            return Ok(vec![report]);
        }
        if FileManager::dir_exists(input_path) {
            return self.run_folder(input_path).await;
        }
        Err(AppError::File(format!("{:?} does not exist", input_path)))
    }

    /// Translate every configured source document found in `input_dir`
    pub async fn run_folder(&self, input_dir: &Path) -> Result<Vec<DocumentReport>, AppError> {
        info!("Current folder is: {:?}", input_dir);
        let documents = FileManager::find_source_documents(input_dir, &self.config.source_filenames)?;
        if documents.is_empty() {
            warn!(
                "{:?} does not contain any of {:?}, Skipped!",
                input_dir, self.config.source_filenames
            );
            return Ok(Vec::new());
        }

        let mut reports = Vec::with_capacity(documents.len());
        for document in documents {
            match self.translate_document(&document).await {
                Ok(report) => reports.push(report),
                Err(e) => error!("Skipping {:?}: {}", document, e),
            }
        }
        Ok(reports)
    }

    fn progress_bar(&self, len: u64, document_name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress_bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} languages {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(document_name.to_string());
        progress_bar
    }

    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Owned inputs of one (document, language) task
struct LanguageTask {
    pipeline: Arc<MarkdownPipeline>,
    backend: Arc<dyn BatchTranslator>,
    source: Arc<str>,
    document: PathBuf,
    document_name: String,
    source_language: String,
    target_language: String,
}

impl LanguageTask {
    async fn run(self) -> Result<PathBuf, DocumentError> {
        info!("Translating {} to {}", self.document_name, self.target_language);

        let translated = self
            .pipeline
            .translate(
                &self.source,
                self.backend.as_ref(),
                &self.source_language,
                &self.target_language,
                &self.document_name,
            )
            .await
            .map_err(|source| DocumentError::Translation {
                document: self.document_name.clone(),
                target_language: self.target_language.clone(),
                source,
            })?;

        let output = FileManager::generate_output_path(&self.document, &self.target_language);
        tokio::fs::write(&output, translated)
            .await
            .map_err(|source| DocumentError::Write {
                path: output.clone(),
                source,
            })?;
        Ok(output)
    }
}
