#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use yamtwai::app_config::{self, Config, TranslationProvider};
use yamtwai::file_utils::FileManager;
use yamtwai::errors::AppError;
use yamtwai::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate Markdown documents (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for yamtwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct TranslateArgs {
    /// Markdown files or folders holding the configured source documents
    #[arg(value_name = "INPUT_PATH")]
    input_paths: Vec<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'zh-CN')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code, repeat for several (e.g., '-t fr -t ja')
    #[arg(short, long = "target-language")]
    target_languages: Vec<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// YAMTwAI - Yet Another Markdown Translator with AI
///
/// Translates Markdown documents into several languages at once, keeping
/// front matter, code blocks and link targets intact.
#[derive(Parser, Debug)]
#[command(name = "yamtwai")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "AI-powered Markdown translation tool")]
#[command(long_about = "YAMTwAI translates Markdown documents line by line using AI providers.
Each document is written next to its source as <stem>.<lang>.md; existing
translations are never overwritten.

EXAMPLES:
    yamtwai README.md                            # Translate using default config
    yamtwai -t fr -t ja -t zh-TW docs/post/      # Translate a folder into three languages
    yamtwai -p openai -m gpt-4o-mini README.md   # Use specific provider and model
    yamtwai --log-level debug a/ b/ c/           # Several folders, one after the other
    yamtwai completions bash > yamtwai.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation, filtered through `log::max_level`
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yamtwai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

/// Load the config file, or write the default one when it is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let content = FileManager::read_to_string(config_path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(config_path, &config_json)?;
        Ok(config)
    }
}

/// Apply command line overrides on top of the file config
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.set_model(model);
    }
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if !options.target_languages.is_empty() {
        config.target_languages = options.target_languages.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    if options.input_paths.is_empty() {
        return Err(anyhow!("At least one INPUT_PATH is required"));
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);
    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))
        .context("Configuration validation failed")?;
    log::set_max_level(LevelFilter::from(&config.log_level));

    info!(
        "Current translator engine is: {} ({})",
        config.translation.provider.display_name(),
        config.translation.get_model()
    );

    // One controller for every input so the language pool is shared
    let controller = Controller::with_config(config)?;
    controller
        .check_connection()
        .await
        .context("Translation provider is not reachable")?;

    let mut failures = 0;
    for input_path in &options.input_paths {
        if !input_path.exists() {
            warn!("{:?} does not exist, Skipped!", input_path);
            continue;
        }
        match controller.run(input_path).await {
            Ok(reports) => failures += reports.iter().map(|r| r.failed()).sum::<usize>(),
            Err(e) => {
                error!("Failed to process {:?}: {}", input_path, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        warn!("{} translation(s) failed, see the errors above", failures);
    }
    Ok(())
}
