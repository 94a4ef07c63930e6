// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use docs_i18n::app_config::{self, ChangeDetectionMode, Config};
use docs_i18n::app_controller::Controller;

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

/// CLI Wrapper for ChangeDetectionMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliChangeDetection {
    Hash,
    Mtime,
}

impl From<CliChangeDetection> for ChangeDetectionMode {
    fn from(cli_mode: CliChangeDetection) -> Self {
        match cli_mode {
            CliChangeDetection::Hash => ChangeDetectionMode::Hash,
            CliChangeDetection::Mtime => ChangeDetectionMode::Mtime,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate stale documents (default command)
    Translate(TranslateArgs),

    /// List documents and whether they need translation, without calling the API
    Status,

    /// Generate shell completions for docs-i18n
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct TranslateArgs {
    /// Translate every document, even unchanged ones
    #[arg(short, long)]
    force: bool,

    /// Exit with an error status if any document failed
    #[arg(long)]
    strict: bool,
}

/// docs-i18n - keep translated documentation in sync
#[derive(Parser, Debug)]
#[command(name = "docs-i18n")]
#[command(version)]
#[command(about = "Translate changed markdown documentation with a hosted LLM")]
#[command(long_about = "docs-i18n finds markdown files that changed since their last translation \
and translates them with the Gemini API, writing results to a mirrored output tree.

EXAMPLES:
    docs-i18n                                  # Translate using docs-i18n.json
    docs-i18n status                           # Show which files are stale
    docs-i18n translate --force                # Retranslate everything
    docs-i18n -m gemini-2.5-flash              # Use a single model, no fallback
    docs-i18n --change-detection mtime         # Compare modification times
    docs-i18n completions bash > docs-i18n.bash

CONFIGURATION:
    Configuration is stored in docs-i18n.json by default. If the file doesn't
    exist, a default one is created. The API key is read from GEMINI_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "docs-i18n.json")]
    config_path: PathBuf,

    /// Project root that mapping paths are relative to
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Model to use; repeat to build a priority list
    #[arg(short, long = "model", global = true)]
    models: Vec<String>,

    /// How to detect changed sources
    #[arg(long, global = true, value_enum)]
    change_detection: Option<CliChangeDetection>,

    /// Gemini API key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
    color: bool,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let color = std::env::var_os("NO_COLOR").is_none();
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace, color }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("⚠️ ", "1;33"),
            Level::Info => ("  ", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (emoji, color) = Self::decoration(record.level());
        let mut stderr = std::io::stderr();
        let _ = if self.color {
            writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args())
        } else {
            writeln!(stderr, "{} {} {}", now, emoji, record.args())
        };
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
            generate(shell, &mut cmd, "docs-i18n", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Status) => {
            let config = load_config(&cli, false)?;
            run_status(config, cli.root)
        }
        Some(Commands::Translate(_)) | None => {
            let args = cli.translate_args();
            let config = load_config(&cli, true)?;
            run_translate(config, cli.root, args).await
        }
    }
}

impl CommandLineOptions {
    /// Translate flags given either before or after the `translate` subcommand
    fn translate_args(&self) -> TranslateArgs {
        match &self.command {
            Some(Commands::Translate(args)) => TranslateArgs {
                force: args.force || self.translate.force,
                strict: args.strict || self.translate.strict,
            },
            _ => self.translate.clone(),
        }
    }
}

/// Load the config file and apply command line overrides
fn load_config(cli: &CommandLineOptions, require_api_key: bool) -> Result<Config> {
    // Apply the command line level first so config loading is logged at it
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    if !cli.models.is_empty() {
        config.models = cli.models.clone();
    }
    if let Some(mode) = &cli.change_detection {
        config.change_detection = mode.clone().into();
    }
    if let Some(api_key) = &cli.api_key {
        config.provider.api_key = api_key.clone();
    }
    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    config.validate(require_api_key)?;
    Ok(config)
}

async fn run_translate(config: Config, root: PathBuf, args: TranslateArgs) -> Result<()> {
    info!("Starting documentation translator for {}...", config.prompt.project_name);

    let controller = Controller::with_config(config, root)?.force(args.force);
    let summary = controller.run().await?;

    if summary.models_exhausted {
        return Err(anyhow!(
            "No model in the priority list is available; {} file(s) not attempted",
            summary.aborted
        ));
    }
    if args.strict && !summary.is_clean() {
        return Err(anyhow!("{} file(s) failed to translate", summary.failed));
    }
    if summary.failed > 0 {
        warn!("{} file(s) failed to translate", summary.failed);
    }

    info!("Translation complete.");
    Ok(())
}

fn run_status(config: Config, root: PathBuf) -> Result<()> {
    let controller = Controller::with_config(config, root)?;
    let statuses = controller.status()?;

    let stale = statuses.iter().filter(|s| s.stale).count();
    for status in &statuses {
        let source = status.job.source.strip_prefix(controller.root()).unwrap_or(&status.job.source);
        let marker = if status.stale { "stale" } else { "up-to-date" };
        println!("{:<11} {}", marker, source.display());
    }
    info!("{} of {} document(s) need translation", stale, statuses.len());
    Ok(())
}
