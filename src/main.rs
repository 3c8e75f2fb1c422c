// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subator::app_config::{self, Config, TranslationProvider};
use subator::app_controller::Controller;
use subator::file_utils::FileManager;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Zhipu,
    Qwen,
    OpenAI,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Zhipu => TranslationProvider::Zhipu,
            CliTranslationProvider::Qwen => TranslationProvider::Qwen,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Translation overrides shared by `run` and `translate`
#[derive(Parser, Debug, Clone)]
struct TranslationArgs {
    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the provider
    #[arg(long, env = "SUBATOR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Domain persona added to the prompt, e.g. "你是一名芯片专家"
    #[arg(long)]
    persona: Option<String>,
}

impl TranslationArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.translation.provider = provider.clone().into();
        }
        if let Some(model) = &self.model {
            config.translation.model = model.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.translation.api_key = api_key.clone();
        }
        if let Some(persona) = &self.persona {
            config.translation.persona = persona.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download, transcribe, translate, split and align one video
    Run {
        /// Video URL
        url: String,

        /// Directory under which `<author>/<title>/` is created
        #[arg(short, long, default_value = ".")]
        save_dir: PathBuf,

        /// Do not wait for Enter between stages
        #[arg(long)]
        no_pause: bool,

        #[command(flatten)]
        translation: TranslationArgs,
    },

    /// Build one sentence per line from a word-level transcript
    Sentences {
        /// Transcript JSON (`word_segments` or a word array)
        transcript: PathBuf,

        #[arg(short, long, default_value = "en.txt")]
        output: PathBuf,
    },

    /// Translate a sentence file line by line
    Translate {
        #[arg(default_value = "en.txt")]
        input: PathBuf,

        #[arg(short, long, default_value = "ch.txt")]
        output: PathBuf,

        /// File receiving the lines that need review
        #[arg(long, default_value = "review.log")]
        review_log: PathBuf,

        #[command(flatten)]
        translation: TranslationArgs,
    },

    /// Split sentence pairs into subtitle-sized fragments
    Split {
        #[arg(default_value = "en.txt")]
        source: PathBuf,

        #[arg(default_value = "ch.txt")]
        target: PathBuf,

        #[arg(short, long, default_value = "fragments.json")]
        output: PathBuf,
    },

    /// Time the fragments with the transcript and write the subtitle files
    Align {
        #[arg(default_value = "fragments.json")]
        fragments: PathBuf,

        /// Transcript JSON the sentences were built from
        transcript: PathBuf,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Generate shell completions for subator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subator - bilingual subtitles for English videos
#[derive(Parser, Debug)]
#[command(name = "subator")]
#[command(version)]
#[command(about = "Bilingual English/Chinese subtitle generation")]
#[command(long_about = "subator transcribes an English video, translates it sentence by sentence into Chinese,
splits both languages into subtitle-sized fragments and times them with the transcript.

EXAMPLES:
    subator run https://www.youtube.com/watch?v=ID -s videos   # Whole pipeline
    subator sentences audio.json                               # Transcript to en.txt
    subator translate en.txt -o ch.txt --persona 你是一名芯片专家
    subator split en.txt ch.txt -o fragments.json
    subator align fragments.json audio.json -o .               # en.srt, ch.srt, bilingual.srt
    subator completions bash > subator.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Load the configuration file, creating it with defaults when missing
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let content = FileManager::read_to_string(config_path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(config_path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subator", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_config(&cli.config_path)?;
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(level_filter(&config.log_level));

    match cli.command {
        Commands::Run {
            url,
            save_dir,
            no_pause,
            translation,
        } => {
            translation.apply(&mut config);
            let controller = Controller::with_config(config)?;
            controller.config().validate_for_translation()?;
            let layout = controller.run(&url, &save_dir, !no_pause).await?;
            info!("Done: {:?}", layout.root());
        }
        Commands::Sentences { transcript, output } => {
            Controller::with_config(config)?.build_sentences(&transcript, &output)?;
        }
        Commands::Translate {
            input,
            output,
            review_log,
            translation,
        } => {
            translation.apply(&mut config);
            let outcome = Controller::with_config(config)?
                .translate_file(&input, &output, &review_log)
                .await?;
            let flagged = outcome.flagged().count();
            if flagged > 0 {
                warn!("{} line(s) need review, see {:?}", flagged, review_log);
            }
        }
        Commands::Split { source, target, output } => {
            Controller::with_config(config)?.split_files(&source, &target, &output)?;
        }
        Commands::Align {
            fragments,
            transcript,
            output_dir,
        } => {
            let written = Controller::with_config(config)?.align_files(&fragments, &transcript, &output_dir)?;
            for path in written {
                info!("Success: {:?}", path);
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
