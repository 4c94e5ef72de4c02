//! Command-line interface and session configuration.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`SessionConfig`] - everything one analysis run needs, loadable from TOML
//!
//! Command-line flags override values from the configuration file.
//!
//! # Example session file
//!
//! ```toml
//! your_name = "Me"
//! target_name = "Kate"
//! vkopt_file = "vk_dialog.txt"
//! telegram_file = "telegram.json"
//! target_id = 99990
//! output_dir = "results"
//!
//! [vkopt]
//! encoding = "utf-16-le"
//! utc_offset_minutes = 180
//!
//! [analysis]
//! utc_offset_minutes = 180
//! top_n = 20
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, NormalizeConfig, TelegramConfig, VkOptConfig};
use crate::error::ChatstatError;
use crate::ingest::{Ingestor, Source};

/// Normalize Telegram and vkOpt dialogues and compute chart-ready statistics.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "chatstat")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatstat --vkopt vk.txt --your-name Me --target-name Kate
    chatstat --telegram tg.json --target-id 99990 --your-name Me --target-name Kate -o results
    chatstat --from-cache results/messages.json --your-name Me --target-name Kate
    chatstat --config session.toml --verbose")]
pub struct Args {
    /// Session configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// vkOpt TXT export
    #[arg(long, value_name = "FILE")]
    pub vkopt: Option<PathBuf>,

    /// Telegram API messages saved as JSON
    #[arg(long, value_name = "FILE")]
    pub telegram: Option<PathBuf>,

    /// Previously stored messages.json
    #[arg(long, value_name = "FILE")]
    pub from_cache: Option<PathBuf>,

    /// Your display name
    #[arg(long, value_name = "NAME")]
    pub your_name: Option<String>,

    /// Dialogue partner's display name
    #[arg(long, value_name = "NAME")]
    pub target_name: Option<String>,

    /// Dialogue partner's Telegram sender id
    #[arg(long, value_name = "ID")]
    pub target_id: Option<i64>,

    /// Words of interest, one per line
    #[arg(long, value_name = "FILE")]
    pub words: Option<PathBuf>,

    /// Local time zone of the exports and charts, minutes east of UTC
    #[arg(long, value_name = "MINUTES", allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Also write the normalized messages (messages.json)
    #[arg(long)]
    pub store_messages: bool,

    /// Show debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_top_words() -> usize {
    1000
}

/// Everything one analysis run needs.
///
/// # Example
///
/// ```rust
/// use chatstat::cli::SessionConfig;
///
/// let config = SessionConfig::from_toml_str(r#"
///     your_name = "Me"
///     target_name = "Kate"
///     vkopt_file = "vk.txt"
/// "#).unwrap();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.top_words, 1000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Your display name
    pub your_name: String,
    /// Dialogue partner's display name
    pub target_name: String,
    /// Dialogue partner's Telegram sender id
    pub target_id: Option<i64>,
    /// vkOpt TXT export
    pub vkopt_file: Option<PathBuf>,
    /// Telegram API messages as JSON
    pub telegram_file: Option<PathBuf>,
    /// Previously stored messages
    pub cache_file: Option<PathBuf>,
    /// Words of interest
    pub words_file: Option<PathBuf>,
    /// Where result files go (default: `results`)
    pub output_dir: PathBuf,
    /// Write `messages.json` as well
    pub store_messages: bool,
    /// Rows of `words.csv` (default: 1000)
    pub top_words: usize,
    /// vkOpt parser options
    pub vkopt: VkOptConfig,
    /// Normalizer options
    pub normalize: NormalizeConfig,
    /// Aggregation options
    pub analysis: AnalysisConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            your_name: String::new(),
            target_name: String::new(),
            target_id: None,
            vkopt_file: None,
            telegram_file: None,
            cache_file: None,
            words_file: None,
            output_dir: default_output_dir(),
            store_messages: false,
            top_words: default_top_words(),
            vkopt: VkOptConfig::default(),
            normalize: NormalizeConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parses a session from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ChatstatError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a session file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChatstatError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Builds the session from command-line arguments, reading `--config`
    /// first when given.
    pub fn from_args(args: &Args) -> Result<Self, ChatstatError> {
        let base = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(base.merge_args(args))
    }

    /// Overrides values with the flags that were given.
    #[must_use]
    pub fn merge_args(mut self, args: &Args) -> Self {
        if let Some(name) = &args.your_name {
            self.your_name.clone_from(name);
        }
        if let Some(name) = &args.target_name {
            self.target_name.clone_from(name);
        }
        if args.target_id.is_some() {
            self.target_id = args.target_id;
        }
        if args.vkopt.is_some() {
            self.vkopt_file.clone_from(&args.vkopt);
        }
        if args.telegram.is_some() {
            self.telegram_file.clone_from(&args.telegram);
        }
        if args.from_cache.is_some() {
            self.cache_file.clone_from(&args.from_cache);
        }
        if args.words.is_some() {
            self.words_file.clone_from(&args.words);
        }
        if let Some(minutes) = args.utc_offset {
            self.vkopt.utc_offset_minutes = minutes;
            self.analysis.utc_offset_minutes = minutes;
        }
        if let Some(dir) = &args.output {
            self.output_dir.clone_from(dir);
        }
        self.store_messages |= args.store_messages;
        self
    }

    /// Checks that the session can run.
    pub fn validate(&self) -> Result<(), ChatstatError> {
        if self.your_name.trim().is_empty() || self.target_name.trim().is_empty() {
            return Err(ChatstatError::invalid_config(
                "both --your-name and --target-name are required",
            ));
        }
        if self.vkopt_file.is_none() && self.telegram_file.is_none() && self.cache_file.is_none() {
            return Err(ChatstatError::invalid_config(
                "no source given; use --vkopt, --telegram or --from-cache",
            ));
        }
        self.vkopt.validate()?;
        self.analysis.validate()
    }

    /// Telegram parser options derived from the session.
    pub fn telegram_config(&self) -> TelegramConfig {
        let config = TelegramConfig::new(&self.your_name, &self.target_name);
        match self.target_id {
            Some(id) => config.with_target_id(id),
            None => config,
        }
    }

    /// An ingestor configured for this session.
    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new()
            .with_telegram(self.telegram_config())
            .with_vkopt(self.vkopt.clone())
            .with_normalize(self.normalize.clone())
    }

    /// The file sources of this session, cache first.
    pub fn sources(&self) -> Vec<Source> {
        let mut sources = Vec::new();
        if let Some(path) = &self.cache_file {
            sources.push(Source::CacheFile(path.clone()));
        }
        if let Some(path) = &self.vkopt_file {
            sources.push(Source::VkOptFile(path.clone()));
        }
        if let Some(path) = &self.telegram_file {
            sources.push(Source::TelegramFile(path.clone()));
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextEncoding;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("chatstat").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_args_parse() {
        let args = parse(&[
            "--vkopt", "vk.txt", "--your-name", "Me", "--target-name", "Kate",
            "--utc-offset", "-120", "-o", "out", "--store-messages",
        ]);
        assert_eq!(args.vkopt.as_deref(), Some(Path::new("vk.txt")));
        assert_eq!(args.utc_offset, Some(-120));
        assert!(args.store_messages);
        assert!(!args.verbose);
    }

    #[test]
    fn test_merge_args_overrides_file() {
        let base = SessionConfig::from_toml_str(
            r#"
            your_name = "Old"
            target_name = "Kate"
            output_dir = "from_file"
            "#,
        )
        .unwrap();
        let session = base.merge_args(&parse(&["--your-name", "Me", "--utc-offset", "180"]));
        assert_eq!(session.your_name, "Me");
        assert_eq!(session.target_name, "Kate");
        assert_eq!(session.output_dir, PathBuf::from("from_file"));
        assert_eq!(session.vkopt.utc_offset_minutes, 180);
        assert_eq!(session.analysis.utc_offset_minutes, 180);
    }

    #[test]
    fn test_toml_nested_sections() {
        let session = SessionConfig::from_toml_str(
            r#"
            your_name = "Me"
            target_name = "Kate"
            target_id = 99990

            [vkopt]
            encoding = "utf-16-le"

            [analysis]
            top_n = 3
            "#,
        )
        .unwrap();
        assert_eq!(session.vkopt.encoding, TextEncoding::Utf16Le);
        assert_eq!(session.analysis.top_n, 3);
        assert_eq!(session.analysis.minute_bin, 2);
        assert_eq!(session.telegram_config().target_id, Some(99990));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = SessionConfig::from_toml_str("your_name = ").unwrap_err();
        assert!(err.to_string().contains("Config file error"));
    }

    #[test]
    fn test_validate() {
        let mut session = SessionConfig::default();
        assert!(session.validate().is_err());
        session.your_name = "Me".into();
        session.target_name = "Kate".into();
        assert!(session.validate().is_err());
        session.vkopt_file = Some("vk.txt".into());
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_sources_order() {
        let session = SessionConfig {
            vkopt_file: Some("vk.txt".into()),
            telegram_file: Some("tg.json".into()),
            cache_file: Some("messages.json".into()),
            ..SessionConfig::default()
        };
        let labels: Vec<_> = session.sources().iter().map(Source::label).collect();
        assert_eq!(labels, vec!["messages.json", "vk.txt", "tg.json"]);
    }
}
