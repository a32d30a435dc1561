use crate::config::{CliOverrides, Config, DecodePolicy};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repocat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concatenate a source tree into a single annotated text file")]
#[command(
    long_about = "RepoCat walks a directory tree, selects files whose extension is in the \
                       configured allow-set and appends each file's path and contents to a \
                       single output file for sharing and offline analysis."
)]
#[command(after_help = "EXAMPLES:\n  \
    repocat\n  \
    repocat path/to/repo --formats java,kt --output project.txt\n  \
    repocat --formats rs --exclude target,vendor --max-size 5\n  \
    repocat --config my-config.toml --dry-run\n\n\
    For more information, visit: https://github.com/user/repocat")]
pub struct Cli {
    /// Directory to scan (defaults to the current directory)
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Output file path (defaults to repo_export.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File formats to export (comma-separated)
    #[arg(
        short,
        long,
        help = "File extensions to export (e.g., java,kt or .rs,.toml)"
    )]
    pub formats: Option<String>,

    /// Directory names to exclude from the walk
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum file size in MB
    #[arg(long, help = "Skip files larger than this size (in MB)")]
    pub max_size: Option<u64>,

    /// Maximum traversal depth
    #[arg(long, help = "Do not descend deeper than this many directory levels")]
    pub max_depth: Option<usize>,

    /// Header delimiter token
    #[arg(long, help = "Token surrounding the file path in header lines")]
    pub delimiter: Option<String>,

    /// Decoding policy for file contents
    #[arg(long, value_enum, help = "How to handle bytes that are not valid UTF-8")]
    pub decode: Option<DecodeMode>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for console messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (list what would be exported without writing)
    #[arg(long, help = "Show what would be exported without actually doing it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DecodeMode {
    /// Replace invalid UTF-8 sequences with U+FFFD
    Replace,
    /// Drop invalid UTF-8 sequences silently
    Ignore,
    /// Record invalid UTF-8 as a per-file error
    Strict,
}

impl From<DecodeMode> for DecodePolicy {
    fn from(mode: DecodeMode) -> Self {
        match mode {
            DecodeMode::Replace => DecodePolicy::Replace,
            DecodeMode::Ignore => DecodePolicy::Ignore,
            DecodeMode::Strict => DecodePolicy::Strict,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let max_file_size = self.max_size.map(|size| size * 1024 * 1024); // Convert MB to bytes

        CliOverrides::new()
            .with_formats(self.formats.clone())
            .with_exclude(self.exclude.clone())
            .with_max_file_size(max_file_size)
            .with_max_depth(self.max_depth)
            .with_output_path(self.output.clone())
            .with_delimiter(self.delimiter.clone())
            .with_decode(self.decode.map(DecodePolicy::from))
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root() {
        let cli = Cli::parse_from(["repocat"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.output.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_formats_and_output() {
        let cli = Cli::parse_from([
            "repocat",
            "some/dir",
            "--formats",
            "java,kt",
            "--output",
            "bundle.txt",
        ]);

        assert_eq!(cli.root, PathBuf::from("some/dir"));
        assert_eq!(cli.formats.as_deref(), Some("java,kt"));
        assert_eq!(cli.output, Some(PathBuf::from("bundle.txt")));
    }

    #[test]
    fn test_exclude_delimiter() {
        let cli = Cli::parse_from(["repocat", "--exclude", "target,vendor"]);
        assert_eq!(
            cli.exclude,
            Some(vec!["target".to_string(), "vendor".to_string()])
        );
    }

    #[test]
    fn test_max_size_converted_to_bytes() {
        let cli = Cli::parse_from(["repocat", "--max-size", "5"]);
        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.max_file_size, Some(5 * 1024 * 1024));
    }

    #[test]
    fn test_decode_mode_mapping() {
        let cli = Cli::parse_from(["repocat", "--decode", "ignore"]);
        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.decode, Some(DecodePolicy::Ignore));
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["repocat", "-vv"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["repocat", "--quiet"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["repocat", "-v", "--quiet"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let cli = Cli::parse_from(["repocat", "--formats", ".rs", "--delimiter", "#####"]);
        let config = cli.load_config().unwrap();

        assert_eq!(config.filters.extensions, vec!["rs"]);
        assert_eq!(config.output.delimiter, "#####");
    }
}
