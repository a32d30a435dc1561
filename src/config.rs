use crate::error::{RepoCatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub filters: FilterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    pub extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_file_size: Option<u64>,
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub delimiter: String,
    pub decode: DecodePolicy,
}

/// How file bytes are turned into text before they reach the output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Replace invalid UTF-8 sequences with U+FFFD.
    #[default]
    Replace,
    /// Drop invalid UTF-8 sequences silently.
    Ignore,
    /// Treat invalid UTF-8 as a per-file read error.
    Strict,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filters: FilterConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["java".to_string()],
            exclude_dirs: vec![".git".to_string()],
            exclude_patterns: Vec::new(),
            max_file_size: None,
            max_depth: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("repo_export.txt"),
            delimiter: "=====".to_string(),
            decode: DecodePolicy::default(),
        }
    }
}

/// Normalize a configured extension entry: entries may be written with or
/// without the leading dot and in any case.
pub fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_lowercase()
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RepoCatError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RepoCatError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| RepoCatError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["repocat.toml", "repocat.config.toml", ".repocat.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref formats) = cli_args.formats {
            self.filters.extensions = formats
                .split(',')
                .map(normalize_extension)
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.filters.exclude_dirs.extend(exclude.clone());
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.filters.max_file_size = Some(max_size);
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.filters.max_depth = Some(max_depth);
        }

        if let Some(ref output_path) = cli_args.output_path {
            self.output.path = output_path.clone();
        }

        if let Some(ref delimiter) = cli_args.delimiter {
            self.output.delimiter = delimiter.clone();
        }

        if let Some(decode) = cli_args.decode {
            self.output.decode = decode;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| RepoCatError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| RepoCatError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        // An empty allow-set is valid: the run produces an empty artifact.

        if self.output.delimiter.is_empty() {
            return Err(RepoCatError::Config {
                message: "Header delimiter must not be empty".to_string(),
            });
        }

        if self.filters.max_file_size == Some(0) {
            return Err(RepoCatError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if self.filters.max_depth == Some(0) {
            return Err(RepoCatError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if let Some(parent) = self.output.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(RepoCatError::Config {
                    message: format!("Parent directory does not exist: {}", parent.display()),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub formats: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub max_depth: Option<usize>,
    pub output_path: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub decode: Option<DecodePolicy>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(mut self, formats: Option<String>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_output_path(mut self, output_path: Option<PathBuf>) -> Self {
        self.output_path = output_path;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<String>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_decode(mut self, decode: Option<DecodePolicy>) -> Self {
        self.decode = decode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.filters.extensions, vec!["java"]);
        assert_eq!(config.filters.exclude_dirs, vec![".git"]);
        assert_eq!(config.output.path, PathBuf::from("repo_export.txt"));
        assert_eq!(config.output.delimiter, "=====");
        assert_eq!(config.output.decode, DecodePolicy::Replace);
    }

    #[test]
    fn test_empty_allow_set_is_valid() {
        let mut config = Config::default();
        config.filters.extensions.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.output.delimiter.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.filters.max_file_size = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.path = PathBuf::from("no/such/dir/out.txt");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.delimiter, loaded_config.output.delimiter);
        assert_eq!(config.filters.extensions, loaded_config.filters.extensions);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_formats(Some(".Java, rs,".to_string()))
            .with_output_path(Some(PathBuf::from("bundle.txt")))
            .with_decode(Some(DecodePolicy::Strict));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.filters.extensions, vec!["java", "rs"]);
        assert_eq!(config.output.path, PathBuf::from("bundle.txt"));
        assert_eq!(config.output.decode, DecodePolicy::Strict);
    }

    #[test]
    fn test_exclude_overrides_extend() {
        let mut config = Config::default();
        let overrides = CliOverrides::new().with_exclude(Some(vec!["target".to_string()]));
        config.merge_with_cli_args(&overrides);

        assert!(config.filters.exclude_dirs.contains(&".git".to_string()));
        assert!(config.filters.exclude_dirs.contains(&"target".to_string()));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".java"), "java");
        assert_eq!(normalize_extension("RS"), "rs");
        assert_eq!(normalize_extension("  .Md "), "md");
        assert_eq!(normalize_extension("txt"), "txt");
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[filters]"));
        assert!(sample.contains("[output]"));
    }
}
