use crate::config::{normalize_extension, FilterConfig};
use regex::Regex;
use std::path::Path;

pub struct FileFilter {
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
    max_file_size: Option<u64>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let extensions = config
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();

        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            extensions,
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
            max_file_size: config.max_file_size,
        }
    }

    /// A file is selected when the part of its name after the final `.` is in
    /// the allow-set. A name with no dot never matches.
    pub fn is_selected(&self, path: &Path) -> bool {
        match path.extension().and_then(|s| s.to_str()) {
            Some(extension) => self.extensions.contains(&extension.to_lowercase()),
            None => false,
        }
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            let dir_name_lower = dir_name.to_lowercase();

            if self
                .exclude_dirs
                .iter()
                .any(|exclude| exclude.to_lowercase() == dir_name_lower)
            {
                return false;
            }

            let path_str = path.to_string_lossy();
            for pattern in &self.exclude_patterns {
                if pattern.is_match(&path_str) {
                    return false;
                }
            }
        }

        true
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        self.max_file_size.map_or(true, |max| size <= max)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn exclude_dirs(&self) -> &[String] {
        &self.exclude_dirs
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}
