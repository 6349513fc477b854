//! Results directory scanner.
//!
//! Lists the sample files directly inside a results directory, applies
//! the optional category filter and validates every filename.

use crate::error::{AggregateError, AggregateResult};
use crate::models::SampleFile;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for directory scanning.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Keep only files whose category matches this filter.
    pub filter: Option<String>,
}

impl From<&crate::config::Config> for ScanConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            filter: config.aggregation.filter.clone(),
        }
    }
}

/// Scanner over one results directory.
pub struct ResultScanner {
    config: ScanConfig,
    root: PathBuf,
}

impl ResultScanner {
    /// Create a new scanner.
    pub fn new(root: PathBuf, config: ScanConfig) -> Self {
        Self { config, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List regular, non-hidden file names, sorted.
    pub fn list(&self) -> AggregateResult<Vec<String>> {
        if !self.root.is_dir() {
            return Err(AggregateError::MissingDirectory {
                path: self.root.clone(),
            });
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                AggregateError::Io {
                    path,
                    source: e.into(),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                debug!("Skipping hidden file {}", name);
                continue;
            }

            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    /// List, filter and validate the sample files.
    ///
    /// Fails on the first malformed filename.
    pub fn scan(&self) -> AggregateResult<Vec<SampleFile>> {
        let mut files = Vec::new();

        for name in self.list()? {
            let file = SampleFile::parse(&name)?;
            if self.matches(&file) {
                files.push(file);
            } else {
                debug!("Filtered out {}", name);
            }
        }

        if files.is_empty() {
            warn!("No sample files selected in {}", self.root.display());
        }

        Ok(files)
    }

    /// Check a file against the category filter.
    pub fn matches(&self, file: &SampleFile) -> bool {
        match self.config.filter.as_deref() {
            None | Some("") => true,
            Some(filter) => category_matches(file.category(), filter),
        }
    }
}

/// A category matches when it equals the filter or continues it after a space
/// (`normal 10` matches `normal`).
pub fn category_matches(category: &str, filter: &str) -> bool {
    match category.strip_prefix(filter) {
        Some(rest) => rest.is_empty() || rest.starts_with(' '),
        None => false,
    }
}
