//! Run settings with an optional on-disk override.
//!
//! Settings are read from `settings.json` in the data directory. A missing
//! file, or one that fails to parse, leaves the built-in defaults in place;
//! command-line flags then override individual fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    similarity::SimilarityConfig,
    walker::WalkOptions,
};

/// Default number of words per shingle.
pub const DEFAULT_SHINGLE_SIZE: usize = 3;

/// Default minimum shared-shingle count for a pair to be reported.
pub const DEFAULT_THRESHOLD: u64 = 1;

/// Settings for one comparison run.
///
/// # Examples
///
/// ```
/// use docsim::config::{Settings, DEFAULT_SHINGLE_SIZE};
///
/// let settings: Settings =
///     serde_json::from_str(r#"{"threshold": 4}"#).unwrap();
/// assert_eq!(settings.threshold, 4);
/// assert_eq!(settings.shingle_size, DEFAULT_SHINGLE_SIZE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Words per shingle.
    pub shingle_size: usize,
    /// Minimum count reported.
    pub threshold: u64,
    /// Document file extensions, without the dot. Empty accepts any file.
    pub extensions: Vec<String>,
    /// Descend into subdirectories when discovering documents.
    pub recursive: bool,
    /// Optional bound on the postings list length per shingle.
    pub postings_cap: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shingle_size: DEFAULT_SHINGLE_SIZE,
            threshold: DEFAULT_THRESHOLD,
            extensions: vec!["txt".to_string(), "md".to_string()],
            recursive: false,
            postings_cap: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable settings file"
                );
                Self::default()
            }
        }
    }

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            recursive: self.recursive,
            extensions: self.extensions.clone(),
            include: None,
        }
    }

    pub fn similarity_config(&self) -> SimilarityConfig {
        SimilarityConfig {
            postings_cap: self.postings_cap,
        }
    }
}
