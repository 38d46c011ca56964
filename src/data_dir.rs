use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "DOCSIM_DATA_DIR";

/// Directory holding the default corpus and `settings.json`.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `explicit` (from `--data-dir`) when given, otherwise the
    /// [`DATA_DIR_ENV`] variable, otherwise `$XDG_DATA_HOME/docsim`. The
    /// chosen directory is created if missing.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = match explicit {
            Some(path) => path.to_path_buf(),
            None => default_root()?,
        };
        Self::at(root)
    }

    /// Use `root` as is, creating it if needed.
    pub fn at(root: PathBuf) -> Result<Self> {
        match std::fs::create_dir_all(&root) {
            Ok(()) => Ok(Self { root }),
            Err(e) => {
                tracing::error!(
                    path = %root.display(),
                    error = %e,
                    "cannot create data directory"
                );
                Err(Error::DataDir(root))
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default corpus store location.
    pub fn corpus(&self) -> PathBuf {
        self.root.join("corpus.txt")
    }

    pub fn settings(&self) -> PathBuf {
        self.root.join("settings.json")
    }
}

/// An empty variable counts as unset.
fn default_root() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    xdg::BaseDirectories::with_prefix("docsim")
        .get_data_home()
        .ok_or_else(|| Error::Config("no XDG data home for docsim".into()))
}
