use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),

    #[error("cannot create corpus store {}: {source}", path.display())]
    CorpusSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no more shingles")]
    Exhausted,

    #[error("byte position {position} is outside the corpus (0..={total})")]
    OutOfRange { position: u64, total: u64 },

    #[error("shingle size must be at least 1, got {0}")]
    InvalidShingleSize(usize),
}
