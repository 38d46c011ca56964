//! Document sources: named character streams handed to the shingler.

use std::{
    fs::File,
    io::{BufReader, Cursor, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    shingle::Shingler,
    walker::DiscoveredFile,
};

/// A document identified by a run-unique id and backed by a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    /// Identity used in byte-count records and reports.
    pub id: String,
    pub path: PathBuf,
}

impl DocumentSource {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Use the path relative to the discovery root as the document id.
    pub fn from_discovered(file: &DiscoveredFile) -> Self {
        Self {
            id: file.relative_path.to_string_lossy().to_string(),
            path: file.absolute_path.clone(),
        }
    }

    pub fn open(&self) -> Result<BufReader<File>> {
        open_document(&self.path)
    }

    /// Open the document and wrap it in a shingler.
    ///
    /// An unreadable document degrades to an empty shingle sequence.
    pub fn shingles(&self, n: usize) -> Result<Shingles> {
        if n == 0 {
            return Err(Error::InvalidShingleSize(n));
        }
        let inner = match self.open() {
            Ok(reader) => Some(Shingler::new(reader, n)?),
            Err(e) => {
                tracing::warn!(
                    document = %self.id,
                    error = %e,
                    "cannot open document, treating as empty"
                );
                None
            }
        };
        Ok(Shingles { inner })
    }
}

/// Shingles of one document; empty when the document could not be opened.
pub struct Shingles {
    inner: Option<Shingler<BufReader<File>>>,
}

impl Iterator for Shingles {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.as_mut()?.next()
    }
}

/// A document's id together with its fully materialized shingles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShingledDocument {
    pub id: String,
    pub shingles: Vec<String>,
}

pub fn open_document(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Read exactly `len` bytes of `path` starting at byte `start`.
///
/// Fails when the file ends before `start + len`.
pub fn partial_reader(
    path: &Path,
    start: u64,
    len: usize,
) -> Result<Cursor<Vec<u8>>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf)?;
    Ok(Cursor::new(buf))
}

/// Shingle every document in order, keeping all shingles in memory.
pub fn process_documents(
    sources: &[DocumentSource],
    n: usize,
) -> Result<Vec<ShingledDocument>> {
    if n == 0 {
        return Err(Error::InvalidShingleSize(n));
    }
    sources
        .iter()
        .map(|source| {
            Ok(ShingledDocument {
                id: source.id.clone(),
                shingles: source.shingles(n)?.collect(),
            })
        })
        .collect()
}
