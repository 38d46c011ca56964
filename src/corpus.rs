//! The corpus store: every document's shingles, space-terminated, in order.
//!
//! The corpus is a flat byte file with no header or embedded index. Its only
//! structure is the list of [`ByteCount`] records returned at write time,
//! which say how many bytes each document contributed.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    document::{DocumentSource, ShingledDocument},
    error::{Error, Result},
};

/// Separator written after every shingle.
pub const SEPARATOR: u8 = b' ';

/// Number of corpus bytes written for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ByteCount {
    pub document: String,
    pub bytes: u64,
}

impl ByteCount {
    pub fn new(document: impl Into<String>, bytes: u64) -> Self {
        Self {
            document: document.into(),
            bytes,
        }
    }
}

/// Appends documents' shingles to a freshly created corpus file.
///
/// # Examples
///
/// ```
/// use docsim::corpus::CorpusWriter;
///
/// let tmp = tempfile::tempdir().unwrap();
/// let path = tmp.path().join("corpus.txt");
///
/// let mut writer = CorpusWriter::create(&path).unwrap();
/// writer.write_shingles("a.txt", ["ab", "cd"]).unwrap();
/// let records = writer.finish().unwrap();
///
/// assert_eq!(records[0].bytes, 6);
/// assert_eq!(std::fs::read_to_string(&path).unwrap(), "ab cd ");
/// ```
pub struct CorpusWriter {
    path: PathBuf,
    /// Resolved location of the corpus file, for recognizing it among
    /// document sources.
    canonical: Option<PathBuf>,
    out: BufWriter<File>,
    records: Vec<ByteCount>,
}

impl CorpusWriter {
    /// Create the corpus at `path`, replacing any previous corpus there and
    /// creating missing parent directories.
    pub fn create(path: &Path) -> Result<Self> {
        let setup = |source| Error::CorpusSetup {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(setup)?;
        }
        let file = File::create(path).map_err(setup)?;

        Ok(Self {
            path: path.to_path_buf(),
            canonical: path.canonicalize().ok(),
            out: BufWriter::new(file),
            records: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `path` names this corpus file.
    pub fn is_corpus(&self, path: &Path) -> bool {
        match (&self.canonical, path.canonicalize()) {
            (Some(corpus), Ok(other)) => *corpus == other,
            _ => false,
        }
    }

    /// Append one document's shingles and record its byte count.
    ///
    /// The record is only kept once every shingle has been written.
    pub fn write_shingles<I, S>(
        &mut self,
        document: &str,
        shingles: I,
    ) -> Result<u64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bytes = 0u64;
        for shingle in shingles {
            let shingle = shingle.as_ref();
            self.out.write_all(shingle.as_bytes())?;
            self.out.write_all(&[SEPARATOR])?;
            bytes += shingle.len() as u64 + 1;
        }
        tracing::debug!(document, bytes, "wrote document shingles");
        self.records.push(ByteCount::new(document, bytes));
        Ok(bytes)
    }

    /// Byte counts of the documents written so far.
    pub fn records(&self) -> &[ByteCount] {
        &self.records
    }

    /// Flush the corpus and return every byte-count record in write order.
    pub fn finish(mut self) -> Result<Vec<ByteCount>> {
        self.out.flush()?;
        let total: u64 = self.records.iter().map(|r| r.bytes).sum();
        tracing::info!(
            corpus = %self.path.display(),
            documents = self.records.len(),
            bytes = total,
            "corpus written"
        );
        Ok(self.records)
    }

    /// Give up after a write fault, keeping the records completed so far.
    ///
    /// Bytes of the document that was being written when the fault hit are
    /// cut off again, so the file never extends past the kept records. If
    /// the fault also lost bytes of completed documents the file stays
    /// shorter than the records say.
    fn salvage(self, error: &Error) -> Vec<ByteCount> {
        tracing::warn!(
            corpus = %self.path.display(),
            error = %error,
            "corpus write failed, keeping completed documents"
        );
        let Self {
            path,
            mut out,
            records,
            ..
        } = self;
        if let Err(e) = out.flush() {
            tracing::warn!(error = %e, "corpus flush failed");
        }

        // Unflushed bytes are dropped here instead of on drop.
        let (file, _) = out.into_parts();
        let kept: u64 = records.iter().map(|r| r.bytes).sum();
        let truncated = file.metadata().and_then(|meta| {
            if meta.len() > kept {
                file.set_len(kept)
            } else {
                Ok(())
            }
        });
        if let Err(e) = truncated {
            tracing::warn!(
                corpus = %path.display(),
                error = %e,
                "cannot trim partial document from corpus"
            );
        }
        records
    }
}

/// Write already-shingled documents to a new corpus at `path`.
///
/// Fails only when the corpus cannot be created; a write fault part way
/// through keeps the records of the documents fully written before it.
pub fn store_shingles(
    path: &Path,
    documents: &[ShingledDocument],
) -> Result<Vec<ByteCount>> {
    let mut writer = create_logged(path)?;
    for doc in documents {
        if let Err(e) = writer.write_shingles(&doc.id, &doc.shingles) {
            return Ok(writer.salvage(&e));
        }
    }
    finish_logged(writer)
}

/// Stream every document through its shingler straight into a new corpus.
///
/// A source that is the corpus file itself is skipped.
pub fn process_and_store(
    path: &Path,
    sources: &[DocumentSource],
    n: usize,
) -> Result<Vec<ByteCount>> {
    if n == 0 {
        return Err(Error::InvalidShingleSize(n));
    }
    let mut writer = create_logged(path)?;
    for source in sources {
        if writer.is_corpus(&source.path) {
            tracing::warn!(
                document = %source.id,
                "skipping document that is the corpus itself"
            );
            continue;
        }
        let shingles = source.shingles(n)?;
        if let Err(e) = writer.write_shingles(&source.id, shingles) {
            return Ok(writer.salvage(&e));
        }
    }
    finish_logged(writer)
}

fn create_logged(path: &Path) -> Result<CorpusWriter> {
    CorpusWriter::create(path).inspect_err(|e| {
        tracing::error!(error = %e, "corpus setup failed");
    })
}

fn finish_logged(writer: CorpusWriter) -> Result<Vec<ByteCount>> {
    let records = writer.records().to_vec();
    match writer.finish() {
        Ok(records) => Ok(records),
        Err(e) => {
            tracing::warn!(error = %e, "corpus flush failed");
            Ok(records)
        }
    }
}

/// Size of the corpus file in bytes.
pub fn corpus_len(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}
