use std::path::PathBuf;

use crate::{
    corpus::{self, ByteCount},
    document::DocumentSource,
    error::Result,
    ranking::{self, Ranking},
    similarity::{self, SimilarityConfig},
    walker::{self, WalkOptions},
};

/// Everything needed to compare the documents under one directory.
#[derive(Debug, Clone)]
pub struct CompareParams {
    pub root: PathBuf,
    /// Where the corpus store is (re)created.
    pub corpus: PathBuf,
    pub shingle_size: usize,
    pub walk: WalkOptions,
    pub similarity: SimilarityConfig,
}

/// Result of a comparison run.
#[derive(Debug, Clone)]
pub struct CompareOutcome {
    /// Byte-count records in corpus order.
    pub records: Vec<ByteCount>,
    pub ranking: Ranking,
}

/// Discover the documents under `root` in a stable order.
pub fn discover_sources(
    root: &std::path::Path,
    walk: &WalkOptions,
) -> Result<Vec<DocumentSource>> {
    let files = walker::discover_files(root, walk)?;
    if files.is_empty() {
        tracing::warn!(root = %root.display(), "no documents found");
    }
    Ok(files.iter().map(DocumentSource::from_discovered).collect())
}

/// Execute the full comparison pipeline.
///
/// 1. Discover documents under the root
/// 2. Stream each document's shingles into a fresh corpus
/// 3. Scan the corpus once, counting shared shingles per pair
/// 4. Rank the pairs by count
pub fn execute_compare(params: &CompareParams) -> Result<CompareOutcome> {
    // Stage 1: discovery
    let sources = discover_sources(&params.root, &params.walk)?;
    tracing::info!(documents = sources.len(), "discovered documents");

    // Stage 2: corpus
    let records = corpus::process_and_store(
        &params.corpus,
        &sources,
        params.shingle_size,
    )?;

    // Stage 3: similarity scan
    let similarities = similarity::compute_similarities(
        &params.corpus,
        &records,
        &params.similarity,
    );

    // Stage 4: ranking
    let ranking = ranking::rank(similarities);

    Ok(CompareOutcome { records, ranking })
}
