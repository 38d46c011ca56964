//! Single-pass shared-shingle counting over the corpus.
//!
//! The corpus is read once as space-separated tokens. A running byte cursor
//! is mapped to the owning document through the [`OffsetIndex`], and a
//! postings map remembers, per shingle, every document index it has been seen
//! in so far. Each new occurrence bumps the counter of every earlier
//! occurrence's document pair, skipping repeats inside the same document.
//!
//! Because every occurrence is recorded, a shingle seen `k` times costs
//! `O(k)` work at its next occurrence. Very common shingles make the scan
//! quadratic in their frequency; [`SimilarityConfig::postings_cap`] bounds
//! this at the price of undercounting such shingles.

use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use serde::Serialize;

use crate::{
    corpus::{ByteCount, SEPARATOR},
    offset_index::OffsetIndex,
};

/// Shared-shingle count between two documents.
///
/// `first` precedes `second` in corpus order. Ordering is by `count`, then by
/// the document pair, so distinct pairs never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Similarity {
    pub first: String,
    pub second: String,
    pub count: u64,
}

impl Similarity {
    pub fn new(
        first: impl Into<String>,
        second: impl Into<String>,
        count: u64,
    ) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            count,
        }
    }
}

impl Ord for Similarity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| self.first.cmp(&other.first))
            .then_with(|| self.second.cmp(&other.second))
    }
}

impl PartialOrd for Similarity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.first, self.second, self.count)
    }
}

/// Counters for every unordered document pair, stored as a flat
/// upper-triangular array of `D * (D - 1) / 2` slots.
#[derive(Debug, Clone)]
pub struct PairTable {
    docs: usize,
    counts: Vec<u64>,
}

impl PairTable {
    pub fn new(docs: usize) -> Self {
        Self {
            docs,
            counts: vec![0; docs * docs.saturating_sub(1) / 2],
        }
    }

    pub fn docs(&self) -> usize {
        self.docs
    }

    /// Slot of pair `(i, j)` with `i < j < docs`; rows are laid out in order.
    fn slot(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j < self.docs);
        i * (2 * self.docs - i - 1) / 2 + (j - i - 1)
    }

    /// Add one to the pair `{a, b}`. Same-document pairs are ignored.
    pub fn increment(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let slot = self.slot(a.min(b), a.max(b));
        self.counts[slot] += 1;
    }

    pub fn get(&self, a: usize, b: usize) -> u64 {
        if a == b {
            return 0;
        }
        self.counts[self.slot(a.min(b), a.max(b))]
    }

    /// Every pair `(i, j, count)` with a non-zero count, `i < j`.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, usize, u64)> + '_ {
        (0..self.docs)
            .flat_map(move |i| (i + 1..self.docs).map(move |j| (i, j)))
            .zip(self.counts.iter())
            .filter(|(_, count)| **count > 0)
            .map(|((i, j), count)| (i, j, *count))
    }
}

/// Tuning for the similarity scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityConfig {
    /// Stop recording new occurrences of a shingle once its postings list
    /// holds this many entries. `None` records every occurrence.
    pub postings_cap: Option<usize>,
}

/// Count shared shingles between every pair of documents in the corpus.
///
/// `counts` must be the byte-count records produced when the corpus was
/// written. A corpus that cannot be opened yields no similarities.
pub fn compute_similarities(
    corpus: &Path,
    counts: &[ByteCount],
    config: &SimilarityConfig,
) -> Vec<Similarity> {
    let file = match File::open(corpus) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(
                corpus = %corpus.display(),
                error = %e,
                "cannot open corpus, no similarities computed"
            );
            return Vec::new();
        }
    };
    compute_from_reader(BufReader::new(file), counts, config)
}

/// Like [`compute_similarities`], over an already open corpus stream.
///
/// A read fault ends the scan early; counts gathered up to that point are
/// kept.
///
/// # Examples
///
/// ```
/// use docsim::{
///     corpus::ByteCount,
///     similarity::{SimilarityConfig, compute_from_reader},
/// };
///
/// let corpus = "ab cd ef ab cd gh ";
/// let counts = [ByteCount::new("a", 9), ByteCount::new("b", 9)];
/// let sims = compute_from_reader(
///     corpus.as_bytes(),
///     &counts,
///     &SimilarityConfig::default(),
/// );
/// assert_eq!(sims.len(), 1);
/// assert_eq!(sims[0].count, 2);
/// ```
pub fn compute_from_reader<R: BufRead>(
    reader: R,
    counts: &[ByteCount],
    config: &SimilarityConfig,
) -> Vec<Similarity> {
    let index = OffsetIndex::from_byte_counts(counts);
    let mut table = PairTable::new(counts.len());
    let mut postings: HashMap<Vec<u8>, Vec<usize>> = HashMap::new();
    let mut cursor = 0u64;
    let mut tokens = 0usize;

    for token in reader.split(SEPARATOR) {
        let token = match token {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "corpus read failed, ending scan");
                break;
            }
        };
        cursor += token.len() as u64 + 1;
        if token.is_empty() {
            continue;
        }

        let current = match index.locate(cursor) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "corpus extends past recorded documents, ending scan"
                );
                break;
            }
        };
        tokens += 1;

        let seen = postings.entry(token).or_default();
        for &previous in seen.iter() {
            table.increment(previous, current);
        }
        if config.postings_cap.is_none_or(|cap| seen.len() < cap) {
            seen.push(current);
        }
    }

    let similarities: Vec<Similarity> = table
        .nonzero()
        .map(|(i, j, count)| {
            Similarity::new(&counts[i].document, &counts[j].document, count)
        })
        .collect();

    tracing::info!(
        documents = counts.len(),
        tokens,
        distinct = postings.len(),
        pairs = similarities.len(),
        "similarity scan complete"
    );
    similarities
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Read};

    use super::*;

    fn scan(corpus: &str, counts: &[(&str, u64)]) -> Vec<Similarity> {
        let counts: Vec<ByteCount> = counts
            .iter()
            .map(|(doc, bytes)| ByteCount::new(*doc, *bytes))
            .collect();
        compute_from_reader(
            corpus.as_bytes(),
            &counts,
            &SimilarityConfig::default(),
        )
    }

    #[test]
    fn pair_table_slots_are_dense() {
        let table = PairTable::new(5);
        let mut slots = Vec::new();
        for i in 0..5 {
            for j in i + 1..5 {
                slots.push(table.slot(i, j));
            }
        }
        assert_eq!(slots, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn pair_table_is_symmetric() {
        let mut table = PairTable::new(4);
        table.increment(3, 1);
        table.increment(1, 3);
        table.increment(2, 2);
        assert_eq!(table.get(1, 3), 2);
        assert_eq!(table.get(3, 1), 2);
        assert_eq!(table.get(2, 2), 0);
        assert_eq!(table.nonzero().collect::<Vec<_>>(), vec![(1, 3, 2)]);
    }

    #[test]
    fn pair_table_handles_tiny_sizes() {
        assert_eq!(PairTable::new(0).nonzero().count(), 0);
        assert_eq!(PairTable::new(1).nonzero().count(), 0);
    }

    #[test]
    fn shared_single_words() {
        let sims = scan("ab cd ef ab cd gh ", &[("A", 9), ("B", 9)]);
        assert_eq!(sims, vec![Similarity::new("A", "B", 2)]);
    }

    #[test]
    fn disjoint_documents_share_nothing() {
        let sims = scan("ab cd ef gh ", &[("A", 6), ("B", 6)]);
        assert!(sims.is_empty());
    }

    #[test]
    fn repeats_within_a_document_do_not_count() {
        let sims = scan("xy xy xy ", &[("A", 9), ("B", 0)]);
        assert!(sims.is_empty());
    }

    #[test]
    fn every_occurrence_pair_counts() {
        // Three copies in each document: 3 x 3 cross-document matches.
        let sims = scan("xy xy xy xy xy xy ", &[("A", 9), ("B", 9)]);
        assert_eq!(sims, vec![Similarity::new("A", "B", 9)]);
    }

    #[test]
    fn three_way_sharing() {
        let sims = scan(
            "ab cd ab ef ab cd ",
            &[("A", 6), ("B", 6), ("C", 6)],
        );
        assert_eq!(
            sims,
            vec![
                Similarity::new("A", "B", 1),
                Similarity::new("A", "C", 2),
                Similarity::new("B", "C", 1),
            ]
        );
    }

    #[test]
    fn empty_documents_are_skipped_over() {
        let sims = scan(
            "ab cd ab cd ",
            &[("A", 6), ("empty", 0), ("B", 6), ("tail", 0)],
        );
        assert_eq!(sims, vec![Similarity::new("A", "B", 2)]);
    }

    #[test]
    fn postings_cap_bounds_counting() {
        let counts = [ByteCount::new("A", 9), ByteCount::new("B", 9)];
        let config = SimilarityConfig {
            postings_cap: Some(1),
        };
        let sims = compute_from_reader(
            "xy xy xy xy xy xy ".as_bytes(),
            &counts,
            &config,
        );
        // Only the first occurrence is remembered; each of B's three
        // copies matches it once.
        assert_eq!(sims, vec![Similarity::new("A", "B", 3)]);
    }

    #[test]
    fn bytes_past_the_records_stop_the_scan() {
        let sims = scan("ab ab ab ", &[("A", 3), ("B", 3)]);
        assert_eq!(sims, vec![Similarity::new("A", "B", 1)]);
    }

    #[test]
    fn multibyte_shingles_stay_aligned() {
        let corpus = "café naïve café naïve ";
        let sims = scan(corpus, &[("A", 13), ("B", 13)]);
        assert_eq!(sims, vec![Similarity::new("A", "B", 2)]);
    }

    #[test]
    fn missing_corpus_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let sims = compute_similarities(
            &tmp.path().join("nope.txt"),
            &[ByteCount::new("A", 3)],
            &SimilarityConfig::default(),
        );
        assert!(sims.is_empty());
    }

    #[test]
    fn read_fault_keeps_counts_so_far() {
        struct Flaky(std::io::Cursor<Vec<u8>>);

        impl Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                match self.0.read(buf)? {
                    0 => Err(std::io::Error::other("gone")),
                    n => Ok(n),
                }
            }
        }

        let counts = [ByteCount::new("A", 3), ByteCount::new("B", 6)];
        let reader = BufReader::new(Flaky(std::io::Cursor::new(
            b"ab ab cd".to_vec(),
        )));
        let sims =
            compute_from_reader(reader, &counts, &SimilarityConfig::default());
        assert_eq!(sims, vec![Similarity::new("A", "B", 1)]);
    }

    #[test]
    fn ordering_is_total() {
        let a = Similarity::new("a", "b", 3);
        let b = Similarity::new("a", "c", 3);
        let c = Similarity::new("b", "c", 1);
        assert!(a < b);
        assert!(c < a);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn display_names_both_documents() {
        let sim = Similarity::new("x.txt", "y.txt", 7);
        assert_eq!(sim.to_string(), "x.txt y.txt 7");
    }
}
