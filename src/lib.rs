//! docsim - near-duplicate detection across a collection of documents.
//!
//! Every document is broken into overlapping word shingles, all shingles are
//! written into one flat corpus file, and a single pass over that corpus
//! counts how many shingle occurrences each pair of documents shares. Pairs
//! are then ranked by that count.
//!
//! # Quick start
//!
//! ```no_run
//! use docsim::{
//!     corpus,
//!     document::DocumentSource,
//!     ranking,
//!     similarity::{self, SimilarityConfig},
//! };
//! use std::path::Path;
//!
//! let sources = vec![
//!     DocumentSource::new("a.txt", "essays/a.txt"),
//!     DocumentSource::new("b.txt", "essays/b.txt"),
//! ];
//! let corpus_path = Path::new("corpus.txt");
//!
//! let records = corpus::process_and_store(corpus_path, &sources, 3).unwrap();
//! let sims = similarity::compute_similarities(
//!     corpus_path,
//!     &records,
//!     &SimilarityConfig::default(),
//! );
//!
//! let mut ranked = ranking::rank(sims);
//! ranked.report(2, &mut std::io::stdout()).unwrap();
//! ```

pub mod compare;
pub mod config;
pub mod corpus;
pub mod data_dir;
pub mod document;
pub mod error;
pub mod offset_index;
pub mod ranking;
pub mod shingle;
pub mod similarity;
pub mod walker;

pub use config::Settings;
pub use corpus::{ByteCount, CorpusWriter};
pub use data_dir::DataDir;
pub use document::DocumentSource;
pub use error::{Error, Result};
pub use offset_index::OffsetIndex;
pub use ranking::Ranking;
pub use shingle::Shingler;
pub use similarity::{Similarity, SimilarityConfig};
