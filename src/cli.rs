use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "docsim",
    about = "Find near-duplicate documents by shared word shingles"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare every pair of documents in a directory
    Compare(CompareArgs),
    /// Build the corpus only and print per-document byte counts
    Store(StoreArgs),
    /// Print the shingles of a single document
    Shingles(ShinglesArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

/// Options shared by commands that read a directory of documents.
#[derive(Debug, Parser)]
pub struct SourceArgs {
    /// Directory containing the documents
    pub dir: PathBuf,

    /// Words per shingle
    #[arg(short = 'n', long)]
    pub shingle_size: Option<usize>,

    /// Corpus file to (re)create [default: <data-dir>/corpus.txt]
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Only use files whose relative path matches (repeatable)
    #[arg(short = 'g', long = "glob")]
    pub globs: Vec<String>,

    /// Descend into subdirectories
    #[arg(short = 'r', long)]
    pub recursive: bool,
}

// -- Compare --

#[derive(Debug, Parser)]
pub struct CompareArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Minimum shared-shingle count to report
    #[arg(short = 't', long)]
    pub threshold: Option<u64>,

    /// Cap the number of recorded occurrences per shingle
    #[arg(long)]
    pub postings_cap: Option<usize>,

    /// Output one JSON object per line
    #[arg(long)]
    pub json: bool,
}

// -- Store --

#[derive(Debug, Parser)]
pub struct StoreArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output the byte counts as a JSON array
    #[arg(long)]
    pub json: bool,
}

// -- Shingles --

#[derive(Debug, Parser)]
pub struct ShinglesArgs {
    /// Document to shingle
    pub file: PathBuf,

    /// Words per shingle
    #[arg(short = 'n', long)]
    pub shingle_size: Option<usize>,

    /// Start reading at this byte offset
    #[arg(long, requires = "length")]
    pub offset: Option<u64>,

    /// Read exactly this many bytes
    #[arg(long, requires = "offset")]
    pub length: Option<usize>,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "docsim",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_compare_defaults() {
        let cli = Cli::parse_from(["docsim", "compare", "essays"]);
        match cli.command {
            Command::Compare(args) => {
                assert_eq!(args.source.dir, PathBuf::from("essays"));
                assert_eq!(args.source.shingle_size, None);
                assert_eq!(args.threshold, None);
                assert!(args.source.globs.is_empty());
                assert!(!args.source.recursive);
                assert!(!args.json);
            }
            _ => panic!("expected compare command"),
        }
    }

    #[test]
    fn parse_compare_flags() {
        let cli = Cli::parse_from([
            "docsim", "-vv", "compare", "essays", "-n", "4", "-t", "10",
            "-g", "*.txt", "-g", "*.md", "--recursive", "--json",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Compare(args) => {
                assert_eq!(args.source.shingle_size, Some(4));
                assert_eq!(args.threshold, Some(10));
                assert_eq!(args.source.globs, vec!["*.txt", "*.md"]);
                assert!(args.source.recursive);
                assert!(args.json);
            }
            _ => panic!("expected compare command"),
        }
    }

    #[test]
    fn shingles_range_needs_both_bounds() {
        let result = Cli::try_parse_from([
            "docsim", "shingles", "a.txt", "--offset", "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
