use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use clap::Parser;
use docsim::{
    DataDir,
    Settings,
    compare::{self, CompareParams},
    corpus,
    document,
    error,
    shingle::Shingler,
    walker::WalkOptions,
};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCSIM_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let settings = Settings::load(&data_dir.settings());

    match &cli.command {
        Command::Compare(args) => cmd_compare(&data_dir, &settings, args)?,
        Command::Store(args) => cmd_store(&data_dir, &settings, args)?,
        Command::Shingles(args) => cmd_shingles(&settings, args)?,
        Command::Completions(_) => {}
    }

    Ok(())
}

/// Flags win over the settings file; the corpus defaults to the data dir.
fn resolve_source(
    data_dir: &DataDir,
    settings: &Settings,
    args: &cli::SourceArgs,
) -> error::Result<(usize, PathBuf, WalkOptions)> {
    let shingle_size = args.shingle_size.unwrap_or(settings.shingle_size);
    let corpus = args.corpus.clone().unwrap_or_else(|| data_dir.corpus());

    let mut walk = settings.walk_options();
    walk.recursive |= args.recursive;
    let walk = walk.with_globs(&args.globs)?;

    Ok((shingle_size, corpus, walk))
}

fn cmd_compare(
    data_dir: &DataDir,
    settings: &Settings,
    args: &cli::CompareArgs,
) -> error::Result<()> {
    let (shingle_size, corpus, walk) =
        resolve_source(data_dir, settings, &args.source)?;

    let mut similarity = settings.similarity_config();
    if args.postings_cap.is_some() {
        similarity.postings_cap = args.postings_cap;
    }

    let params = CompareParams {
        root: args.source.dir.clone(),
        corpus,
        shingle_size,
        walk,
        similarity,
    };
    let mut outcome = compare::execute_compare(&params)?;

    let threshold = args.threshold.unwrap_or(settings.threshold);
    let mut out = std::io::stdout().lock();
    let reported = if args.json {
        outcome.ranking.report_json(threshold, &mut out)?
    } else {
        outcome.ranking.report(threshold, &mut out)?
    };
    out.flush()?;

    tracing::info!(
        documents = outcome.records.len(),
        reported,
        threshold,
        "comparison complete"
    );
    Ok(())
}

fn cmd_store(
    data_dir: &DataDir,
    settings: &Settings,
    args: &cli::StoreArgs,
) -> error::Result<()> {
    let (shingle_size, corpus, walk) =
        resolve_source(data_dir, settings, &args.source)?;

    let sources = compare::discover_sources(&args.source.dir, &walk)?;
    let records = corpus::process_and_store(&corpus, &sources, shingle_size)?;

    let mut out = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &records)?;
        writeln!(out)?;
    } else {
        for record in &records {
            writeln!(out, "{}\t{}", record.document, record.bytes)?;
        }
    }
    out.flush()?;

    eprintln!("Corpus written to {}", corpus.display());
    Ok(())
}

fn cmd_shingles(
    settings: &Settings,
    args: &cli::ShinglesArgs,
) -> error::Result<()> {
    let n = args.shingle_size.unwrap_or(settings.shingle_size);

    match (args.offset, args.length) {
        (Some(start), Some(len)) => {
            let reader = document::partial_reader(&args.file, start, len)?;
            print_shingles(Shingler::new(reader, n)?)
        }
        _ => {
            let reader = document::open_document(&args.file)?;
            print_shingles(Shingler::new(reader, n)?)
        }
    }
}

fn print_shingles<R: BufRead>(shingler: Shingler<R>) -> error::Result<()> {
    let mut out = std::io::stdout().lock();
    for shingle in shingler {
        writeln!(out, "{shingle}")?;
    }
    out.flush()?;
    Ok(())
}
