//! # chatstat CLI
//!
//! Command-line interface for the chatstat library.

use std::fs;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use chatstat::ChatstatError;
use chatstat::cache::write_cache;
use chatstat::cli::{Args, SessionConfig};
use chatstat::core::{write_aggregates_json, write_scalar_info_csv, write_top_words_csv};
use chatstat::stats::Analyzer;
use chatstat::stats::authors::author_content;
use chatstat::stats::summary::summarize;
use chatstat::words::load_words;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "chatstat=debug" } else { "chatstat=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: &Args) -> Result<(), ChatstatError> {
    let total_start = Instant::now();
    let session = SessionConfig::from_args(args)?;
    session.validate()?;

    println!("📊 chatstat v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("👤 You:      {}", session.your_name);
    println!("👥 Target:   {}", session.target_name);
    if let Some(path) = &session.cache_file {
        println!("🗃️  Cache:    {}", path.display());
    }
    if let Some(path) = &session.vkopt_file {
        println!("📂 vkOpt:    {}", path.display());
    }
    if let Some(path) = &session.telegram_file {
        println!("📂 Telegram: {}", path.display());
    }
    println!("💾 Output:   {}", session.output_dir.display());
    println!();

    // Step 1: Parse and normalize
    println!("⏳ Reading sources...");
    let parse_start = Instant::now();
    let ingested = session.ingestor().ingest(session.sources())?;
    let conversation = &ingested.conversation;
    println!(
        "   {} messages from {} participants ({:.2}s)",
        conversation.len(),
        conversation.authors().len(),
        parse_start.elapsed().as_secs_f64()
    );
    for failure in &ingested.failures {
        println!("⚠️  Skipped source {}", failure);
    }
    if !ingested.skipped.is_empty() {
        println!("⚠️  {} malformed records skipped", ingested.skipped.len());
    }
    if !ingested.rejected.is_empty() {
        println!("⚠️  {} messages outside the plausible date range", ingested.rejected.len());
    }
    if ingested.duplicates > 0 {
        println!("🔀 {} duplicate messages merged", ingested.duplicates);
    }

    // Step 2: Aggregate
    let mut analyzer = Analyzer::new(session.analysis.clone());
    if let Some(path) = &session.words_file {
        let words = load_words(path)?;
        println!("📝 {} words of interest", words.len());
        analyzer = analyzer.with_words(words);
    }
    println!("🧮 Computing statistics...");
    let analysis_start = Instant::now();
    let result = analyzer.analyze(conversation);
    println!(
        "   {} aggregates ({:.2}s)",
        result.len(),
        analysis_start.elapsed().as_secs_f64()
    );

    // Step 3: Write result files
    fs::create_dir_all(&session.output_dir)?;
    let out = |name: &str| session.output_dir.join(name);
    println!("💾 Writing results...");

    write_aggregates_json(&result, out("aggregates.json"))?;

    let summary = summarize(conversation.messages(), session.analysis.utc_offset());
    let authors = author_content(conversation, &session.analysis.content_filter);
    write_scalar_info_csv(&summary, &authors, out("scalar_info.csv"))?;

    write_top_words_csv(
        conversation,
        &session.your_name,
        &session.target_name,
        session.top_words,
        out("words.csv"),
    )?;

    if session.store_messages {
        write_cache(conversation, out("messages.json"))?;
    }

    println!();
    println!("✅ Done! Results saved to {}", session.output_dir.display());

    println!();
    println!("📊 Summary:");
    println!("   Messages:  {}", conversation.len());
    if let (Some(first), Some(last)) = (summary.first_message, summary.last_message) {
        println!("   Period:    {} .. {}", first.date_naive(), last.date_naive());
    }
    println!("   Per day:   {:.2}", summary.average_per_day);
    println!("   Total time: {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}
