// src/main.rs
// =============================================================================
// This is the entry point of the markval CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Find the files to check in the repository
// 3. Validate them concurrently, all sharing one ValidationContext
// 4. Print problems as they come in (or as JSON at the end)
// 5. Exit with proper code (0 = no problems, 1 = problems found, 2 = error)
// =============================================================================

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use futures::stream::{self, StreamExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use markval::{scan, Problem, ProblemReport, ValidationContext, Validator};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no problems
//   Ok(1) = problems found
//   Err   = could not run at all
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let context = Arc::new(ValidationContext::new(&cli.repo, &cli.checker_config())?);
    let files = scan::find_documents(context.root(), &cli.pattern)?;

    if files.is_empty() {
        if !cli.json {
            println!("⚠️  No files matching '{}' in {}", cli.pattern, context.root().display());
        } else {
            println!("[]");
        }
        return Ok(0);
    }
    info!(files = files.len(), root = %context.root().display(), "validating");

    let validator = Validator::with_link_rule(Arc::clone(&context));

    // Validate up to --jobs files at once. Results come back in completion
    // order, so lines of one file stay together but files are interleaved.
    let mut results = stream::iter(&files)
        .map(|file| validator.check_document(file))
        .buffer_unordered(cli.jobs.max(1));

    let mut problems: Vec<Problem> = Vec::new();
    while let Some(file_problems) = results.next().await {
        if !cli.json {
            for problem in &file_problems {
                println!("{}", problem);
            }
        }
        problems.extend(file_problems);
    }

    if cli.json {
        let reports: Vec<ProblemReport> = problems.iter().map(Problem::report).collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_summary(files.len(), &problems);
    }

    Ok(if problems.is_empty() { 0 } else { 1 })
}

// Logs go to stderr so stdout only carries results.
// RUST_LOG wins over --verbose when both are given.
fn init_tracing(verbose: bool) {
    let default = if verbose { "markval=debug" } else { "markval=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(file_count: usize, problems: &[Problem]) {
    let broken_files = {
        let mut files: Vec<_> = problems.iter().map(|p| p.file()).collect();
        files.sort();
        files.dedup();
        files.len()
    };

    println!();
    println!("📊 Summary:");
    println!("   📄 Files checked: {}", file_count);
    println!("   ❌ Problems: {}", problems.len());
    println!("   📋 Files with problems: {}", broken_files);
}
