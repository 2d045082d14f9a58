use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use privharvest_core::CoreError;
use privharvest_core::harvest::{HarvestOptions, execute_harvest, generate_harvest_report};
use privharvest_core::importer::{ImportSummary, StoreClient, StoreConfig, import_snapshot};
use privharvest_core::registration::run_interactive;
use privharvest_core::writer::{WriteSummary, load_snapshot, write_snapshot};
use privharvest_scanner::{DirectoryMarkup, HttpFetcher};
use std::io;
use std::path::PathBuf;
use tracing::{Level, warn};
use url::Url;

/// Expand a leading `~` so paths from flags behave like shell paths.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn log_level(quiet: bool, verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    }
}

pub fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

pub fn store_config_from(
    url: Option<&String>,
    key: Option<&String>,
) -> std::result::Result<StoreConfig, CoreError> {
    StoreConfig::new(url.cloned(), key.cloned())
}

pub fn format_write_summary(summary: &WriteSummary) -> String {
    format!(
        "Saved {} categories and {} tools to {}",
        summary.categories,
        summary.tools,
        summary.path.display()
    )
}

pub fn format_import_summary(summary: &ImportSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  Categories: {} inserted, {} failed\n",
        summary.categories_inserted, summary.categories_failed
    ));
    out.push_str(&format!(
        "  Tools: {} inserted, {} failed, {} skipped (no category)\n",
        summary.tools_inserted, summary.tools_failed, summary.tools_skipped
    ));
    out
}

pub async fn handle_scrape(args: &ArgMatches, quiet: bool) -> Result<WriteSummary> {
    let url = args
        .get_one::<Url>("url")
        .context("missing --url value")?;
    let output = args
        .get_one::<String>("output")
        .map(|p| expand_path(p))
        .context("missing --output value")?;
    let show_progress = !quiet && !args.get_flag("no-progress");

    if !quiet {
        println!(
            "{} Scraping {}",
            "→".blue().bold(),
            url.as_str().bright_white()
        );
    }

    let fetcher = HttpFetcher::new().context("failed to set up HTTP client")?;
    let parser = DirectoryMarkup::new();
    let options = HarvestOptions {
        seed_url: url.as_str().to_string(),
        show_progress_bars: show_progress,
    };

    let report = execute_harvest(&fetcher, &parser, options, None).await;

    if !quiet {
        print!("{}", generate_harvest_report(&report));
    }

    let summary = write_snapshot(&report.snapshot, &output)
        .with_context(|| format!("failed to write snapshot to {}", output.display()))?;

    if !quiet {
        println!("{} {}", "✓".green().bold(), format_write_summary(&summary));
    }
    Ok(summary)
}

pub async fn handle_import(args: &ArgMatches, quiet: bool) -> Result<ImportSummary> {
    let input = args
        .get_one::<String>("input")
        .map(|p| expand_path(p))
        .context("missing --input value")?;

    let config = store_config_from(
        args.get_one::<String>("store-url"),
        args.get_one::<String>("store-key"),
    )?;
    let client = StoreClient::new(&config)?;

    let snapshot = load_snapshot(&input)
        .with_context(|| format!("failed to load snapshot from {}", input.display()))?;

    let dangling = snapshot.dangling_tools();
    if !dangling.is_empty() {
        for tool in &dangling {
            warn!(
                "Tool {} references category '{}' missing from {}",
                tool.name,
                tool.category_slug,
                input.display()
            );
        }
        if !quiet {
            println!(
                "{} {} tool(s) reference categories missing from the snapshot and will be skipped",
                "⚠".yellow().bold(),
                dangling.len()
            );
        }
    }

    if !quiet {
        println!(
            "{} Importing {} categories and {} tools from {}",
            "→".blue().bold(),
            snapshot.category_count(),
            snapshot.tool_count(),
            input.display().to_string().bright_white()
        );
    }

    let summary = import_snapshot(&client, &snapshot)
        .await
        .context("import aborted")?;

    if !quiet {
        let failures = summary.categories_failed + summary.tools_failed + summary.tools_skipped;
        if failures == 0 {
            println!("{} Import completed successfully!", "✓".green().bold());
        } else {
            println!(
                "{} Import completed with {} problem(s)",
                "⚠".yellow().bold(),
                failures
            );
        }
        print!("{}", format_import_summary(&summary));
    }
    Ok(summary)
}

pub fn handle_register(args: &ArgMatches) -> Result<Option<PathBuf>> {
    let dir = args
        .get_one::<String>("dir")
        .map(|p| expand_path(p))
        .context("missing --dir value")?;

    let stdin = io::stdin();
    let saved = run_interactive(stdin.lock(), io::stdout(), &dir)?;
    Ok(saved)
}
