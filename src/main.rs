//! CLI entry point for the preprint crawler.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crawler_core::{Crawler, UserAgentPool};
use tracing::{debug, error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;

use cli::{Args, Command};

fn init_tracing(default_level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    init_tracing(default_level, args.log_file.as_deref())?;

    debug!(?args, "CLI arguments parsed");

    let config = args.crawler_config().context("invalid configuration")?;
    let identities = match UserAgentPool::load(&args.user_agents) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            error!(error = %e, "cannot load user agents");
            return Err(e).context("no request can be made without a User-Agent pool");
        }
    };
    info!(user_agents = identities.len(), "identity pool loaded");

    let crawler = Crawler::new(config, identities)?;

    let summary = match &args.command {
        Command::Download {
            category,
            output,
            pages,
        } => {
            info!(category = %category, pages, output = %output.display(), "starting PDF download");
            crawler.download_category(category, output, *pages).await?
        }
        Command::Metadata {
            category,
            output,
            pages,
            workers,
        } => {
            info!(
                category = %category,
                pages,
                workers,
                output = %output.display(),
                "starting metadata extraction"
            );
            crawler
                .extract_category(category, output, *pages, usize::from(*workers))
                .await?
        }
    };

    info!(
        category = %summary.category,
        pages = summary.pages_visited,
        articles = summary.article_count,
        "crawl complete"
    );
    println!("{}", summary.message);

    Ok(())
}
