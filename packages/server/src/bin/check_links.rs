//! CLI for checking domains without the browser page
//!
//! Reads free-form text from a file (or stdin), extracts domains, and runs the
//! same batch the server runs. Progress goes to stderr; results to stdout.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use filter_client::Provider;
use futures::StreamExt;
use server_core::config::Config;
use server_core::domains::link_check::{
    check_links, extract_domains, unblocked_domains, BatchRequest, Filters, ResultTable,
};
use server_core::kernel::{ProgressHub, ServerDeps, WatchOptions, WatchTarget};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "check_links")]
#[command(about = "Check domains in free-form text against Lightspeed and FortiGuard")]
struct Cli {
    /// File containing text with domains (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Skip the Lightspeed lookup
    #[arg(long)]
    no_lightspeed: bool,

    /// Skip the FortiGuard lookup
    #[arg(long)]
    no_fortiguard: bool,

    /// Print only the domains this provider leaves unblocked, one per line
    #[arg(long, value_name = "PROVIDER")]
    unblocked: Option<Provider>,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Don't print progress
    #[arg(long, short)]
    quiet: bool,
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let filters = Filters {
        lightspeed: !cli.no_lightspeed,
        fortiguard: !cli.no_fortiguard,
    };
    if filters.is_empty() {
        anyhow::bail!("Please select at least one filter to check.");
    }
    if let Some(provider) = cli.unblocked {
        if !filters.includes(provider) {
            anyhow::bail!("--unblocked {} needs that provider enabled", provider);
        }
    }

    let text = read_input(cli.input.as_ref())?;
    let domains = extract_domains(&text);
    if domains.is_empty() {
        eprintln!("Please enter URLs to check.");
        return Ok(());
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    let deps = ServerDeps::from_config(&config).context("Failed to set up providers")?;
    let hub = ProgressHub::with_retention(config.progress_retention);
    let request = BatchRequest::new(domains, filters);

    let reporter = if cli.quiet {
        None
    } else {
        let updates = hub
            .watch(
                WatchTarget::Batch(request.batch_id),
                WatchOptions {
                    interval: config.progress_interval,
                    idle_timeout: config.progress_idle_timeout,
                },
            )
            .await;
        Some(tokio::spawn(async move {
            let mut updates = Box::pin(updates);
            while let Some(snapshot) = updates.next().await {
                eprint!(
                    "\rChecking {}/{} domains ({}%)",
                    snapshot.completed,
                    snapshot.total,
                    snapshot.percentage()
                );
                let _ = std::io::stderr().flush();
            }
            eprintln!();
        }))
    };

    let results = check_links(&deps, &hub, request).await;

    if let Some(reporter) = reporter {
        reporter.await.context("Progress reporter failed")?;
    }

    match cli.unblocked {
        Some(provider) => {
            let list = unblocked_domains(&results, provider);
            if !list.is_empty() {
                println!("{}", list);
            }
        }
        None => {
            println!("{}", ResultTable::new(filters).render(&results, !cli.no_color));
            for provider in filters.providers() {
                let unblocked = results
                    .iter()
                    .filter(|r| r.is_unblocked_by(provider))
                    .count();
                println!(
                    "{}: {} of {} unblocked",
                    provider.display_name().bold(),
                    unblocked,
                    results.len()
                );
            }
        }
    }

    Ok(())
}
