//! plancache - offline cache worker for the planning web app.
//!
//! Command-line adapter around the worker service object: installs and
//! activates the current cache generation, serves individual requests
//! through the interception policy, and reports cache contents.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plancache::cache::CacheStorage;
use plancache::config::WorkerConfig;
use plancache::http::{Destination, Request, Url};
use plancache::net::HttpFetcher;
use plancache::runtime::EventLoop;
use plancache::worker::Worker;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("install") => cmd_install().await,
        Some("fetch") => cmd_fetch(&args[2..]).await,
        Some("caches") => cmd_caches(),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    eprintln!("Usage: plancache <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  install                    Populate the current cache and drop stale generations");
    eprintln!("  fetch <url> [--navigate]   Serve one request through the worker");
    eprintln!("  caches                     List cache generations and entry counts");
}

fn build_worker() -> Result<Worker> {
    let config = WorkerConfig::load()?;
    let storage = CacheStorage::open_at(config.cache_dir()?)?;
    let fetcher = Arc::new(HttpFetcher::new()?);
    Ok(Worker::new(config, storage, fetcher))
}

/// Run the full lifecycle: install the current generation, then activate
/// it so stale generations are removed.
async fn cmd_install() -> Result<()> {
    info!("plancache install starting");

    let worker = build_worker()?;
    let (event_loop, handle) = EventLoop::new(worker);
    let runner = tokio::spawn(event_loop.run());

    handle.install().await?;
    handle.activate().await?;

    drop(handle);
    let _ = runner.await;

    println!("Cache installed and activated");
    Ok(())
}

/// Serve a single request through the interception policy and print the
/// response body to stdout.
async fn cmd_fetch(args: &[String]) -> Result<()> {
    let url = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .ok_or_else(|| anyhow::anyhow!("Usage: plancache fetch <url> [--navigate]"))?;
    let navigate = args.iter().any(|a| a == "--navigate");

    let parsed = Url::parse(url)?;
    let request = if navigate {
        Request::navigate(parsed)
    } else {
        Request::get(parsed, Destination::Other)
    };

    let worker = build_worker()?;
    let (event_loop, handle) = EventLoop::new(worker.clone());
    let runner = tokio::spawn(event_loop.run());

    let response = handle.fetch(request).await?;
    eprintln!("{} {}", response.status, response.url);
    if let Some(content_type) = response.content_type() {
        eprintln!("content-type: {}", content_type);
    }
    std::io::stdout().write_all(&response.body)?;

    // Let any background cache update land before the process exits.
    worker.flush_background().await;

    drop(handle);
    let _ = runner.await;
    Ok(())
}

/// List cache generations and their entry counts.
fn cmd_caches() -> Result<()> {
    let config = WorkerConfig::load()?;
    let storage = CacheStorage::open_at(config.cache_dir()?)?;

    for name in storage.names()? {
        let cache = storage.open(&name)?;
        let marker = if name == config.cache_name {
            " (current)"
        } else {
            ""
        };
        println!("{}{}  {} entries", name, marker, cache.len()?);
    }
    Ok(())
}
