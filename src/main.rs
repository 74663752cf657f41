//! filecache CLI - fetch remote files through the local cache
//!
//! Thin shell wrapper around the library: resolves a key to a local path,
//! fetching from the configured remote on first request.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use filecache::{Cache, HttpSource, LocalDirSource, RemoteSource};

/// CLI command
#[derive(Debug)]
enum Command {
    /// Resolve a key to a local path, fetching if needed
    Get { key: String },
    /// Check whether a key is in this instance's index
    Has { key: String },
    /// Invalidate one key
    Remove { key: String },
    /// Drop everything this instance cached
    Clear,
    /// Show help
    Help,
}

/// Where files come from and where they land, resolved from flags and env.
#[derive(Debug)]
struct CliConfig {
    cache_dir: PathBuf,
    remote: String,
}

fn print_help() {
    eprintln!(
        r#"filecache - local cache for remote files

USAGE:
    filecache [OPTIONS] get <key>
    filecache [OPTIONS] has <key>
    filecache [OPTIONS] remove <key>
    filecache [OPTIONS] clear
    filecache help

COMMANDS:
    get     Print the local path for <key>, fetching from the remote if needed
    has     Exit 0 if <key> is cached in this run, 1 otherwise
    remove  Invalidate <key> and delete its local copy
    clear   Delete everything cached in this run
    help    Show this help message

OPTIONS:
    --remote <path-or-url>   Remote root (directory or http(s) endpoint)
    --cache-dir <path>       Cache directory

ENVIRONMENT:
    FILECACHE_REMOTE   Remote root (alternative to --remote)
    FILECACHE_DIR      Cache directory (alternative to --cache-dir)
    RUST_LOG           Log level (trace, debug, info, warn, error)

EXAMPLES:
    filecache --remote /mnt/shared/data get genotypes/batch1.csv
    filecache --remote https://files.example.com/data get greeting.txt

NOTE:
    The index lives in memory, so `has` only sees keys fetched by the same
    process. Each run starts with an empty index even when the cache
    directory already holds files.
"#
    );
}

fn parse_args() -> Result<(Command, CliConfig)> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut remote = env::var("FILECACHE_REMOTE").ok();
    let mut cache_dir = env::var("FILECACHE_DIR").ok().map(PathBuf::from);
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--remote" => {
                remote = Some(
                    iter.next()
                        .ok_or_else(|| anyhow!("--remote requires a value"))?,
                );
            }
            "--cache-dir" => {
                cache_dir = Some(PathBuf::from(
                    iter.next()
                        .ok_or_else(|| anyhow!("--cache-dir requires a value"))?,
                ));
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.first().map(String::as_str) {
        None | Some("help") | Some("--help") | Some("-h") => Command::Help,
        Some("get") => Command::Get {
            key: positional
                .get(1)
                .cloned()
                .ok_or_else(|| anyhow!("Usage: filecache get <key>"))?,
        },
        Some("has") => Command::Has {
            key: positional
                .get(1)
                .cloned()
                .ok_or_else(|| anyhow!("Usage: filecache has <key>"))?,
        },
        Some("remove") => Command::Remove {
            key: positional
                .get(1)
                .cloned()
                .ok_or_else(|| anyhow!("Usage: filecache remove <key>"))?,
        },
        Some("clear") => Command::Clear,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            Command::Help
        }
    };

    let cache_dir = cache_dir.unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("filecache")
    });

    let remote = match command {
        Command::Help => remote.unwrap_or_default(),
        _ => remote.ok_or_else(|| {
            anyhow!("No remote configured: pass --remote or set FILECACHE_REMOTE")
        })?,
    };

    Ok((command, CliConfig { cache_dir, remote }))
}

/// Pick a source implementation from the remote root's shape.
fn build_remote(remote: &str) -> Result<Arc<dyn RemoteSource>> {
    if remote.starts_with("http://") || remote.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(remote)?))
    } else {
        Ok(Arc::new(LocalDirSource::new(remote)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (command, config) = match parse_args() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    if let Command::Help = command {
        print_help();
        return Ok(());
    }

    let remote = build_remote(&config.remote)?;
    let cache = Cache::new(&config.cache_dir, remote)?;
    debug!(cache_dir = %config.cache_dir.display(), remote = %config.remote, "Cache ready");

    match command {
        Command::Get { key } => {
            let path = cache.get(&key).await?;
            println!("{}", path.display());
        }
        Command::Has { key } => {
            if cache.has(&key) {
                println!("cached");
            } else {
                println!("not cached");
                std::process::exit(1);
            }
        }
        Command::Remove { key } => {
            if cache.remove(&key).await? {
                println!("removed {}", key);
            } else {
                println!("{} was not cached", key);
            }
        }
        Command::Clear => {
            cache.clear().await?;
            println!("cache cleared");
        }
        Command::Help => unreachable!(),
    }

    Ok(())
}
