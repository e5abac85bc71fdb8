//! Drive Shelf Daemon - document library over a Google Drive folder tree
//!
//! Indexes PDFs (and other configured types) below a Drive folder, caches the
//! flat listing and serves search, browse and metadata requests over IPC.

mod cache;
mod config;
mod drive;
mod ipc;
mod library;
#[cfg(test)]
mod testing;

use anyhow::{anyhow, Context, Result};
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::DriveConfig;
use drive::DriveClient;
use ipc::IpcServer;
use library::{BrowseRequest, DriveLibrary, LibrarySettings};

/// CLI command
#[derive(Debug, PartialEq)]
enum Command {
    /// Run IPC server mode (default)
    Server,
    /// Print one page of the recursive listing
    List {
        folder_id: Option<String>,
        query: Option<String>,
        page: Option<u32>,
        page_size: Option<u32>,
    },
    /// Print one page of a folder's direct children
    Browse(BrowseRequest),
    /// Print metadata for one file
    Meta { file_id: String },
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"Drive Shelf - browse and search a Google Drive document library

USAGE:
    drive-shelf                                   # Run IPC server (default)
    drive-shelf list [folder_id] [--query Q] [--page N] [--page-size N]
    drive-shelf browse <folder_id> [--query Q] [--page-token T] [--page-size N]
    drive-shelf meta <file_id>
    drive-shelf help

COMMANDS:
    (none)  Run IPC server mode (waits for commands on the Unix socket)
    list    Search every document below a folder (recursive, cached)
    browse  List the direct children of one folder
    meta    Show metadata for one file
    help    Show this help message

ENVIRONMENT:
    GOOGLE_API_KEY              Drive API key (required)
    DRIVE_ROOT_FOLDER_ID        Default root folder for `list`
    DRIVE_TARGET_MIME_TYPES     Comma separated document types (default application/pdf)
    DRIVE_CACHE_TTL_SECS        Listing cache lifetime (default 600)
    DRIVE_BROWSE_PAGE_SIZE      Default browse page size (default 30)
    DRIVE_MAX_FOLDERS           Folder cap for one recursive walk (default 10000)
    DRIVE_MAX_RETRIES           Retries for transient API failures (default 2)
    DRIVE_REQUEST_TIMEOUT_SECS  HTTP timeout (default 30)
    DRIVE_SOCKET_PATH           IPC socket (default /tmp/drive-shelf.sock)
    RUST_LOG                    Log filter (trace, debug, info, warn, error)
"#
    );
}

fn parse_number(flag: &str, value: Option<String>) -> Result<u32> {
    let value = value.ok_or_else(|| anyhow!("{} needs a value", flag))?;
    value
        .parse()
        .with_context(|| format!("{} expects a number, got '{}'", flag, value))
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(name) = args.get(1) else {
        return Ok(Command::Server);
    };

    let mut positional: Vec<String> = Vec::new();
    let mut query = None;
    let mut page = None;
    let mut page_size = None;
    let mut page_token = None;

    let mut rest = args.iter().skip(2).cloned();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--query" | "-q" => {
                query = Some(rest.next().ok_or_else(|| anyhow!("--query needs a value"))?)
            }
            "--page" => page = Some(parse_number("--page", rest.next())?),
            "--page-size" => page_size = Some(parse_number("--page-size", rest.next())?),
            "--page-token" => {
                page_token = Some(
                    rest.next()
                        .ok_or_else(|| anyhow!("--page-token needs a value"))?,
                )
            }
            flag if flag.starts_with("--") => return Err(anyhow!("Unknown option: {}", flag)),
            _ => positional.push(arg),
        }
    }

    match name.as_str() {
        "list" => Ok(Command::List {
            folder_id: positional.into_iter().next(),
            query,
            page,
            page_size,
        }),
        "browse" => {
            let folder_id = positional
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("Usage: drive-shelf browse <folder_id>"))?;
            Ok(Command::Browse(BrowseRequest {
                folder_id,
                page_size,
                page_token,
                query,
            }))
        }
        "meta" => {
            let file_id = positional
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("Usage: drive-shelf meta <file_id>"))?;
            Ok(Command::Meta { file_id })
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => {
            eprintln!("Unknown command: {}", other);
            Ok(Command::Help)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().collect();
    let command = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    if command == Command::Help {
        print_help();
        return Ok(());
    }

    // Credential and settings are checked before anything touches the network
    let config = DriveConfig::from_env().context("Invalid configuration")?;
    let client = DriveClient::new(config.client_settings())?;
    let library = Arc::new(DriveLibrary::new(
        Arc::new(client),
        LibrarySettings::from(&config),
    ));

    match command {
        Command::Server => {
            info!(root = %library.default_root(), "Starting Drive Shelf daemon in IPC server mode");

            let mut ipc_server = IpcServer::new(Arc::clone(&library), config.socket_path.clone());
            if let Err(e) = ipc_server.start().await {
                error!(error = %e, "Failed to start IPC server");
                return Err(e);
            }
            let ipc_server = Arc::new(ipc_server);

            info!("Daemon ready. Waiting for commands...");

            let server = Arc::clone(&ipc_server);
            let ipc_handle = tokio::spawn(async move {
                if let Err(e) = server.run().await {
                    error!(error = %e, "IPC server error");
                }
            });

            tokio::signal::ctrl_c().await?;

            info!("Received shutdown signal, stopping...");
            ipc_handle.abort();
            ipc_server.stop()?;
            info!("Shutdown complete.");
        }
        Command::List {
            folder_id,
            query,
            page,
            page_size,
        } => {
            let result = library
                .search(folder_id.as_deref(), query.as_deref(), page, page_size)
                .await?;
            print_json(&result)?;
        }
        Command::Browse(request) => {
            let listing = library.list_drive_children(&request).await?;
            print_json(&listing)?;
        }
        Command::Meta { file_id } => {
            let meta = library.file_meta(&file_id).await?;
            print_json(&meta)?;
        }
        Command::Help => print_help(),
    }

    Ok(())
}
