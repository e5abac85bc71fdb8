//! IPC Server - Unix socket server for UI clients
//!
//! Handles incoming connections and dispatches commands to the
//! [`DriveLibrary`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::ipc::protocol::{parse_command, serialize_response, Command, Response, PROTOCOL_VERSION};
use crate::library::DriveLibrary;

/// IPC Server that listens for commands from UI clients
pub struct IpcServer {
    library: Arc<DriveLibrary>,
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    /// Active connections counter
    connection_count: Arc<RwLock<u32>>,
}

impl IpcServer {
    pub fn new(library: Arc<DriveLibrary>, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            library,
            socket_path: socket_path.into(),
            listener: None,
            connection_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Bind the socket, replacing a stale socket file if present
    pub async fn start(&mut self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .context("Failed to remove existing socket file")?;
        }

        let listener = UnixListener::bind(&self.socket_path).context("Failed to bind Unix socket")?;

        info!(socket_path = %self.socket_path.display(), "IPC server started");

        self.listener = Some(listener);
        Ok(())
    }

    /// Run the server loop, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("Server not started")?;

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let library = Arc::clone(&self.library);
                    let connection_count = Arc::clone(&self.connection_count);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, library, connection_count).await {
                            error!(error = %e, "Connection handler error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Remove the socket file
    pub fn stop(&self) -> Result<()> {
        remove_socket(&self.socket_path)?;
        info!("IPC server stopped");
        Ok(())
    }
}

fn remove_socket(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path).context("Failed to remove socket file")?;
    }
    Ok(())
}

/// Handle a single client connection
async fn handle_connection(
    stream: UnixStream,
    library: Arc<DriveLibrary>,
    connection_count: Arc<RwLock<u32>>,
) -> Result<()> {
    {
        let mut count = connection_count.write().await;
        *count += 1;
        debug!(count = *count, "New connection");
    }

    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);
    let mut line = String::new();

    // Read commands line by line (newline-delimited JSON)
    loop {
        line.clear();
        match buf_reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("Connection closed by client");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                debug!(command = %trimmed, "Received command");

                let response = match parse_command(trimmed.as_bytes()) {
                    Ok(command) => process_command(command, &library).await,
                    Err(e) => {
                        error!(error = %e, command = %trimmed, "Failed to parse command");
                        Response::Error {
                            error: format!("Invalid command: {}", e),
                        }
                    }
                };

                match serialize_response(&response) {
                    Ok(json) => {
                        if let Err(e) = writer.write_all(&json).await {
                            error!(error = %e, "Failed to write response");
                            break;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to serialize response");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to read from socket");
                break;
            }
        }
    }

    {
        let mut count = connection_count.write().await;
        *count = count.saturating_sub(1);
        debug!(count = *count, "Connection ended");
    }

    Ok(())
}

/// Process a command and return a response
async fn process_command(command: Command, library: &DriveLibrary) -> Response {
    match command {
        Command::ListFiles {
            folder_id,
            query,
            page,
            page_size,
        } => {
            debug!(folder_id = ?folder_id, query = ?query, page = ?page, "Processing listFiles command");

            match library
                .search(folder_id.as_deref(), query.as_deref(), page, page_size)
                .await
            {
                Ok(result) => Response::Files {
                    total: result.total,
                    page: result.page,
                    page_size: result.page_size,
                    items: result.items,
                },
                Err(e) => {
                    error!(error = %e, "listFiles failed");
                    Response::Error {
                        error: e.to_string(),
                    }
                }
            }
        }

        Command::Browse(request) => {
            debug!(folder_id = %request.folder_id, "Processing browse command");

            match library.list_drive_children(&request).await {
                Ok(listing) => Response::Listing {
                    items: listing.items,
                    next_page_token: listing.next_page_token,
                },
                Err(e) => {
                    error!(error = %e, "browse failed");
                    Response::Error {
                        error: e.to_string(),
                    }
                }
            }
        }

        Command::FileMeta { id } => match library.file_meta(&id).await {
            Ok(file) => Response::Meta { file },
            Err(e) => Response::Error {
                error: e.to_string(),
            },
        },

        Command::InvalidateCache => {
            info!("Processing invalidateCache command");
            library.invalidate().await;
            Response::Success {
                message: Some("Caches invalidated".to_string()),
            }
        }

        Command::GetStatus => {
            let status = library.status().await;
            Response::Status {
                version: PROTOCOL_VERSION,
                healthy: status.health == "healthy",
                library: status,
            }
        }
    }
}
