//! Daemon configuration from the process environment

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::drive::client::DEFAULT_API_BASE;
use crate::drive::query::MAX_PAGE_SIZE;
use crate::drive::types::PDF_MIME_TYPE;
use crate::drive::{ClientSettings, DriveError};

/// Root folder used when a request names none
pub const DEFAULT_ROOT_FOLDER_ID: &str = "1hycfYG1qXzo6tRyMmNDj1rW06jpT_W_t";

/// Socket path for IPC communication
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/drive-shelf.sock";

#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub api_key: String,
    pub api_base: String,
    pub root_folder_id: String,
    pub target_mime_types: Vec<String>,
    pub cache_ttl: Duration,
    pub browse_page_size: u32,
    pub max_folders: usize,
    pub max_retries: u32,
    pub request_timeout: Duration,
    pub socket_path: PathBuf,
}

impl DriveConfig {
    pub fn from_env() -> Result<Self, DriveError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DriveError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var("GOOGLE_API_KEY").ok_or_else(|| {
            DriveError::config("Missing GOOGLE_API_KEY. Set it in the daemon environment.")
        })?;

        let api_base = var("DRIVE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into());
        let root_folder_id =
            var("DRIVE_ROOT_FOLDER_ID").unwrap_or_else(|| DEFAULT_ROOT_FOLDER_ID.into());

        let target_mime_types: Vec<String> = var("DRIVE_TARGET_MIME_TYPES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let target_mime_types = if target_mime_types.is_empty() {
            vec![PDF_MIME_TYPE.to_string()]
        } else {
            target_mime_types
        };

        let cache_ttl_secs: u64 = parse_var(&var, "DRIVE_CACHE_TTL_SECS", 600)?;
        let browse_page_size: u32 = parse_var(&var, "DRIVE_BROWSE_PAGE_SIZE", 30)?;
        let max_folders: usize = parse_var(&var, "DRIVE_MAX_FOLDERS", 10_000)?;
        let max_retries: u32 = parse_var(&var, "DRIVE_MAX_RETRIES", 2)?;
        let timeout_secs: u64 = parse_var(&var, "DRIVE_REQUEST_TIMEOUT_SECS", 30)?;

        if max_folders == 0 {
            return Err(DriveError::config("DRIVE_MAX_FOLDERS must be at least 1"));
        }

        let socket_path =
            PathBuf::from(var("DRIVE_SOCKET_PATH").unwrap_or_else(|| DEFAULT_SOCKET_PATH.into()));

        Ok(Self {
            api_key,
            api_base,
            root_folder_id,
            target_mime_types,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            browse_page_size: browse_page_size.clamp(1, MAX_PAGE_SIZE),
            max_folders,
            max_retries,
            request_timeout: Duration::from_secs(timeout_secs),
            socket_path,
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            api_base: self.api_base.clone(),
            api_key: self.api_key.clone(),
            request_timeout: self.request_timeout,
            max_retries: self.max_retries,
        }
    }
}

fn parse_var<T, F>(var: &F, name: &str, default: T) -> Result<T, DriveError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|err| DriveError::config(format!("invalid {}: {}", name, err))),
        None => Ok(default),
    }
}
