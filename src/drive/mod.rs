//! Google Drive listing client

pub mod backend;
pub mod client;
pub mod errors;
pub mod query;
pub mod types;

pub use backend::ListingBackend;
pub use client::{ClientSettings, DriveClient, ErrorEntry};
pub use errors::DriveError;
pub use types::*;
