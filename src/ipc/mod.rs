//! IPC server for UI clients

pub mod protocol;
pub mod server;

pub use server::IpcServer;
