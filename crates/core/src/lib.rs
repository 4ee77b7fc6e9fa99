//! Core utilities for the medrec client
//!
//! This crate provides functionality shared by the API client, the sync
//! layer and the command-line front end:
//!
//! - **Error handling**: Structured errors with codes and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults for every field
//! - **Local storage**: Key/value persistence for session state (file or memory backed)
//!
//! # Example
//!
//! ```rust,no_run
//! use medrec_core::{config::Config, storage::{FileStorage, Storage}};
//!
//! let config = Config::load(None).expect("Invalid configuration");
//! let storage = FileStorage::open(config.schema.storage.resolve_path())
//!     .expect("Storage unavailable");
//!
//! if let Some(token) = storage.get("token").expect("Read failed") {
//!     println!("Legacy token present ({} chars)", token.len());
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod storage;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
    pub use crate::storage::{FileStorage, MemoryStorage, Storage};
}
