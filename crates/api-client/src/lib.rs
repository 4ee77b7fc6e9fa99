//! HTTP client for the medrec records backend
//!
//! This crate provides a typed async client for the records, prescriptions
//! and authentication endpoints, plus the persisted session state it
//! authenticates with.
//!
//! # Features
//!
//! - **Environment-based configuration**: Load the base URL and limits from environment variables
//! - **Bearer authentication**: Token read from local storage before every request
//! - **Session expiry**: Expired sessions are cleared on read
//! - **Normalized errors**: Backend `message` fields surfaced as-is, generic text otherwise
//! - **Request correlation**: Track requests with unique IDs for debugging
//!
//! # Example
//!
//! ```rust,no_run
//! use medrec_api_client::{ClientConfig, MedrecClient, SessionManager};
//! use medrec_api_client::endpoints::auth::LoginRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let session = SessionManager::in_memory(config.session_ttl);
//!     let client = MedrecClient::with_config(config, session)?;
//!
//!     let login = client.auth().login(&LoginRequest::new("dr.who", "tardis")).await?;
//!     println!("Logged in as {:?}", login.role);
//!
//!     let records = client.records().list().await?;
//!     println!("{} records", records.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod record;
pub mod session;

pub use client::MedrecClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use record::{Record, RecordId};
pub use session::{Session, SessionManager};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::MedrecClient;
    pub use crate::config::ClientConfig;
    pub use crate::endpoints::{AuthApi, PrescriptionsApi, RecordsApi};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::record::{Record, RecordId};
    pub use crate::session::{Session, SessionManager};
}
