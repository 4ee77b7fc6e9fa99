//! Client-side state for medrec
//!
//! - [`store`]: reducer and shared store, one per resource
//! - [`resource`]: controllers that run backend calls and dispatch the results
//! - [`auth`]: login, signup and logout state
//!
//! # Example
//!
//! ```rust,no_run
//! use medrec_api_client::{ClientConfig, MedrecClient, SessionManager};
//! use medrec_sync::resource::{MedicationRequests, Resource};
//!
//! # async fn run() -> medrec_api_client::ApiResult<()> {
//! let config = ClientConfig::from_env()?;
//! let session = SessionManager::in_memory(config.session_ttl);
//! let client = MedrecClient::with_config(config, session)?;
//!
//! let records = Resource::new(client.records());
//! records.list().await?;
//! records.add(&serde_json::json!({"Name": "Jane Doe"})).await?;
//! println!("{} records", records.state().records.len());
//!
//! let prescriptions = Resource::new(MedicationRequests::all(client.prescriptions()));
//! prescriptions.list().await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod resource;
pub mod store;

pub use auth::{AuthController, AuthState};
pub use resource::{MedicationRequests, Resource, ResourceApi};
pub use store::{reduce, Action, Store, StoreState};
