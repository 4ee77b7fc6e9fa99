//! Configuration loading and schema definitions
//!
//! Shared configuration types used by the client library and the CLI.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
