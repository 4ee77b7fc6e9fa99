//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for a specific set of backend endpoints.
//!
//! ## Mapping to the backend
//!
//! | Module | Routes | Description |
//! |--------|--------|-------------|
//! | `auth` | `/auth/signup`, `/auth/login` | Patient registration and login |
//! | `records` | `/records`, `/records/{id}` | Medical record CRUD |
//! | `prescriptions` | `/prescription/search`, `/prescription/{id}` | Medication request CRUD |

pub mod auth;
pub mod prescriptions;
pub mod records;

pub use auth::AuthApi;
pub use prescriptions::PrescriptionsApi;
pub use records::RecordsApi;
