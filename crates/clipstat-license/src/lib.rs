//! License-token client: remote validation, a freshness cache, and storage
//! for both.

pub mod client;
pub mod error;
pub mod gate;
pub mod store;

pub use client::{LicenseClient, ValidateResponse};
pub use error::LicenseError;
pub use gate::{is_fresh, LicenseGate, ProSource, ProStatus};
pub use store::{FileStore, LicenseState, LicenseStore, MemoryStore, ProCache};
