//! Fundamental types for the token-curated registry.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identities, listing names, timestamps and the immutable configuration
//! of the ledger and the registry.

pub mod address;
pub mod amount;
pub mod error;
pub mod name;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use error::TypesError;
pub use name::ListingName;
pub use params::{RegistryParams, TokenParams};
pub use time::Timestamp;
