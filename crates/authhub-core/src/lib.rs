//! # authhub-core
//!
//! Core crate for AuthHub. Contains the unified error system, configuration
//! schemas, typed identifiers, the clock abstraction, and the traits that
//! the storage, cache, and auth crates implement.
//!
//! This crate has **no** internal dependencies on other AuthHub crates.

pub mod bounded;
pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use bounded::bounded;
pub use clock::{Clock, SystemClock};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
