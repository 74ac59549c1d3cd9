//! # authhub-database
//!
//! PostgreSQL connection management, migrations, and the Identity Store:
//! the [`UserStore`] trait with a Postgres and an in-memory implementation.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use repositories::{MemoryUserRepository, PgUserRepository};
pub use store::UserStore;
