//! User domain entities.

pub mod model;
pub mod profile;

pub use model::{NewUser, User};
pub use profile::UserProfile;
