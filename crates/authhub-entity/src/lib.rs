//! # authhub-entity
//!
//! Domain entity models for AuthHub. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`.

pub mod oauth;
pub mod user;
