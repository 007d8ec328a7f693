//! # AkCity Core Library
//!
//! Domain layer for the AkCity construction project management platform:
//! entities with lifecycle rules, role-based permissions, authentication
//! services, and the use-cases that tie them together. Everything here is
//! transport-agnostic; the HTTP surface lives in `akcity-api`.
//!
//! ## Module Organization
//!
//! - `entities`: Users, projects, and tasks with their state machines
//! - `permissions`: Static role-to-permission table with wildcard support
//! - `auth`: Argon2id password hashing and JWT issuance/verification
//! - `use_cases`: Registration and login flows
//! - `repositories`: Async storage traits plus in-memory implementations
//! - `postgres`: sqlx-backed repositories, pool setup, and migrations
//! - `notify`: Outbound notification seam
//! - `error`: Unified error taxonomy for all of the above

pub mod auth;
pub mod entities;
pub mod error;
pub mod notify;
pub mod permissions;
pub mod postgres;
pub mod repositories;
pub mod use_cases;

/// Current version of the AkCity core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
