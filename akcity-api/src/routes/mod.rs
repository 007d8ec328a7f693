/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, logout, me)
/// - `permissions`: Role to permission table endpoints

pub mod auth;
pub mod health;
pub mod permissions;
