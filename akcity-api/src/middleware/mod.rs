/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Authentication and the permission guard
/// - Rate limiting
/// - Security headers

pub mod auth;
pub mod rate_limit;
pub mod security;
