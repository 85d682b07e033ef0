//! Shared utilities and common types for the EventSnaps backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT bearer-token validation (tokens are issued by the external identity
//!   provider; this service only verifies them)
//! - Event share-code generation
//! - Common validation logic
//! - Pagination types

pub mod codes;
pub mod jwt;
pub mod pagination;
pub mod validation;
