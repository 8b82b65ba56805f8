//! # continuum-common
//!
//! Shared records, static catalogs, permission rules, configuration and error
//! handling used across all Continuum crates. This is the foundation layer:
//! no I/O, just primitives and contracts.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod permissions;
pub mod validation;
