//! Core types and trait definitions for the Sentinel compliance registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod analytics;
pub mod camera;
pub mod company;
pub mod employee;
pub mod error;
pub mod filter;
pub mod fixtures;
pub mod identity;
pub mod lifecycle;
pub mod store;
pub mod violation;

pub use error::{Error, Result};
