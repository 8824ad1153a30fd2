//! Core types and trait definitions for the Compass student-support service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend, the AI gateway and the HTTP layer all depend on it.

// Native `async fn` in traits; see `store` for the `Send` bounds we rely on.
#![allow(async_fn_in_trait)]

pub mod context;
pub mod conversation;
pub mod directory;
pub mod error;
pub mod intervention;
pub mod performance;
pub mod profile;
pub mod prompt;
pub mod store;

pub use error::{Error, Result};
