//! Common utilities for scribe
//!
//! This crate provides the shared error type used across all scribe crates.

pub mod error;

pub use error::{Result, ScribeError};
