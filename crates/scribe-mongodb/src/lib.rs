//! MongoDB write executor for scribe
//!
//! This crate implements the database side of the scribe task plugin: it
//! opens one ping-verified connection, optionally resolves credentials from
//! the fallback file, runs an advisory server/driver compatibility check, and
//! performs exactly one insert, update, or upsert.
//!
//! # Features
//! - Structured connection options (no URI string assembly)
//! - `~/.mongodb.cnf` credentials fallback
//! - Hard-coded server/driver compatibility matrix
//! - Strict validation of names and data/filter documents
//! - Async via tokio

pub mod compat;
pub mod connection;
pub mod credentials;
pub mod validation;
pub mod write;

pub use compat::{check_compatibility, DRIVER_VERSION};
pub use connection::{Connection, ConnectionParams};
pub use credentials::{load_default_credentials, Credentials};
pub use scribe_common::{Result, ScribeError};
pub use validation::{json_to_document, ValidatedName};
pub use write::{WriteAction, WriteExecutor, WriteOutcome, WriteRequest};
