//! Core types and trait definitions for the hiring ingest service.
//!
//! No HTTP or database code lives here; the CSV codec, the SQLite store and
//! the API crate all build on these types.

// Store backends implement the trait with plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod record;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use record::{Department, EntityKind, HiredEmployee, Job, Record};
pub use schema::{FieldValues, RecordSchema};
