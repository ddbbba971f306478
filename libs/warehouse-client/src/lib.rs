//! HTTP client for the data warehouse service: single/batch row inserts
//! with per-row error surfacing, and SQL queries executed as one-shot jobs.

pub mod client;
pub mod error;

pub use client::{RowInsertError, WarehouseClient};
pub use error::WarehouseError;
