//! POS stock ledger backend
//!
//! Library consumed by a host application's controllers. Tracks physical
//! quantity as it flows from bulk lots through repacked retail lots and the
//! POS catalog into sales, and keeps the counters consistent across
//! concurrent sales, voids and refunds: FIFO lot allocation, compensating
//! reversals (void, partial refund, broken-item write-off) and a retrying
//! atomic transaction boundary around every logical operation.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
