//! Database models for the POS stock ledger
//!
//! Re-exports models from the shared crate and adds the sqlx row mappings
//! the services read them through.

pub use shared::models::*;

mod rows;
pub use rows::*;
