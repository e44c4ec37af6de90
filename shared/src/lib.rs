//! Shared domain types for the POS stock ledger
//!
//! This crate contains the ledger entities, the pure FIFO allocation and
//! reversal arithmetic, and validation helpers shared between the backend
//! services and their tests.

pub mod ledger;
pub mod models;
pub mod types;
pub mod validation;

pub use ledger::*;
pub use models::*;
pub use types::*;
pub use validation::*;
