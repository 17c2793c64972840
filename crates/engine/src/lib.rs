//! Analytical queries over coins, wallets and contracts.
//!
//! [`catalog`] names the nine queries, [`queries`] runs them as SQL against
//! PostgreSQL, [`dataset`] evaluates the same semantics over an in-memory
//! dataset, and [`store`] dispatches between the two.

pub mod catalog;
pub mod dataset;
pub mod queries;
pub mod store;
