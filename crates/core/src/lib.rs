//! Domain logic for the GA service-request backend.
//!
//! This crate is persistence-free: it owns the ticket lifecycle state
//! machine, the asset inventory ledger, approval decision rules, money
//! arithmetic, and role-based permissions. The `gasvc-db` crate maps
//! these aggregates to PostgreSQL rows; the `gasvc-api` crate drives
//! them from HTTP handlers.

pub mod approval;
pub mod asset;
pub mod error;
pub mod money;
pub mod roles;
pub mod ticket;
pub mod types;
