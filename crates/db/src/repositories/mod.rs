//! Typed repositories over the PostgreSQL schema.
//!
//! Repositories are stateless unit structs of async functions. Reads take
//! a `&PgPool`; writes that participate in a use-case transaction take a
//! `&mut PgConnection` so callers control commit and rollback. Guarded
//! updates compare the aggregate's `version` column and report whether
//! the row was won via the affected-row count.

pub mod approval_repo;
pub mod asset_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use approval_repo::ApprovalRepo;
pub use asset_repo::AssetRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::{NewUserRecord, UserRepo};
