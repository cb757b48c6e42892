pub mod admin;
pub mod approvals;
pub mod assets;
pub mod auth;
pub mod tickets;
