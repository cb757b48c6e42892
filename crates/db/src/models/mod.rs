pub mod approval;
pub mod asset;
pub mod ticket;
pub mod user;
