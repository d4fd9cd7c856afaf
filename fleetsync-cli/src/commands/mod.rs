pub mod admin;
pub mod context;
pub mod driver;
pub mod reconcile;
pub mod user;
