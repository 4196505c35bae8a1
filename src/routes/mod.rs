pub mod ship;
pub mod user;
