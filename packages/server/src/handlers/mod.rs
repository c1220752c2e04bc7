pub mod application;
pub mod auth;
pub mod statistics;
pub mod users;
