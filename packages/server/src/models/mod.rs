pub mod application;
pub mod auth;
pub mod shared;
pub mod users;
