mod application;
mod auth;
mod common;
mod statistics;
