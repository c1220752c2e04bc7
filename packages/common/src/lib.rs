pub mod application;
pub mod role;
pub mod role_sync;
pub mod statistics;
pub mod validation;

pub use application::{ApplicationStatus, ApplicationSubmission};
pub use role::UserRole;
pub use validation::ValidationIssue;
