use portal_common::UserRole;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::identity::{UserPage, UserRecord};

/// Query parameters for listing users.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ListUsersQuery {
    /// Token returned as `next_page_token` by the previous page.
    pub page_token: Option<String>,
    /// Users per page (1-1000, default 100).
    pub max_results: Option<u64>,
}

/// One page of identity users.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserRecord>,
    /// Absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl From<UserPage> for UserListResponse {
    fn from(page: UserPage) -> Self {
        Self {
            users: page.users,
            next_page_token: page.next_page_token,
        }
    }
}

/// Request body for assigning a role.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetRoleRequest {
    /// One of `applicant`, `hacker`, `judge`, `admin`.
    #[schema(example = "hacker")]
    pub role: String,
}

pub fn validate_set_role_request(payload: &SetRoleRequest) -> Result<UserRole, AppError> {
    payload
        .role
        .trim()
        .parse()
        .map_err(|e: portal_common::role::ParseRoleError| AppError::invalid("role", e.to_string()))
}
