use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authorization role attached to a user's credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Submitted or drafting an application.
    Applicant,
    /// Accepted participant.
    Hacker,
    Judge,
    Admin,
}

impl UserRole {
    /// All possible roles, in the order they are offered to dashboards.
    pub const ALL: &'static [UserRole] = &[Self::Applicant, Self::Hacker, Self::Judge, Self::Admin];

    /// The role given to newly created users and restored when a role document is invalid.
    pub const DEFAULT: UserRole = UserRole::Applicant;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applicant => "applicant",
            Self::Hacker => "hacker",
            Self::Judge => "judge",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Error when parsing an invalid role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    invalid: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid role '{}'. Valid values: {}",
            self.invalid,
            UserRole::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applicant" => Ok(Self::Applicant),
            "hacker" => Ok(Self::Hacker),
            "judge" => Ok(Self::Judge),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError {
                invalid: s.to_string(),
            }),
        }
    }
}
