use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rejected field in an incoming document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ValidationIssue {
    /// Dotted path of the offending field, e.g. `user.email`.
    #[schema(example = "user.email")]
    pub path: String,
    /// Human-readable description of the constraint that failed.
    #[schema(example = "Email must be a valid address")]
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Collects issues across a whole document so callers see every problem at once.
#[derive(Debug, Default)]
pub struct Issues(Vec<ValidationIssue>);

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue::new(path, message));
    }

    /// Require a trimmed string of `1..=max` characters.
    pub fn required_text(&mut self, path: &str, value: &str, max: usize) {
        let value = value.trim();
        if value.is_empty() {
            self.push(path, "Required");
        } else if value.chars().count() > max {
            self.push(path, format!("Must be at most {max} characters"));
        }
    }

    /// Allow an empty string, but cap its length.
    pub fn optional_text(&mut self, path: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(path, format!("Must be at most {max} characters"));
        }
    }

    pub fn into_result(self) -> Result<(), Vec<ValidationIssue>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
///
/// Emails key document paths, so `/` is rejected as well.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(|c| c.is_whitespace() || c == '/')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Canonical form of an email address; document paths and identity lookups use it.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Strip formatting from a North American phone number, returning its 10 digits.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    (digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit())).then_some(digits)
}
