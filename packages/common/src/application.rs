use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::{Issues, ValidationIssue, is_valid_email, normalize_phone};

const NAME_MAX: usize = 64;
const FIELD_MAX: usize = 256;
const RESPONSE_MAX: usize = 2500;

/// Review status of an application.
///
/// Transitions are `Draft -> Submitted -> Accepted | Rejected` in practice; nothing
/// enforces the order. Stored documents are parsed through [`FromStr`], so an unknown
/// status reads as a [`ParseStatusError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: &'static [ApplicationStatus] =
        &[Self::Draft, Self::Submitted, Self::Accepted, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            ApplicationStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Account details supplied by applicants who do not have a login yet.
#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ApplicantAccount {
    #[schema(example = "Sammy")]
    pub first_name: String,
    #[schema(example = "Slug")]
    pub last_name: String,
    #[schema(example = "sammy@ucsc.edu")]
    pub email: String,
    /// 10-digit North American number; punctuation is ignored.
    #[schema(example = "(831) 459-0111")]
    pub phone_number: String,
    /// Only required when creating an account.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl ApplicantAccount {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    fn validate(&self, require_password: bool, issues: &mut Issues) {
        issues.required_text("user.first_name", &self.first_name, NAME_MAX);
        issues.required_text("user.last_name", &self.last_name, NAME_MAX);
        if !is_valid_email(self.email.trim()) {
            issues.push("user.email", "Email must be a valid address");
        }
        if normalize_phone(&self.phone_number).is_none() {
            issues.push("user.phone_number", "Phone number must have 10 digits");
        }
        match &self.password {
            Some(password) if password.len() < 8 || password.len() > 128 => {
                issues.push("user.password", "Password must be 8-128 characters");
            }
            None if require_password => issues.push("user.password", "Required"),
            _ => {}
        }
    }
}

/// Demographic answers. Free-text fields default to empty, which statistics report as
/// "No Answer".
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct Demographics {
    #[schema(example = 20)]
    pub age: Option<u32>,
    #[schema(example = "United States")]
    pub country: String,
    #[schema(example = "University of California, Santa Cruz")]
    pub school: String,
    pub year_in_school: String,
    pub graduation_year: String,
    pub area_of_study: String,
    pub college_affiliation: String,
    pub first_hackathon: String,
    pub hackathon_experience: String,
    pub ethnic_background: String,
    pub pronouns: String,
    pub gender_identity_one: String,
    pub gender_identity_two: String,
    pub sexual_orientation: String,
    pub underrepresented_group: String,
}

impl Demographics {
    fn validate(&self, issues: &mut Issues) {
        if let Some(age) = self.age
            && !(1..=120).contains(&age)
        {
            issues.push("demographics.age", "Age must be between 1 and 120");
        }
        issues.required_text("demographics.country", &self.country, FIELD_MAX);
        issues.required_text("demographics.school", &self.school, FIELD_MAX);
        for (name, value) in [
            ("year_in_school", &self.year_in_school),
            ("graduation_year", &self.graduation_year),
            ("area_of_study", &self.area_of_study),
            ("college_affiliation", &self.college_affiliation),
            ("first_hackathon", &self.first_hackathon),
            ("hackathon_experience", &self.hackathon_experience),
            ("ethnic_background", &self.ethnic_background),
            ("pronouns", &self.pronouns),
            ("gender_identity_one", &self.gender_identity_one),
            ("gender_identity_two", &self.gender_identity_two),
            ("sexual_orientation", &self.sexual_orientation),
            ("underrepresented_group", &self.underrepresented_group),
        ] {
            issues.optional_text(&format!("demographics.{name}"), value, FIELD_MAX);
        }
    }
}

/// Free-response answers.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ShortResponse {
    pub why_attend: String,
    pub what_to_learn: String,
    pub prior_experience: String,
    pub anything_else: String,
}

impl ShortResponse {
    fn validate(&self, issues: &mut Issues) {
        issues.required_text("short_response.why_attend", &self.why_attend, RESPONSE_MAX);
        issues.required_text("short_response.what_to_learn", &self.what_to_learn, RESPONSE_MAX);
        issues.optional_text(
            "short_response.prior_experience",
            &self.prior_experience,
            RESPONSE_MAX,
        );
        issues.optional_text("short_response.anything_else", &self.anything_else, RESPONSE_MAX);
    }
}

/// Travel, meal and merchandise preferences.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct Logistics {
    pub need_travel_reimbursement: String,
    pub need_charter_bus: String,
    pub need_campus_parking_permit: String,
    pub attendance_possible_wo_reimbursement: String,
    #[schema(example = "M")]
    pub tshirt_size: String,
    #[schema(example = "Vegetarian")]
    pub dietary_restrictions: String,
    pub additional_accommodations: String,
}

impl Logistics {
    fn validate(&self, issues: &mut Issues) {
        issues.required_text("logistics.tshirt_size", &self.tshirt_size, 32);
        for (name, value) in [
            ("need_travel_reimbursement", &self.need_travel_reimbursement),
            ("need_charter_bus", &self.need_charter_bus),
            ("need_campus_parking_permit", &self.need_campus_parking_permit),
            (
                "attendance_possible_wo_reimbursement",
                &self.attendance_possible_wo_reimbursement,
            ),
            ("dietary_restrictions", &self.dietary_restrictions),
        ] {
            issues.optional_text(&format!("logistics.{name}"), value, FIELD_MAX);
        }
        issues.optional_text(
            "logistics.additional_accommodations",
            &self.additional_accommodations,
            RESPONSE_MAX,
        );
    }
}

/// Profile links and how the applicant heard about the event.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct Socials {
    pub resume_link: String,
    pub github: String,
    pub linkedin: String,
    pub devpost: String,
    pub personal_website: String,
    pub discord: String,
    #[schema(example = "Instagram")]
    pub referral: String,
}

impl Socials {
    fn validate(&self, issues: &mut Issues) {
        for (name, value) in [
            ("resume_link", &self.resume_link),
            ("github", &self.github),
            ("linkedin", &self.linkedin),
            ("devpost", &self.devpost),
            ("personal_website", &self.personal_website),
            ("discord", &self.discord),
            ("referral", &self.referral),
        ] {
            issues.optional_text(&format!("socials.{name}"), value, FIELD_MAX);
        }
    }
}

/// A complete application form as posted by the client.
#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ApplicationSubmission {
    #[serde(default)]
    pub user: Option<ApplicantAccount>,
    pub demographics: Demographics,
    pub short_response: ShortResponse,
    pub logistics: Logistics,
    pub socials: Socials,
}

impl ApplicationSubmission {
    /// Validate a submission from someone creating their account with it.
    ///
    /// The `user` section, including a password, is mandatory.
    pub fn validate_new_account(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Issues::new();
        match &self.user {
            Some(user) => user.validate(true, &mut issues),
            None => issues.push("user", "Required"),
        }
        self.validate_sections(&mut issues);
        issues.into_result()
    }

    /// Validate a submission from an already signed-in user.
    pub fn validate_existing_account(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Issues::new();
        if let Some(user) = &self.user {
            user.validate(false, &mut issues);
        }
        self.validate_sections(&mut issues);
        issues.into_result()
    }

    fn validate_sections(&self, issues: &mut Issues) {
        self.demographics.validate(issues);
        self.short_response.validate(issues);
        self.logistics.validate(issues);
        self.socials.validate(issues);
    }
}
