//! Collapsing free-text survey answers into fixed buckets.
//!
//! Every function here is total: any input string maps to some bucket, so the
//! aggregator never has to reject a stored document for an unexpected answer.

/// Bucket for blank, unset and declined answers.
pub const NO_ANSWER: &str = "No Answer";
/// Bucket for answers outside a field's allow-list.
pub const OTHER: &str = "Other";

pub const GENDER_IDENTITY_ONE: &[&str] = &["Transgender", "Cisgender", "Non-binary"];

pub const GENDER_IDENTITY_TWO: &[&str] = &["Man", "Woman", "Non-binary"];

pub const SEXUAL_ORIENTATIONS: &[&str] = &[
    "Heterosexual or straight",
    "Gay or lesbian",
    "Bisexual",
    "Queer",
];

pub const ETHNIC_BACKGROUNDS: &[&str] = &[
    "Asian Indian",
    "Black/African",
    "Chinese",
    "Filipino",
    "Korean",
    "Guamanian/Chamorro",
    "Japanese",
    "Hispanic/Latino/Spanish Origin",
    "Middle Eastern",
    "Vietnamese",
    "Native Hawaiian",
    "Samoan",
    "Native American or Alaskan Native",
    "White",
    "Other Pacific Islander",
    "Other Asian (Cambodian, Thai, etc.)",
];

pub const TSHIRT_SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL", "XXXL"];

pub const DIETARY_RESTRICTIONS: &[&str] = &[
    "Gluten-Free",
    "Vegan",
    "Vegetarian",
    "Peanut Allergies",
    "Lactose Intolerant",
    "No Beef",
    "No Pork",
    "None",
];

/// Declined answers, compared case-insensitively after trimming.
const DECLINED: &[&str] = &["prefer not to answer", "no answer"];

/// Age range bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgeBucket {
    Under18,
    From18To25,
    From26To30,
    Over30,
}

impl AgeBucket {
    pub fn of(age: u32) -> Self {
        match age {
            0..=17 => Self::Under18,
            18..=25 => Self::From18To25,
            26..=30 => Self::From26To30,
            _ => Self::Over30,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Under18 => "<18",
            Self::From18To25 => "18-25",
            Self::From26To30 => "26-30",
            Self::Over30 => ">30",
        }
    }
}

/// Outcome of matching an answer against an allow-list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized {
    /// Canonical bucket the answer is counted under.
    pub bucket: String,
    /// The verbatim answer when it fell outside the allow-list.
    pub other: Option<String>,
}

impl Normalized {
    fn bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            other: None,
        }
    }

    fn other(original: &str) -> Self {
        Self {
            bucket: OTHER.to_string(),
            other: Some(original.to_string()),
        }
    }
}

/// True for empty, whitespace-only and "prefer not to answer" style values.
pub fn is_no_answer(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || DECLINED.iter().any(|d| value.eq_ignore_ascii_case(d))
}

/// Pass a free-form answer through unchanged unless it is a non-answer.
pub fn or_no_answer(value: &str) -> String {
    if is_no_answer(value) {
        NO_ANSWER.to_string()
    } else {
        value.trim().to_string()
    }
}

/// Match `value` case-insensitively against `allowed`, reporting the canonical spelling.
pub fn match_allow_list(value: &str, allowed: &[&str]) -> Normalized {
    if is_no_answer(value) {
        return Normalized::bucket(NO_ANSWER);
    }
    let trimmed = value.trim();
    allowed
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
        .map(|candidate| Normalized::bucket(*candidate))
        .unwrap_or_else(|| Normalized::other(value))
}

pub fn sexual_orientation(value: &str) -> Normalized {
    let mut normalized = match_allow_list(value, SEXUAL_ORIENTATIONS);
    if normalized.bucket == "Heterosexual or straight" {
        normalized.bucket = "Heterosexual".to_string();
    }
    normalized
}

/// Dietary answers are often phrased loosely ("no beef please", "N/A"), so a few
/// substrings are recognised before the allow-list is consulted.
pub fn dietary_restriction(value: &str) -> Normalized {
    if is_no_answer(value) {
        return Normalized::bucket(NO_ANSWER);
    }
    let lower = value.to_lowercase();
    if lower.contains("no beef") {
        Normalized::bucket("No Beef")
    } else if lower.contains("no pork") {
        Normalized::bucket("No Pork")
    } else if lower.contains("n/a") {
        Normalized::bucket("None")
    } else {
        match_allow_list(value, DIETARY_RESTRICTIONS)
    }
}

/// Collapse a yes/no answer by substring so form wording changes don't split buckets.
pub fn yes_no(value: &str) -> String {
    if is_no_answer(value) {
        return NO_ANSWER.to_string();
    }
    let lower = value.to_lowercase();
    if lower.contains("yes") {
        "Yes".to_string()
    } else if lower.contains("no") {
        "No".to_string()
    } else {
        value.trim().to_string()
    }
}

/// "2028 and beyond" becomes "2028+".
pub fn graduation_year(value: &str) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_lowercase();
    match lower.strip_suffix(" and beyond") {
        Some(year) => format!("{}+", year.trim()),
        None => or_no_answer(trimmed),
    }
}

pub fn college_affiliation(value: &str) -> String {
    if value.contains("N/A") {
        "N/A".to_string()
    } else {
        or_no_answer(value)
    }
}

/// Any answer containing a "0" is reported as "0", so "0 (this is my first!)" and
/// "10+" both land there.
pub fn hackathon_experience(value: &str) -> String {
    if value.contains('0') {
        "0".to_string()
    } else {
        or_no_answer(value)
    }
}

/// Coarse grouping of majors used by the dashboard's computing breakdown.
pub fn area_of_study_group(value: &str) -> String {
    let group = match value.trim() {
        v if is_no_answer(v) => NO_ANSWER,
        "Computer and Information Science" => "CS",
        "Computer Engineering" => "CE",
        "Game Design" => "Game Design",
        _ => OTHER,
    };
    group.to_string()
}

/// Whether the applicant attends the institution hosting the event.
pub fn school_affiliation(school: &str, host_institution: &str) -> &'static str {
    if !host_institution.trim().is_empty()
        && school.trim().eq_ignore_ascii_case(host_institution.trim())
    {
        "Affiliated"
    } else {
        "External"
    }
}
