use tracing::debug;

use super::normalize::{self, AgeBucket, NO_ANSWER, Normalized};
use super::{
    AggregationInput, AggregationOptions, CategoryCounts, Statistics, SubmissionRecord,
    SubmissionSummary,
};
use crate::application::{ApplicationStatus, Demographics, Logistics, Socials};

pub const DEMOGRAPHIC_CATEGORIES: &[&str] = &[
    "age",
    "age_range_18_to_25",
    "ethnic_background",
    "other_ethnic_background",
    "sexual_orientation",
    "other_sexual_orientation",
    "gender_identity_one",
    "other_gender_identity_one",
    "gender_identity_two",
    "other_gender_identity_two",
    "underrepresented_group",
    "country",
    "school_affiliation",
    "college_affiliation",
    "year_in_school",
    "graduation_year",
    "area_of_study",
    "area_of_study_group",
    "hackathon_experience",
    "first_hackathon",
];

pub const LOGISTIC_CATEGORIES: &[&str] = &[
    "need_travel_reimbursement",
    "need_charter_bus",
    "need_campus_parking_permit",
    "attendance_possible_wo_reimbursement",
    "tshirt_size",
    "other_tshirt_size",
    "dietary_restrictions",
    "other_dietary_restrictions",
];

pub const REFERRAL_CATEGORIES: &[&str] = &["referral"];

/// Build a full statistics snapshot from bulk query results.
///
/// The result depends only on the input (and its order), so re-running over
/// unchanged data yields an identical snapshot.
pub fn aggregate(input: &AggregationInput, options: &AggregationOptions) -> Statistics {
    let stats = Statistics {
        submissions: tally_submissions(&input.submissions),
        demographics: tally_demographics(&input.demographics, &options.host_institution),
        logistics: tally_logistics(&input.logistics),
        referral: tally_referrals(&input.referrals),
    };
    debug!(
        submissions = stats.submissions.total,
        demographics = input.demographics.len(),
        logistics = input.logistics.len(),
        referrals = input.referrals.len(),
        "Aggregated statistics"
    );
    stats
}

pub fn tally_submissions(records: &[SubmissionRecord]) -> SubmissionSummary {
    let mut summary = SubmissionSummary {
        total: records.len() as u64,
        ..Default::default()
    };

    for record in records {
        match record.status {
            ApplicationStatus::Accepted => summary.accepted += 1,
            ApplicationStatus::Rejected => summary.rejected += 1,
            ApplicationStatus::Draft | ApplicationStatus::Submitted => {}
        }
        let day = record.submitted_at.format("%m-%d-%Y").to_string();
        *summary.per_day.entry(day).or_insert(0) += 1;
    }

    summary.approval_rate =
        (summary.total > 0).then(|| summary.accepted as f64 / summary.total as f64);
    summary
}

pub fn tally_demographics(sections: &[Demographics], host_institution: &str) -> CategoryCounts {
    let mut counts = CategoryCounts::with_categories(DEMOGRAPHIC_CATEGORIES);

    for d in sections {
        match d.age {
            Some(age) => {
                let bucket = AgeBucket::of(age);
                counts.increment("age", bucket.label());
                if bucket == AgeBucket::From18To25 {
                    counts.increment("age_range_18_to_25", age.to_string());
                }
            }
            None => counts.increment("age", NO_ANSWER),
        }

        record(
            &mut counts,
            "ethnic_background",
            normalize::match_allow_list(&d.ethnic_background, normalize::ETHNIC_BACKGROUNDS),
        );
        record(
            &mut counts,
            "sexual_orientation",
            normalize::sexual_orientation(&d.sexual_orientation),
        );
        record(
            &mut counts,
            "gender_identity_one",
            normalize::match_allow_list(&d.gender_identity_one, normalize::GENDER_IDENTITY_ONE),
        );
        record(
            &mut counts,
            "gender_identity_two",
            normalize::match_allow_list(&d.gender_identity_two, normalize::GENDER_IDENTITY_TWO),
        );

        counts.increment(
            "underrepresented_group",
            normalize::yes_no(&d.underrepresented_group),
        );
        counts.increment("country", normalize::or_no_answer(&d.country));
        counts.increment(
            "school_affiliation",
            normalize::school_affiliation(&d.school, host_institution),
        );
        counts.increment(
            "college_affiliation",
            normalize::college_affiliation(&d.college_affiliation),
        );
        counts.increment("year_in_school", normalize::or_no_answer(&d.year_in_school));
        counts.increment(
            "graduation_year",
            normalize::graduation_year(&d.graduation_year),
        );
        counts.increment("area_of_study", normalize::or_no_answer(&d.area_of_study));
        counts.increment(
            "area_of_study_group",
            normalize::area_of_study_group(&d.area_of_study),
        );
        counts.increment(
            "hackathon_experience",
            normalize::hackathon_experience(&d.hackathon_experience),
        );
        counts.increment("first_hackathon", normalize::yes_no(&d.first_hackathon));
    }

    counts
}

pub fn tally_logistics(sections: &[Logistics]) -> CategoryCounts {
    let mut counts = CategoryCounts::with_categories(LOGISTIC_CATEGORIES);

    for l in sections {
        counts.increment(
            "need_travel_reimbursement",
            normalize::yes_no(&l.need_travel_reimbursement),
        );
        counts.increment("need_charter_bus", normalize::yes_no(&l.need_charter_bus));
        counts.increment(
            "need_campus_parking_permit",
            normalize::yes_no(&l.need_campus_parking_permit),
        );
        counts.increment(
            "attendance_possible_wo_reimbursement",
            normalize::yes_no(&l.attendance_possible_wo_reimbursement),
        );
        record(
            &mut counts,
            "tshirt_size",
            normalize::match_allow_list(&l.tshirt_size, normalize::TSHIRT_SIZES),
        );
        record(
            &mut counts,
            "dietary_restrictions",
            normalize::dietary_restriction(&l.dietary_restrictions),
        );
    }

    counts
}

pub fn tally_referrals(sections: &[Socials]) -> CategoryCounts {
    let mut counts = CategoryCounts::with_categories(REFERRAL_CATEGORIES);
    for s in sections {
        counts.increment("referral", normalize::or_no_answer(&s.referral));
    }
    counts
}

/// Count a normalized answer, and its verbatim text under `other_<category>` when it
/// fell outside the allow-list.
fn record(counts: &mut CategoryCounts, category: &str, normalized: Normalized) {
    if let Some(original) = normalized.other {
        counts.increment(&format!("other_{category}"), original);
    }
    counts.increment(category, normalized.bucket);
}
