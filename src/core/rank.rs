// src/core/rank.rs
//! Multi-key stable ranking

use std::cmp::Ordering;
use tracing::warn;

use crate::types::{Candidate, Direction, RankField, RankingPlan, SortKey};

/// A comparable view of one candidate field
#[derive(Debug, PartialEq)]
enum FieldValue<'a> {
    Text(&'a str),
    Number(u64),
    Flag(bool),
}

impl<'a> FieldValue<'a> {
    fn of(candidate: &'a Candidate, field: &RankField) -> Option<Self> {
        let value = match field {
            RankField::Id => Self::Text(&candidate.id),
            RankField::FullName => Self::Text(&candidate.full_name),
            RankField::Title => Self::Text(&candidate.title),
            RankField::Location => Self::Text(&candidate.location),
            RankField::Timezone => Self::Text(&candidate.timezone),
            RankField::YearsExperience => Self::Number(candidate.years_experience.into()),
            RankField::EducationLevel => Self::Text(&candidate.education_level),
            RankField::DegreeMajor => Self::Text(&candidate.degree_major),
            RankField::AvailabilityWeeks => Self::Number(candidate.availability_weeks.into()),
            RankField::WillingToRelocate => Self::Flag(candidate.willing_to_relocate),
            RankField::WorkPreference => Self::Text(&candidate.work_preference),
            RankField::NoticePeriodWeeks => Self::Number(candidate.notice_period_weeks.into()),
            RankField::DesiredSalaryUsd => Self::Number(candidate.desired_salary_usd),
            RankField::OpenToContract => Self::Flag(candidate.open_to_contract),
            RankField::RemoteExperienceYears => {
                Self::Number(candidate.remote_experience_years.into())
            }
            RankField::VisaStatus => Self::Text(&candidate.visa_status),
            RankField::Summary => Self::Text(&candidate.summary),
            RankField::LastActive => Self::Text(&candidate.last_active),
            RankField::LinkedinUrl => Self::Text(&candidate.linkedin_url),
            RankField::Unresolved(_) => return None,
        };
        Some(value)
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => collate(a, b),
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            // false < true
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Dictionary-style string ordering. Case and common Latin accents are
/// ignored first; then unaccented sorts before accented, and lower case
/// before upper case.
pub fn collate(a: &str, b: &str) -> Ordering {
    let lower = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    let (lower_a, lower_b) = (lower(a), lower(b));
    let base_a = lower_a.iter().copied().map(strip_accent);
    let base_b = lower_b.iter().copied().map(strip_accent);
    base_a
        .cmp(base_b)
        .then_with(|| lower_a.cmp(&lower_b))
        .then_with(|| b.cmp(a))
}

/// Base letter of a lower-case Latin-1 accented letter.
fn strip_accent(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn compare_key(a: &Candidate, b: &Candidate, key: &SortKey) -> Ordering {
    let ordering = match (FieldValue::of(a, &key.field), FieldValue::of(b, &key.field)) {
        (Some(x), Some(y)) => x.compare(&y),
        _ => Ordering::Equal,
    };
    match key.direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

/// Returns a reordered copy; the input slice is untouched and ties keep
/// their input order.
pub fn rank_candidates(candidates: &[Candidate], plan: &RankingPlan) -> Vec<Candidate> {
    for key in plan.keys().filter(|key| !key.field.is_resolved()) {
        // Treated as a tie at that step, not an error.
        warn!(
            field = %key.field,
            "Ranking field does not resolve to a comparable value, step ignored"
        );
    }

    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| {
        plan.keys()
            .map(|key| compare_key(a, b, key))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    ranked
}
