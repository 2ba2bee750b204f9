// src/types/candidate.rs
//! Candidate record as loaded from the dataset

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub full_name: String,
    pub title: String,
    pub location: String,
    pub timezone: String,
    pub years_experience: u32,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub education_level: String,
    pub degree_major: String,
    pub availability_weeks: u32,
    pub willing_to_relocate: bool,
    /// One of `Remote`, `Hybrid`, `Onsite`
    pub work_preference: String,
    pub notice_period_weeks: u32,
    pub desired_salary_usd: u64,
    pub open_to_contract: bool,
    pub remote_experience_years: u32,
    pub visa_status: String,
    pub citizenships: Vec<String>,
    pub summary: String,
    pub tags: Vec<String>,
    pub last_active: String,
    pub linkedin_url: String,
}

/// Raw CSV row; list and flag columns are still plain text here.
#[derive(Debug, Deserialize)]
pub(crate) struct CandidateRow {
    pub id: String,
    pub full_name: String,
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub years_experience: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub languages: String,
    #[serde(default)]
    pub education_level: String,
    #[serde(default)]
    pub degree_major: String,
    #[serde(default)]
    pub availability_weeks: String,
    #[serde(default)]
    pub willing_to_relocate: String,
    #[serde(default)]
    pub work_preference: String,
    #[serde(default)]
    pub notice_period_weeks: String,
    #[serde(default)]
    pub desired_salary_usd: String,
    #[serde(default)]
    pub open_to_contract: String,
    #[serde(default)]
    pub remote_experience_years: String,
    #[serde(default)]
    pub visa_status: String,
    #[serde(default)]
    pub citizenships: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub last_active: String,
    #[serde(default)]
    pub linkedin_url: String,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            title: row.title,
            location: row.location,
            timezone: row.timezone,
            years_experience: parse_number(&row.years_experience),
            skills: parse_list(&row.skills),
            languages: parse_list(&row.languages),
            education_level: row.education_level,
            degree_major: row.degree_major,
            availability_weeks: parse_number(&row.availability_weeks),
            willing_to_relocate: parse_flag(&row.willing_to_relocate),
            work_preference: row.work_preference,
            notice_period_weeks: parse_number(&row.notice_period_weeks),
            desired_salary_usd: parse_number(&row.desired_salary_usd),
            open_to_contract: parse_flag(&row.open_to_contract),
            remote_experience_years: parse_number(&row.remote_experience_years),
            visa_status: row.visa_status,
            citizenships: parse_list(&row.citizenships),
            summary: row.summary,
            tags: parse_list(&row.tags),
            last_active: row.last_active,
            linkedin_url: row.linkedin_url,
        }
    }
}

/// `yes` in any case is true, everything else false
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

fn parse_list(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value.split(';').map(|item| item.trim().to_string()).collect()
}

/// Decimals are truncated; unparseable, negative or out-of-range numbers
/// fall back to zero.
fn parse_number<T: TryFrom<u64> + Default>(value: &str) -> T {
    let value = value.trim();
    let whole = value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0 && *n < u64::MAX as f64)
            .map(|n| n.trunc() as u64)
    });
    whole
        .and_then(|n| T::try_from(n).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("yes"));
        assert!(parse_flag(" YES "));
        assert!(!parse_flag("no"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list("React; TypeScript ;Node.js"),
            vec!["React", "TypeScript", "Node.js"]
        );
        assert!(parse_list("  ").is_empty());
    }

    #[test]
    fn test_parse_number_defaults_to_zero() {
        assert_eq!(parse_number::<u32>("12"), 12);
        assert_eq!(parse_number::<u32>("n/a"), 0);
        assert_eq!(parse_number::<u64>("-5"), 0);
    }

    #[test]
    fn test_parse_number_truncates_decimals() {
        assert_eq!(parse_number::<u64>("145000.0"), 145_000);
        assert_eq!(parse_number::<u32>(" 7.5 "), 7);
        assert_eq!(parse_number::<u32>("0.9"), 0);
        assert_eq!(parse_number::<u32>("-2.5"), 0);
        assert_eq!(parse_number::<u32>("NaN"), 0);
        assert_eq!(parse_number::<u32>("5000000000"), 0);
    }
}
