// src/types/plan.rs
//! Filter and ranking plans produced by the planning phase

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Reads `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Include/exclude criteria evaluated against every candidate.
///
/// `{}` (no groups) matches every candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Criteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Criteria>,
}

impl FilterPlan {
    pub fn is_empty(&self) -> bool {
        self.include.as_ref().map_or(true, Criteria::is_empty)
            && self.exclude.as_ref().map_or(true, Criteria::is_empty)
    }
}

/// One criteria group. The same shape is used for `include` and `exclude`;
/// their evaluation differs (see `core::filter`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    // Text fields, normalized substring matching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<Vec<String>>,

    // Set fields, exact membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    // Enum-like fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_preference: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_status: Option<Vec<String>>,

    // Inclusive numeric bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_salary_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_salary_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_weeks_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_weeks_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice_period_weeks_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice_period_weeks_max: Option<f64>,

    // Booleans; absent means "don't care"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub willing_to_relocate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_to_contract: Option<bool>,

    /// Keys the planner sent that no criterion understands.
    #[serde(flatten, skip_serializing)]
    pub unrecognized: BTreeMap<String, Value>,
}

impl Criteria {
    /// True when no criterion is set. Unrecognized keys do not count.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.location.is_none()
            && self.full_name.is_none()
            && self.skills.is_none()
            && self.languages.is_none()
            && self.tags.is_none()
            && self.education_level.is_none()
            && self.work_preference.is_none()
            && self.visa_status.is_none()
            && self.years_experience_min.is_none()
            && self.years_experience_max.is_none()
            && self.desired_salary_min.is_none()
            && self.desired_salary_max.is_none()
            && self.availability_weeks_min.is_none()
            && self.availability_weeks_max.is_none()
            && self.notice_period_weeks_min.is_none()
            && self.notice_period_weeks_max.is_none()
            && self.willing_to_relocate.is_none()
            && self.open_to_contract.is_none()
    }

    /// Include group used when the planner returns nothing to narrow on.
    pub fn permissive() -> Self {
        Self {
            years_experience_min: Some(0.0),
            desired_salary_min: Some(0.0),
            ..Self::default()
        }
    }
}

/// Sort direction. Parsing is case-insensitive; anything other than `desc`
/// (including `null`) ranks ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::trim) {
            Some(name) if name.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(name) if name.eq_ignore_ascii_case("asc") => Direction::Asc,
            other => {
                warn!(direction = ?other, "unrecognized sort direction, ranking ascending");
                Direction::Asc
            }
        })
    }
}

/// Candidate fields a ranking key can name.
///
/// List-valued fields (skills, languages, citizenships, tags) and names that
/// do not exist on a candidate resolve to `Unresolved`, which compares as a
/// tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RankField {
    Id,
    FullName,
    Title,
    Location,
    Timezone,
    YearsExperience,
    EducationLevel,
    DegreeMajor,
    AvailabilityWeeks,
    WillingToRelocate,
    WorkPreference,
    NoticePeriodWeeks,
    DesiredSalaryUsd,
    OpenToContract,
    RemoteExperienceYears,
    VisaStatus,
    Summary,
    LastActive,
    LinkedinUrl,
    Unresolved(String),
}

impl RankField {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Id => "id",
            Self::FullName => "full_name",
            Self::Title => "title",
            Self::Location => "location",
            Self::Timezone => "timezone",
            Self::YearsExperience => "years_experience",
            Self::EducationLevel => "education_level",
            Self::DegreeMajor => "degree_major",
            Self::AvailabilityWeeks => "availability_weeks",
            Self::WillingToRelocate => "willing_to_relocate",
            Self::WorkPreference => "work_preference",
            Self::NoticePeriodWeeks => "notice_period_weeks",
            Self::DesiredSalaryUsd => "desired_salary_usd",
            Self::OpenToContract => "open_to_contract",
            Self::RemoteExperienceYears => "remote_experience_years",
            Self::VisaStatus => "visa_status",
            Self::Summary => "summary",
            Self::LastActive => "last_active",
            Self::LinkedinUrl => "linkedin_url",
            Self::Unresolved(name) => name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved(_))
    }
}

impl From<String> for RankField {
    fn from(name: String) -> Self {
        match name.as_str() {
            "id" => Self::Id,
            "full_name" => Self::FullName,
            "title" => Self::Title,
            "location" => Self::Location,
            "timezone" => Self::Timezone,
            "years_experience" => Self::YearsExperience,
            "education_level" => Self::EducationLevel,
            "degree_major" => Self::DegreeMajor,
            "availability_weeks" => Self::AvailabilityWeeks,
            "willing_to_relocate" => Self::WillingToRelocate,
            "work_preference" => Self::WorkPreference,
            "notice_period_weeks" => Self::NoticePeriodWeeks,
            "desired_salary_usd" => Self::DesiredSalaryUsd,
            "open_to_contract" => Self::OpenToContract,
            "remote_experience_years" => Self::RemoteExperienceYears,
            "visa_status" => Self::VisaStatus,
            "summary" => Self::Summary,
            "last_active" => Self::LastActive,
            "linkedin_url" => Self::LinkedinUrl,
            _ => Self::Unresolved(name),
        }
    }
}

impl From<&str> for RankField {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<RankField> for String {
    fn from(field: RankField) -> Self {
        match field {
            RankField::Unresolved(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RankField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: RankField,
    #[serde(default)]
    pub direction: Direction,
}

impl SortKey {
    pub fn new(field: impl Into<RankField>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Primary key plus tie-breakers, applied left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingPlan {
    pub primary: SortKey,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tie_breakers: Vec<SortKey>,
}

impl RankingPlan {
    pub fn by(field: impl Into<RankField>, direction: Direction) -> Self {
        Self {
            primary: SortKey::new(field, direction),
            tie_breakers: Vec::new(),
        }
    }

    pub fn then_by(mut self, field: impl Into<RankField>, direction: Direction) -> Self {
        self.tie_breakers.push(SortKey::new(field, direction));
        self
    }

    /// All keys in evaluation order.
    pub fn keys(&self) -> impl Iterator<Item = &SortKey> {
        std::iter::once(&self.primary).chain(self.tie_breakers.iter())
    }
}

/// Output of the planning phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlans {
    #[serde(default, deserialize_with = "null_as_default")]
    pub filter: FilterPlan,
    pub rank: RankingPlan,
}
