// src/chat/plan_generator.rs
//! Turns a hiring request into filter and ranking plans via the reasoning provider

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chat::error::{PlanError, PlanParseError};
use crate::core::provider::ReasoningProvider;
use crate::types::{Criteria, FilterPlan, QueryPlans};

const PLAN_INSTRUCTIONS: &str = r#"You are a recruitment assistant that analyzes candidate data.
Respond ONLY with a valid JSON object: no commentary, no markdown, no code block, no explanation.
Format:
{ "filter": { "include": { /* criteria */ }, "exclude": { /* criteria */ } }, "rank": { "primary": { "field": "field_name", "direction": "asc"|"desc" }, "tie_breakers": [ { "field": "field_name", "direction": "asc"|"desc" } ] } }

Available candidate fields: id, full_name, title, location, timezone, years_experience,
skills, languages, education_level, degree_major, availability_weeks, willing_to_relocate,
work_preference, notice_period_weeks, desired_salary_usd, open_to_contract,
remote_experience_years, visa_status, citizenships, summary, tags, last_active, linkedin_url

Use exact values from the database. Common values include:
Titles: "Backend Engineer", "Frontend Engineer", "DevOps Engineer", "QA Engineer", "Data Scientist", "Machine Learning Engineer", "Cloud Architect", "Product Engineer", "Full-Stack Developer", "Mobile Developer"
Work preferences: "Remote", "Hybrid", "Onsite"
Education levels: "PhD", "Master's", "Bachelor's", "Bootcamp"
Visa status: "Citizen", "Work Visa", "Needs Sponsorship", "Permanent Resident"
Skills: "JavaScript", "Python", "Java", "React", "Node.js", "AWS", "Docker", "TypeScript", "Go", "Rust", "C#", "Angular", "Vue", "Spring", "FastAPI", "Express", "Next.js", "GraphQL", "PostgreSQL", "MongoDB", "Redis", "Kubernetes", "Azure", "GCP"
Languages: "English", "Spanish", "French", "Hindi", "Arabic", "Portuguese", "German", "Japanese", "Mandarin"
Tags: "backend", "frontend", "fullstack", "devops", "qa", "data", "machine-learning", "cloud", "mobile"

"include" lists what candidates must match, "exclude" what removes them. Both support:
- title, location, full_name: arrays of text (e.g. ["San Francisco, USA", "New York, USA"])
- skills, languages, tags: arrays of exact values; in "include" a candidate needs all of them
- education_level, work_preference, visa_status: arrays of exact values
- years_experience_min / years_experience_max: number
- desired_salary_min / desired_salary_max: number
- availability_weeks_min / availability_weeks_max: number
- notice_period_weeks_min / notice_period_weeks_max: number
- willing_to_relocate, open_to_contract: true or false

Always put specific criteria in "include" and/or "exclude" based on the request. Do not return empty filter objects.
If the user asks for all candidates or gives no criteria, use broad filters in "include" such as
"years_experience_min": 0 and "desired_salary_min": 0.

The ranking plan needs "primary": { field, direction }. Common ranking fields: years_experience, desired_salary_usd, last_active.
"tie_breakers" is optional."#;

#[derive(Clone)]
pub struct PlanGenerator {
    provider: Arc<dyn ReasoningProvider>,
}

impl PlanGenerator {
    pub fn new(provider: Arc<dyn ReasoningProvider>) -> Self {
        Self { provider }
    }

    pub async fn generate_plan(&self, user_message: &str) -> Result<QueryPlans, PlanError> {
        let raw = self
            .provider
            .complete(PLAN_INSTRUCTIONS, user_message)
            .await
            .map_err(PlanError::Provider)?;

        if raw.trim().is_empty() {
            return Err(PlanError::Empty);
        }
        debug!("Raw plan response: {}", raw);

        let plans = with_default_include(parse_plans(&raw)?);
        info!(
            "Planned filter {} and ranking by {}",
            serde_json::to_string(&plans.filter).unwrap_or_default(),
            plans.rank.primary.field
        );
        Ok(plans)
    }
}

/// Remove a ```json ... ``` or ``` ... ``` wrapper around the answer.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

pub fn parse_plans(response: &str) -> Result<QueryPlans, PlanParseError> {
    serde_json::from_str(strip_code_fence(response)).map_err(|source| PlanParseError {
        raw: response.to_string(),
        source,
    })
}

/// Guarantee a non-trivial include group. An exclude group is kept as is.
fn with_default_include(mut plans: QueryPlans) -> QueryPlans {
    for group in [&plans.filter.include, &plans.filter.exclude].into_iter().flatten() {
        if !group.unrecognized.is_empty() {
            warn!(
                "Ignoring unrecognized filter keys: {:?}",
                group.unrecognized.keys().collect::<Vec<_>>()
            );
        }
    }

    if plans.filter.include.as_ref().map_or(true, Criteria::is_empty) {
        warn!("No include criteria generated, using default filters");
        plans.filter = FilterPlan {
            include: Some(Criteria::permissive()),
            exclude: plans.filter.exclude.take(),
        };
    }
    plans
}
