// src/core/stats.rs
//! Aggregate statistics over a ranked result set

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::Candidate;

const TOP_SKILLS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub count: usize,
    /// Rounded to one decimal
    pub avg_experience: f64,
    /// Rounded to the nearest dollar
    pub avg_salary: u64,
    pub top_skills: Vec<String>,
    pub locations: Vec<String>,
    pub education_breakdown: BTreeMap<String, usize>,
}

pub fn aggregate_stats(candidates: &[Candidate]) -> AggregateStats {
    if candidates.is_empty() {
        return AggregateStats::default();
    }

    let count = candidates.len();
    let total_experience: u64 = candidates.iter().map(|c| u64::from(c.years_experience)).sum();
    let total_salary: u64 = candidates.iter().map(|c| c.desired_salary_usd).sum();

    let avg_experience = (total_experience as f64 / count as f64 * 10.0).round() / 10.0;
    let avg_salary = (total_salary as f64 / count as f64).round() as u64;

    AggregateStats {
        count,
        avg_experience,
        avg_salary,
        top_skills: top_skills(candidates, TOP_SKILLS),
        locations: distinct_locations(candidates),
        education_breakdown: candidates.iter().fold(BTreeMap::new(), |mut acc, c| {
            *acc.entry(c.education_level.clone()).or_insert(0) += 1;
            acc
        }),
    }
}

/// Most frequent skills; equal counts keep first-seen order.
fn top_skills(candidates: &[Candidate], limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for skill in candidates.iter().flat_map(|c| c.skills.iter()) {
        let entry = counts.entry(skill.as_str()).or_insert(0);
        if *entry == 0 {
            first_seen.push(skill);
        }
        *entry += 1;
    }

    // stable sort, so first-seen order survives among equals
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen
        .into_iter()
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn distinct_locations(candidates: &[Candidate]) -> Vec<String> {
    let mut locations: Vec<String> = Vec::new();
    for candidate in candidates {
        if !locations.contains(&candidate.location) {
            locations.push(candidate.location.clone());
        }
    }
    locations
}
