// src/core/filter.rs
//! Include/exclude filter engine
//!
//! Pure and order-preserving. Exclusion runs first: a candidate hit by any
//! exclude criterion is dropped before the include group is consulted.
//!
//! Matching rules per field kind:
//! - text (title, location, full name): normalized substring match in either
//!   direction, any listed term suffices
//! - sets (skills, languages, tags): exact, case-sensitive membership; include
//!   needs every listed value, exclude fires on any one
//! - enums (education, work preference, visa): exact membership in the list
//! - numeric bounds: inclusive; in an exclude group a min/max pair is one
//!   criterion that fires when the value lies inside it
//! - booleans: strict equality, only when the plan sets the field

use tracing::{debug, trace};

use crate::types::{Candidate, Criteria, FilterPlan};

pub fn filter_candidates(candidates: &[Candidate], plan: &FilterPlan) -> Vec<Candidate> {
    if plan.is_empty() {
        debug!("Empty filter plan, keeping all {} candidates", candidates.len());
        return candidates.to_vec();
    }

    let include = plan.include.as_ref().filter(|c| !c.is_empty());
    let exclude = plan.exclude.as_ref().filter(|c| !c.is_empty());

    let filtered: Vec<Candidate> = candidates
        .iter()
        .filter(|candidate| {
            if let Some(field) = exclude.and_then(|criteria| exclude_hit(candidate, criteria)) {
                trace!(candidate = %candidate.id, field, "excluded by exclude criterion");
                return false;
            }
            if let Some(field) = include.and_then(|criteria| include_miss(candidate, criteria)) {
                trace!(candidate = %candidate.id, field, "excluded by include mismatch");
                return false;
            }
            true
        })
        .cloned()
        .collect();

    debug!(
        "Filtered {} candidates down to {}",
        candidates.len(),
        filtered.len()
    );
    filtered
}

/// Lower-case, drop everything outside `[a-z0-9\s]`, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Any term contained in the field, or the field contained in a term.
/// A side that normalizes to nothing is contained in everything.
pub fn text_matches(terms: &[String], field: &str) -> bool {
    let field = normalize_text(field);
    terms
        .iter()
        .map(|term| normalize_text(term))
        .any(|term| field.contains(&term) || term.contains(&field))
}

fn contains_all(wanted: &[String], values: &[String]) -> bool {
    wanted.iter().all(|w| values.contains(w))
}

fn contains_any(listed: &[String], values: &[String]) -> bool {
    listed.iter().any(|l| values.contains(l))
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// Name of the first include criterion the candidate fails, if any.
fn include_miss(c: &Candidate, criteria: &Criteria) -> Option<&'static str> {
    let text_checks: [(&'static str, &Option<Vec<String>>, &str); 3] = [
        ("title", &criteria.title, &c.title),
        ("location", &criteria.location, &c.location),
        ("full_name", &criteria.full_name, &c.full_name),
    ];
    for (name, terms, value) in text_checks {
        if let Some(terms) = terms {
            if !text_matches(terms, value) {
                return Some(name);
            }
        }
    }

    let set_checks: [(&'static str, &Option<Vec<String>>, &[String]); 3] = [
        ("skills", &criteria.skills, &c.skills),
        ("languages", &criteria.languages, &c.languages),
        ("tags", &criteria.tags, &c.tags),
    ];
    for (name, wanted, values) in set_checks {
        if let Some(wanted) = wanted {
            if !contains_all(wanted, values) {
                return Some(name);
            }
        }
    }

    let enum_checks: [(&'static str, &Option<Vec<String>>, &String); 3] = [
        ("education_level", &criteria.education_level, &c.education_level),
        ("work_preference", &criteria.work_preference, &c.work_preference),
        ("visa_status", &criteria.visa_status, &c.visa_status),
    ];
    for (name, allowed, value) in enum_checks {
        if let Some(allowed) = allowed {
            if !allowed.contains(value) {
                return Some(name);
            }
        }
    }

    for (name, value, min, max) in numeric_ranges(c, criteria) {
        if !within(value, min, max) {
            return Some(name);
        }
    }

    for (name, wanted, value) in flags(c, criteria) {
        if let Some(wanted) = wanted {
            if wanted != value {
                return Some(name);
            }
        }
    }

    None
}

/// Name of the first exclude criterion the candidate hits, if any.
fn exclude_hit(c: &Candidate, criteria: &Criteria) -> Option<&'static str> {
    let text_checks: [(&'static str, &Option<Vec<String>>, &str); 3] = [
        ("title", &criteria.title, &c.title),
        ("location", &criteria.location, &c.location),
        ("full_name", &criteria.full_name, &c.full_name),
    ];
    for (name, terms, value) in text_checks {
        if terms.as_ref().is_some_and(|terms| text_matches(terms, value)) {
            return Some(name);
        }
    }

    let set_checks: [(&'static str, &Option<Vec<String>>, &[String]); 3] = [
        ("skills", &criteria.skills, &c.skills),
        ("languages", &criteria.languages, &c.languages),
        ("tags", &criteria.tags, &c.tags),
    ];
    for (name, listed, values) in set_checks {
        if listed.as_ref().is_some_and(|listed| contains_any(listed, values)) {
            return Some(name);
        }
    }

    let enum_checks: [(&'static str, &Option<Vec<String>>, &String); 3] = [
        ("education_level", &criteria.education_level, &c.education_level),
        ("work_preference", &criteria.work_preference, &c.work_preference),
        ("visa_status", &criteria.visa_status, &c.visa_status),
    ];
    for (name, listed, value) in enum_checks {
        if listed.as_ref().is_some_and(|listed| listed.contains(value)) {
            return Some(name);
        }
    }

    for (name, value, min, max) in numeric_ranges(c, criteria) {
        if (min.is_some() || max.is_some()) && within(value, min, max) {
            return Some(name);
        }
    }

    for (name, listed, value) in flags(c, criteria) {
        if listed == Some(value) {
            return Some(name);
        }
    }

    None
}

type Range = (&'static str, f64, Option<f64>, Option<f64>);

fn numeric_ranges(c: &Candidate, criteria: &Criteria) -> [Range; 4] {
    [
        (
            "years_experience",
            f64::from(c.years_experience),
            criteria.years_experience_min,
            criteria.years_experience_max,
        ),
        (
            "desired_salary",
            c.desired_salary_usd as f64,
            criteria.desired_salary_min,
            criteria.desired_salary_max,
        ),
        (
            "availability_weeks",
            f64::from(c.availability_weeks),
            criteria.availability_weeks_min,
            criteria.availability_weeks_max,
        ),
        (
            "notice_period_weeks",
            f64::from(c.notice_period_weeks),
            criteria.notice_period_weeks_min,
            criteria.notice_period_weeks_max,
        ),
    ]
}

fn flags(c: &Candidate, criteria: &Criteria) -> [(&'static str, Option<bool>, bool); 2] {
    [
        (
            "willing_to_relocate",
            criteria.willing_to_relocate,
            c.willing_to_relocate,
        ),
        (
            "open_to_contract",
            criteria.open_to_contract,
            c.open_to_contract,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::candidate;

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    fn strings(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    fn pool() -> Vec<Candidate> {
        let mut a = candidate("a", "Backend Engineer", "Berlin, Germany", 6);
        a.skills = vec!["Rust".into(), "Go".into()];
        a.work_preference = "Remote".into();
        let mut b = candidate("b", "Frontend Engineer", "Austin, USA", 3);
        b.skills = vec!["React".into(), "TypeScript".into()];
        b.work_preference = "Onsite".into();
        b.open_to_contract = true;
        let mut c = candidate("c", "Data Scientist", "Paris, France", 11);
        c.skills = vec!["Python".into(), "Rust".into()];
        c.work_preference = "Hybrid".into();
        vec![a, b, c]
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Full‑Stack   Developer!! "), "fullstack developer");
        assert_eq!(normalize_text("San Francisco, USA"), "san francisco usa");
    }

    #[test]
    fn test_text_match_is_bidirectional() {
        assert!(text_matches(&["engineer".into()], "Backend Engineer"));
        assert!(text_matches(
            &["senior backend engineer".into()],
            "Backend Engineer"
        ));
        assert!(!text_matches(&["designer".into()], "Backend Engineer"));
        assert!(!text_matches(&[], "Backend Engineer"));
    }

    #[test]
    fn test_empty_normalized_text_is_contained_everywhere() {
        assert!(text_matches(&["".into()], "Backend Engineer"));
        assert!(text_matches(&["!!".into()], "Backend Engineer"));
        assert!(text_matches(&["Ana".into()], ""));
        assert!(text_matches(&["Ana".into()], "李雷"));

        let plan = FilterPlan {
            include: Some(Criteria {
                title: strings(&[""]),
                ..Criteria::default()
            }),
            exclude: None,
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["a", "b", "c"]);

        let mut pool = pool();
        pool[0].full_name = "李雷".into();
        let plan = FilterPlan {
            include: None,
            exclude: Some(Criteria {
                full_name: strings(&["Li Lei"]),
                ..Criteria::default()
            }),
        };
        assert_eq!(ids(&filter_candidates(&pool, &plan)), vec!["b", "c"]);
    }

    #[test]
    fn test_empty_plan_is_identity() {
        let pool = pool();
        assert_eq!(filter_candidates(&pool, &FilterPlan::default()), pool);

        let plan = FilterPlan {
            include: Some(Criteria::default()),
            exclude: Some(Criteria::default()),
        };
        assert_eq!(filter_candidates(&pool, &plan), pool);
    }

    #[test]
    fn test_include_skills_requires_all() {
        let plan = FilterPlan {
            include: Some(Criteria {
                skills: strings(&["Rust", "Python"]),
                ..Criteria::default()
            }),
            exclude: None,
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["c"]);
    }

    #[test]
    fn test_include_skills_is_case_sensitive_and_exact() {
        let plan = FilterPlan {
            include: Some(Criteria {
                skills: strings(&["rust"]),
                ..Criteria::default()
            }),
            exclude: None,
        };
        assert!(filter_candidates(&pool(), &plan).is_empty());

        let plan = FilterPlan {
            include: Some(Criteria {
                skills: strings(&["Rus"]),
                ..Criteria::default()
            }),
            exclude: None,
        };
        assert!(filter_candidates(&pool(), &plan).is_empty());
    }

    #[test]
    fn test_exclude_title_is_any_of() {
        let plan = FilterPlan {
            include: None,
            exclude: Some(Criteria {
                title: strings(&["Backend Engineer", "Data Scientist"]),
                ..Criteria::default()
            }),
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["b"]);
    }

    #[test]
    fn test_exclude_wins_over_loose_include() {
        let plan = FilterPlan {
            include: Some(Criteria {
                title: strings(&["Engineer"]),
                ..Criteria::default()
            }),
            exclude: Some(Criteria {
                work_preference: strings(&["Onsite"]),
                ..Criteria::default()
            }),
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["a"]);
    }

    #[test]
    fn test_numeric_bounds_are_inclusive() {
        let plan = FilterPlan {
            include: Some(Criteria {
                years_experience_min: Some(3.0),
                years_experience_max: Some(6.0),
                ..Criteria::default()
            }),
            exclude: None,
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["a", "b"]);
    }

    #[test]
    fn test_exclude_range_is_one_criterion() {
        let plan = FilterPlan {
            include: None,
            exclude: Some(Criteria {
                years_experience_min: Some(5.0),
                years_experience_max: Some(10.0),
                ..Criteria::default()
            }),
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["b", "c"]);
    }

    #[test]
    fn test_boolean_only_when_specified() {
        let plan = FilterPlan {
            include: Some(Criteria {
                open_to_contract: Some(false),
                ..Criteria::default()
            }),
            exclude: None,
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["a", "c"]);

        let plan = FilterPlan {
            include: Some(Criteria {
                years_experience_min: Some(0.0),
                ..Criteria::default()
            }),
            exclude: None,
        };
        assert_eq!(filter_candidates(&pool(), &plan).len(), 3);
    }

    #[test]
    fn test_exclude_set_field_any_value() {
        let plan = FilterPlan {
            include: None,
            exclude: Some(Criteria {
                skills: strings(&["Go", "TypeScript"]),
                ..Criteria::default()
            }),
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["c"]);
    }

    #[test]
    fn test_exclude_boolean_fires_on_equality() {
        let plan = FilterPlan {
            include: None,
            exclude: Some(Criteria {
                open_to_contract: Some(true),
                ..Criteria::default()
            }),
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["a", "c"]);

        let plan = FilterPlan {
            include: None,
            exclude: Some(Criteria {
                open_to_contract: Some(false),
                ..Criteria::default()
            }),
        };
        assert_eq!(ids(&filter_candidates(&pool(), &plan)), vec!["b"]);

        let mut pool = pool();
        pool[2].willing_to_relocate = true;
        let plan = FilterPlan {
            include: Some(Criteria {
                title: strings(&["Engineer", "Scientist"]),
                ..Criteria::default()
            }),
            exclude: Some(Criteria {
                willing_to_relocate: Some(false),
                ..Criteria::default()
            }),
        };
        assert_eq!(ids(&filter_candidates(&pool, &plan)), vec!["c"]);
    }
}
