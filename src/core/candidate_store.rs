// src/core/candidate_store.rs
//! Read-only candidate snapshot, loaded once at startup and shared by handle

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::types::candidate::{Candidate, CandidateRow};

/// Cheap to clone; every clone points at the same immutable records.
#[derive(Debug, Clone)]
pub struct CandidateStore {
    candidates: Arc<[Candidate]>,
}

impl CandidateStore {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: candidates.into(),
        }
    }

    /// Load the dataset from a CSV file with a header row
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open candidate dataset: {}", path.display()))?;
        let store = Self::from_csv_reader(file)
            .with_context(|| format!("Failed to parse candidate dataset: {}", path.display()))?;

        info!(
            "Loaded {} candidates from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut candidates = Vec::new();
        for (index, record) in csv_reader.deserialize::<CandidateRow>().enumerate() {
            // Header is line 1
            let row = record.with_context(|| format!("Invalid candidate row {}", index + 2))?;
            candidates.push(Candidate::from(row));
        }

        Ok(Self::new(candidates))
    }

    pub fn all(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,full_name,title,location,timezone,years_experience,skills,languages,education_level,degree_major,availability_weeks,willing_to_relocate,work_preference,notice_period_weeks,desired_salary_usd,open_to_contract,remote_experience_years,visa_status,citizenships,summary,tags,last_active,linkedin_url
1,Ana Lima,Backend Engineer,\"Lisbon, Portugal\",Europe/Lisbon,7,Go;PostgreSQL,Portuguese;English,Master's,Computer Science,2,Yes,Remote,4,95000,No,5,Citizen,Portugal,\"Builds APIs, mostly in Go.\",backend,2024-05-01,https://linkedin.com/in/ana
2,Ben Ode,QA Engineer,\"Lagos, Nigeria\",Africa/Lagos,oops,,English,Bootcamp,,0,no,Onsite,1,,yes,0,Work Visa,,,,2024-04-11,
";

    #[test]
    fn test_load_from_csv() {
        let store = CandidateStore::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);

        let ana = store.get("1").unwrap();
        assert_eq!(ana.location, "Lisbon, Portugal");
        assert_eq!(ana.skills, vec!["Go", "PostgreSQL"]);
        assert!(ana.willing_to_relocate);
        assert!(!ana.open_to_contract);
        assert_eq!(ana.desired_salary_usd, 95000);

        let ben = store.get("2").unwrap();
        assert_eq!(ben.years_experience, 0);
        assert!(ben.skills.is_empty());
        assert!(ben.open_to_contract);
        assert_eq!(ben.desired_salary_usd, 0);
    }

    #[test]
    fn test_clones_share_the_snapshot() {
        let store = CandidateStore::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        let other = store.clone();
        assert!(std::ptr::eq(store.all(), other.all()));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = CandidateStore::from_csv_path(Path::new("/nonexistent/candidates.csv"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to open candidate dataset"));
    }
}
