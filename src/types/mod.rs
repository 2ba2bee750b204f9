// src/types/mod.rs
pub mod candidate;
pub mod plan;

pub use candidate::Candidate;
pub use plan::{Criteria, Direction, FilterPlan, QueryPlans, RankField, RankingPlan, SortKey};
