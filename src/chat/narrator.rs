// src/chat/narrator.rs
//! Streams a short natural-language summary of a ranked result set

use anyhow::Result;
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::debug;

use crate::core::provider::{ReasoningProvider, TokenStream};
use crate::core::stats::{aggregate_stats, AggregateStats};
use crate::types::Candidate;
use crate::utils::format_thousands;

const NARRATION_INSTRUCTIONS: &str = r#"You are a recruitment assistant. Respond with a very brief, friendly summary of the candidate results.
Format your response as markdown.
Do NOT use a table.
After the summary, list the top 5 candidates as a simple numbered list, each on its own line, with their name, title, years of experience, and desired salary.
Example format:
### Found [count] candidates.
Avg exp: [avg_experience] yrs | Avg salary: $[avg_salary] | Top skills: [top_skills]
Top 5 candidates:
1. Name (Title) - [Exp] yrs experience, $[Salary]/yr
2. ...
If there are fewer than 5 candidates, list as many as are available."#;

const CONTEXT_CANDIDATES: usize = 5;
const CONTEXT_SKILLS: usize = 3;

#[derive(Clone)]
pub struct Narrator {
    provider: Arc<dyn ReasoningProvider>,
}

impl Narrator {
    pub fn new(provider: Arc<dyn ReasoningProvider>) -> Self {
        Self { provider }
    }

    /// Lazily yields provider chunks as they arrive. Empty chunks are dropped;
    /// nothing else is buffered or reshaped.
    pub async fn narrate(&self, user_message: &str, ranked: &[Candidate]) -> Result<TokenStream> {
        let stats = aggregate_stats(ranked);
        let context = narration_context(user_message, &stats, ranked);
        debug!("Narration context:\n{}", context);

        let chunks = self.provider.stream(NARRATION_INSTRUCTIONS, &context).await?;
        Ok(chunks
            .try_filter(|chunk| futures::future::ready(!chunk.is_empty()))
            .boxed())
    }
}

/// Statistics and the leading candidates, as the provider sees them
pub fn narration_context(user_message: &str, stats: &AggregateStats, ranked: &[Candidate]) -> String {
    let top_skills = stats
        .top_skills
        .iter()
        .take(CONTEXT_SKILLS)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        format!("Request: {}", user_message),
        format!("Found {} candidates.", stats.count),
        format!(
            "Avg exp: {} yrs | Avg salary: ${} | Top skills: {}",
            stats.avg_experience,
            format_thousands(stats.avg_salary),
            top_skills
        ),
        String::new(),
        format!("Top {} candidates:", CONTEXT_CANDIDATES),
        String::new(),
    ];
    lines.extend(ranked.iter().take(CONTEXT_CANDIDATES).enumerate().map(|(i, c)| {
        format!(
            "{}. {} ({}) - {} yrs, ${}",
            i + 1,
            c.full_name,
            c.title,
            c.years_experience,
            format_thousands(c.desired_salary_usd)
        )
    }));
    lines.join("\n")
}
