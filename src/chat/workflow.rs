// src/chat/workflow.rs
//! Query orchestrator: think → act1 → act2 → speak, or error
//!
//! Phases run strictly in order, each consuming the previous phase's output.
//! Every query ends with exactly one terminal action: the narration finishes,
//! or a single error event goes out. Either way the sink is closed once.
//! A consumer that disconnects stops the query at the next suspension point
//! and no error event is attempted on the dead stream.

use futures::StreamExt;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::chat::error::PipelineError;
use crate::chat::narrator::Narrator;
use crate::chat::plan_generator::PlanGenerator;
use crate::chat::protocol::{EventSink, Phase, PhaseEvent};
use crate::core::filter::filter_candidates;
use crate::core::rank::rank_candidates;
use crate::core::CandidateStore;
use crate::types::{Candidate, FilterPlan, QueryPlans, RankingPlan};

pub const USER_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";

const THINK_MESSAGE: &str = "🤔 Analyzing your question and planning the search...";
const ACT1_MESSAGE: &str = "🔍 Filtering candidates based on your criteria...";
const ACT2_MESSAGE: &str = "📊 Ranking candidates by relevance...";
const SPEAK_MESSAGE: &str = "💬 Generating your personalized summary...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Narration finished and the stream was closed
    Completed,
    /// An error event was emitted, then the stream was closed
    Failed,
    /// The transport failed or the consumer left; nothing more was written
    Aborted,
}

enum Stage {
    Think,
    Act1(QueryPlans),
    Act2 {
        rank: RankingPlan,
        matched: Vec<Candidate>,
    },
    Speak(Vec<Candidate>),
    Done,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Self::Think => "think",
            Self::Act1(_) => "act1",
            Self::Act2 { .. } => "act2",
            Self::Speak(_) => "speak",
            Self::Done => "done",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkData<'a> {
    filter_plan: &'a FilterPlan,
    ranking_plan: &'a RankingPlan,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Act1Data<'a> {
    count: usize,
    match_count: usize,
    filter_plan: &'a FilterPlan,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Act2Data<'a> {
    count: usize,
    match_count: usize,
    top_candidates: &'a [Candidate],
    ranking_plan: &'a RankingPlan,
    ranked_ids: Vec<&'a str>,
}

#[derive(Serialize)]
struct SpeakData<'a> {
    content: &'a str,
}

/// Shared by every query; holds no per-query state.
#[derive(Clone)]
pub struct QueryPipeline {
    store: CandidateStore,
    planner: PlanGenerator,
    narrator: Narrator,
}

impl QueryPipeline {
    pub fn new(store: CandidateStore, planner: PlanGenerator, narrator: Narrator) -> Self {
        Self {
            store,
            planner,
            narrator,
        }
    }

    pub fn store(&self) -> &CandidateStore {
        &self.store
    }

    /// Run one query to its terminal action and close the sink.
    pub async fn run<S: EventSink>(&self, user_message: &str, mut sink: S) -> QueryOutcome {
        let span = info_span!("query", query_id = %Uuid::new_v4());

        async move {
            info!("Starting query: {}", user_message);

            let outcome = match self.drive(user_message, &mut sink).await {
                Ok(()) => {
                    info!("Query completed");
                    QueryOutcome::Completed
                }
                Err(e) if e.is_transport() => {
                    warn!("Query aborted: {}", e);
                    QueryOutcome::Aborted
                }
                Err(e) => {
                    error!("Query failed: {}", e);
                    if let Err(send_error) = sink.send(&PhaseEvent::error(USER_ERROR_MESSAGE)).await {
                        warn!("Could not deliver error event: {}", send_error);
                    }
                    QueryOutcome::Failed
                }
            };

            sink.close().await;
            outcome
        }
        .instrument(span)
        .await
    }

    async fn drive<S: EventSink>(&self, user_message: &str, sink: &mut S) -> Result<(), PipelineError> {
        let mut stage = Stage::Think;

        loop {
            debug!("Entering {} phase", stage.name());

            stage = match stage {
                Stage::Think => {
                    sink.send(&PhaseEvent::message(Phase::Think, THINK_MESSAGE)).await?;

                    let plans =
                        abandon_on_disconnect(sink, self.planner.generate_plan(user_message))
                            .await??;

                    let data = ThinkData {
                        filter_plan: &plans.filter,
                        ranking_plan: &plans.rank,
                    };
                    sink.send(&PhaseEvent::data(Phase::Think, &data)?).await?;
                    Stage::Act1(plans)
                }

                Stage::Act1(plans) => {
                    sink.send(&PhaseEvent::message(Phase::Act1, ACT1_MESSAGE)).await?;

                    let matched = filter_candidates(self.store.all(), &plans.filter);
                    info!("{} of {} candidates matched", matched.len(), self.store.len());

                    let data = Act1Data {
                        count: matched.len(),
                        match_count: matched.len(),
                        filter_plan: &plans.filter,
                    };
                    sink.send(&PhaseEvent::data(Phase::Act1, &data)?).await?;
                    Stage::Act2 {
                        rank: plans.rank,
                        matched,
                    }
                }

                Stage::Act2 { rank, matched } => {
                    sink.send(&PhaseEvent::message(Phase::Act2, ACT2_MESSAGE)).await?;

                    let ranked = rank_candidates(&matched, &rank);

                    let data = Act2Data {
                        count: ranked.len(),
                        match_count: ranked.len(),
                        top_candidates: &ranked,
                        ranking_plan: &rank,
                        ranked_ids: ranked.iter().map(|c| c.id.as_str()).collect(),
                    };
                    sink.send(&PhaseEvent::data(Phase::Act2, &data)?).await?;
                    Stage::Speak(ranked)
                }

                Stage::Speak(ranked) => {
                    sink.send(&PhaseEvent::message(Phase::Speak, SPEAK_MESSAGE)).await?;

                    let mut chunks =
                        abandon_on_disconnect(sink, self.narrator.narrate(user_message, &ranked))
                            .await?
                            .map_err(PipelineError::Narration)?;

                    let mut emitted = 0usize;
                    while let Some(chunk) = abandon_on_disconnect(sink, chunks.next()).await? {
                        let chunk = chunk.map_err(PipelineError::Narration)?;
                        let data = SpeakData { content: &chunk };
                        sink.send(&PhaseEvent::data(Phase::Speak, &data)?).await?;
                        emitted += 1;
                    }
                    debug!("Narration streamed in {} chunks", emitted);
                    Stage::Done
                }

                Stage::Done => return Ok(()),
            };
        }
    }
}

/// Await `work` unless the consumer goes away first, in which case the
/// in-flight provider call is dropped.
async fn abandon_on_disconnect<S, F>(sink: &S, work: F) -> Result<F::Output, PipelineError>
where
    S: EventSink,
    F: Future,
{
    tokio::select! {
        biased;
        output = work => Ok(output),
        _ = sink.closed() => Err(PipelineError::Disconnected),
    }
}
