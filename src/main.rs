use anyhow::{Context, Result};
use candidate_query::chat::{event_channel, line_stream, Narrator, PlanGenerator, QueryPipeline};
use candidate_query::core::{CandidateStore, OpenAiClient, ReasoningProvider};
use candidate_query::environment::{EnvironmentConfig, DEFAULT_CONFIG_PATH};
use candidate_query::start_web_server;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "candidate-query")]
#[command(about = "Answer hiring questions over a candidate dataset")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API (default)
    Serve,
    /// Run one query and print the event stream as NDJSON
    Query { utterance: String },
    /// Print dataset size and candidates per title
    Candidates,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EnvironmentConfig::load(&cli.config)?;
    init_logging(&config.log_path)?;

    info!("Environment: {}", EnvironmentConfig::get_environment());
    info!("Dataset: {}", config.dataset_path.display());

    let store = CandidateStore::from_csv_path(&config.dataset_path)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let client = Arc::new(OpenAiClient::from_env(config.provider.clone())?);
            let pipeline = build_pipeline(store, client.clone());
            start_web_server(pipeline, client, config.stream.clone()).await
        }
        Command::Query { utterance } => {
            let client = Arc::new(OpenAiClient::from_env(config.provider.clone())?);
            let pipeline = build_pipeline(store, client);
            run_query(&pipeline, &utterance, &config).await
        }
        Command::Candidates => {
            print_dataset_summary(&store);
            Ok(())
        }
    }
}

fn init_logging(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("candidate_query=debug,rocket::server=off")),
        )
        .init();

    Ok(())
}

fn build_pipeline(store: CandidateStore, client: Arc<OpenAiClient>) -> QueryPipeline {
    let provider: Arc<dyn ReasoningProvider> = client;
    QueryPipeline::new(
        store,
        PlanGenerator::new(provider.clone()),
        Narrator::new(provider),
    )
}

async fn run_query(pipeline: &QueryPipeline, utterance: &str, config: &EnvironmentConfig) -> Result<()> {
    let (sink, rx) = event_channel(&config.stream);

    let printer = tokio::spawn(async move {
        let mut lines = Box::pin(line_stream(rx));
        let mut stdout = std::io::stdout();
        while let Some(line) = lines.next().await {
            stdout.write_all(line.as_bytes())?;
            stdout.flush()?;
        }
        Ok::<(), std::io::Error>(())
    });

    let outcome = pipeline.run(utterance, sink).await;
    printer
        .await
        .context("Output task panicked")?
        .context("Failed to write to stdout")?;

    info!("Query finished: {:?}", outcome);
    Ok(())
}

fn print_dataset_summary(store: &CandidateStore) {
    let mut per_title: BTreeMap<&str, usize> = BTreeMap::new();
    for candidate in store.all() {
        *per_title.entry(candidate.title.as_str()).or_default() += 1;
    }

    println!("{} candidates loaded", store.len());
    for (title, count) in per_title {
        println!("  {:<30} {}", title, count);
    }
}
