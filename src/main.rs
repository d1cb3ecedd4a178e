use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medquery::server::{self, AppState, IngestResponse};
use medquery::{
    AnswerError, AnswerResult, BedrockIngestionClient, BedrockKnowledgeBaseClient,
    BedrockModerationClient, GuardedAnswerer, S3Presigner, SettingsBuilder,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server address used by the client subcommands when none is given.
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// medquery - guarded question answering over medical documents
#[derive(Parser)]
#[command(name = "medquery")]
#[command(about = "Ask questions about indexed medical documents with safety guardrails")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP answering service
    Serve(ServeCommand),
    /// Ask a running service a question
    Ask(AskCommand),
    /// Start re-indexing the knowledge base through a running service
    Ingest(IngestCommand),
}

/// Run the HTTP answering service
#[derive(Parser)]
struct ServeCommand {
    /// Address to bind (overrides MEDQUERY_BIND)
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,
}

/// Ask a question
#[derive(Parser)]
struct AskCommand {
    /// The question to ask
    #[arg(value_name = "QUESTION")]
    question: String,

    /// Base URL of the service
    #[arg(long, env = "MEDQUERY_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,
}

/// Trigger ingestion
#[derive(Parser)]
struct IngestCommand {
    /// Base URL of the service
    #[arg(long, env = "MEDQUERY_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(cmd) => handle_serve(cmd).await,
        Commands::Ask(cmd) => handle_ask(cmd).await,
        Commands::Ingest(cmd) => handle_ingest(cmd).await,
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Installs the log subscriber; `RUST_LOG` overrides the `info` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are blank questions and missing or invalid configuration.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.is::<medquery::ConfigError>()
            || matches!(
                cause.downcast_ref::<AnswerError>(),
                Some(AnswerError::EmptyQuestion)
            )
    })
}

/// Builds the Bedrock and S3 collaborators and serves the HTTP API.
async fn handle_serve(cmd: ServeCommand) -> Result<()> {
    let mut builder = SettingsBuilder::new();
    if let Some(bind) = cmd.bind {
        builder = builder.bind_addr(bind);
    }
    let settings = builder.build().context("Failed to load configuration")?;
    let sdk_config = settings.load_aws_config().await;

    let moderation = BedrockModerationClient::new(
        &sdk_config,
        settings.model_id.clone(),
        settings.guardrail.clone(),
    );
    let knowledge_base = BedrockKnowledgeBaseClient::new(
        &sdk_config,
        settings.knowledge_base_id.clone(),
        settings.model_arn.clone(),
        settings.guardrail.clone(),
    );
    let ingestion = BedrockIngestionClient::new(
        &sdk_config,
        settings.knowledge_base_id.clone(),
        settings.data_source_id.clone(),
    );
    let answerer = GuardedAnswerer::new(
        Arc::new(moderation),
        Arc::new(knowledge_base),
        Arc::new(S3Presigner::new(&sdk_config)),
    );

    info!(
        knowledge_base_id = %settings.knowledge_base_id,
        moderation_model = %settings.model_id,
        "starting medquery {}",
        env!("CARGO_PKG_VERSION")
    );
    server::run(AppState::new(answerer, Arc::new(ingestion)), settings.bind_addr).await
}

/// Sends a question to a running service and prints the answer.
async fn handle_ask(cmd: AskCommand) -> Result<()> {
    if cmd.question.trim().is_empty() {
        return Err(AnswerError::EmptyQuestion.into());
    }

    let url = format!("{}/api/chat", cmd.server.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .json(&serde_json::json!({ "question": cmd.question }))
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;

    let status = response.status();
    if !status.is_success() {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        anyhow::bail!("Service returned {status}: {}", describe_error(&body));
    }

    let answer: AnswerResult = response
        .json()
        .await
        .context("Failed to parse answer")?;
    print_answer(&answer);
    Ok(())
}

/// Asks a running service to start an ingestion job.
async fn handle_ingest(cmd: IngestCommand) -> Result<()> {
    let url = format!("{}/api/ingest", cmd.server.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;

    let status = response.status();
    if !status.is_success() {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        anyhow::bail!("Service returned {status}: {}", describe_error(&body));
    }

    let job: IngestResponse = response
        .json()
        .await
        .context("Failed to parse ingestion response")?;
    println!(
        "Ingestion started (job: {})",
        job.job_id.as_deref().unwrap_or("unknown")
    );
    Ok(())
}

/// Renders an `{ error, details? }` body as one line.
fn describe_error(body: &serde_json::Value) -> String {
    let error = body
        .get("error")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown error");
    match body.get("details").and_then(|v| v.as_str()) {
        Some(details) => format!("{error} ({details})"),
        None => error.to_string(),
    }
}

fn print_answer(answer: &AnswerResult) {
    println!("{}", answer.answer_text());
    if let Some(reason) = answer.block_reason() {
        println!("\nBlocked: {reason}");
    }
    if !answer.citations().is_empty() {
        println!("\nSources:");
        for (index, citation) in answer.citations().iter().enumerate() {
            let link = citation.resolved_link().unwrap_or(citation.source_uri());
            println!("  [{}] {}", index + 1, link);
            if let Some(excerpt) = citation.excerpt() {
                println!("      {excerpt}");
            }
        }
    }
}
