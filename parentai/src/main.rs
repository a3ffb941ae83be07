use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parentai::api::{create_router, AppState};
use parentai::classify::{AgeGrouper, KeywordTable, TopicClassifier};
use parentai::config::Config;
use parentai::embeddings::build_embedder;
use parentai::knowledge::KnowledgeBase;
use parentai::llm::{GeneratorSettings, LlmProvider, PromptAssembler, ResponseGenerator};
use parentai::models::Question;
use parentai::retrieval::{BuildOutcome, PassageRetriever, RetrieverSettings};
use parentai::services::ParentingAssistant;
use parentai::session::InMemorySessionStore;

#[derive(Parser)]
#[command(name = "parentai")]
#[command(about = "Parenting assistant for caregivers of children aged 0-3")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Answer a single question and exit
    Ask {
        question: String,
        /// Child's age in whole months
        #[arg(long)]
        age_months: Option<u32>,
        /// Free-text context, e.g. "first child, breastfed"
        #[arg(long)]
        context: Option<String>,
    },
    /// Build or refresh the reference document embedding cache
    Index {
        /// Re-embed even when the cache is up to date
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parentai=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Ask {
            question,
            age_months,
            context,
        } => {
            config.validate()?;
            let cancel = CancellationToken::new();
            let (assistant, _) = build_assistant(&config).await?;

            let mut question = Question::new(question);
            question.age_months = age_months;
            question.context = context;

            let answer = assistant.answer(&question, &cancel).await?;
            tracing::info!(
                topic = %answer.topic,
                age_band = %answer.age_band,
                source = %answer.source,
                "Answered"
            );
            println!("{}", answer.text);
            Ok(())
        }
        Command::Index { force } => {
            config.validate()?;
            let retriever = build_retriever(&config)?.ok_or_else(|| {
                anyhow::anyhow!("REFERENCE_DOCUMENT is not set, nothing to index")
            })?;
            let outcome = retriever.load_or_build(force).await?;
            tracing::info!(
                ?outcome,
                cache = %config.retrieval.cache_path.display(),
                "Index ready"
            );
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let (assistant, retriever) = build_assistant(&config).await?;
    let cancel_token = CancellationToken::new();

    if let Some(retriever) = retriever {
        let interval = config.retrieval.refresh_interval_secs;
        if interval > 0 {
            tracing::info!("Starting corpus refresh... (interval={}s)", interval);
            let token = cancel_token.child_token();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = token.cancelled() => {
                            tracing::info!("Corpus refresh shutting down...");
                            break;
                        }
                        _ = tokio::time::sleep(Duration::from_secs(interval)) => {
                            match retriever.load_or_build(false).await {
                                Ok(BuildOutcome::Unchanged { .. }) => {}
                                Ok(outcome) => tracing::info!(?outcome, "Reference document changed, corpus swapped"),
                                Err(e) => tracing::error!("Corpus refresh error: {}", e),
                            }
                        }
                    }
                }
            });
        }
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(assistant, cancel_token.clone());
    let app = create_router(state);

    tracing::info!("ParentAI starting on http://{}", addr);
    tracing::info!("  Ask endpoint: http://{}/api/v1/ask", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

fn build_retriever(config: &Config) -> anyhow::Result<Option<Arc<PassageRetriever>>> {
    if config.retrieval.document_path.is_none() {
        return Ok(None);
    }

    tracing::info!("Initializing embedding provider: {}...", config.embeddings.model);
    let embedder = build_embedder(&config.embeddings)?;
    let settings = RetrieverSettings::from_config(&config.retrieval, &config.processing);
    Ok(Some(Arc::new(PassageRetriever::new(embedder, settings))))
}

/// Wires the assistant from configuration. The reference corpus is loaded
/// (or embedded) before returning; a failure there leaves the assistant on
/// the knowledge table.
async fn build_assistant(
    config: &Config,
) -> anyhow::Result<(ParentingAssistant, Option<Arc<PassageRetriever>>)> {
    let knowledge = match &config.knowledge.knowledge_path {
        Some(path) => KnowledgeBase::from_path(path)?,
        None => KnowledgeBase::embedded()?,
    };
    tracing::info!(
        version = knowledge.version(),
        topics = knowledge.topics().len(),
        "Knowledge table loaded"
    );

    let keywords = match &config.knowledge.topic_keywords_path {
        Some(path) => KeywordTable::from_path(path)?,
        None => KeywordTable::embedded()?,
    };

    tracing::info!("Initializing LLM provider: {}...", config.llm.model);
    let llm = LlmProvider::new(&config.llm);
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - every answer will be the error response");
    }

    let assembler = PromptAssembler::new(&config.assistant);
    let generator = ResponseGenerator::new(
        Arc::new(llm),
        GeneratorSettings::from_config(&config.llm),
        assembler.clone(),
    );

    let mut assistant = ParentingAssistant::new(
        AgeGrouper::new(config.knowledge.age_scheme),
        TopicClassifier::new(keywords),
        Arc::new(knowledge),
        generator,
        assembler,
        Arc::new(InMemorySessionStore::new()),
    );

    let retriever = build_retriever(config)?;
    if let Some(retriever) = &retriever {
        match retriever.load_or_build(false).await {
            Ok(outcome) => tracing::info!(?outcome, "Reference corpus ready"),
            Err(e) => tracing::warn!(
                "Failed to load reference corpus: {} - answering from the knowledge table",
                e
            ),
        }
        assistant = assistant.with_retriever(retriever.clone());
    }

    Ok((assistant, retriever))
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
