//! Command-line front end for ingestion and question answering
//!
//! Run with: cargo run -p manual-rag -- ask "How do I prime the pump?"

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use manual_rag::providers::{EmbeddingProvider, OllamaEmbedder, OllamaLlm};
use manual_rag::{
    Assistant, Error, FsDocumentSource, IngestPipeline, KnowledgeBase, RagConfig, Retriever,
};

#[derive(Parser, Debug)]
#[command(
    name = "manual-rag",
    version,
    about = "Index Markdown manuals and answer questions with citations"
)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the index from the raw document directory
    Ingest,
    /// Print the passages retrieved for a question
    Search {
        question: String,
        /// Number of passages (defaults to top_k)
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Answer a question with citations
    Ask {
        question: String,
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Print the assembled prompt without calling the generator
    Prompt {
        question: String,
        #[arg(short, long)]
        k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manual_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = RagConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing::debug!("Embedding model: {}", config.embeddings.model);
    tracing::debug!("Generation model: {}", config.llm.generate_model);
    tracing::debug!("Index directory: {}", config.storage.index_dir.display());

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config)?);

    match cli.command {
        Command::Ingest => {
            let source = FsDocumentSource::new(&config.storage.raw_dir);
            tracing::info!("Reading documents from {}", source.root().display());
            let report = IngestPipeline::new(&config, embedder).run(&source).await?;
            if report.skipped > 0 {
                println!("Skipped {} unsupported documents.", report.skipped);
            }
            println!("Indexed {} chunks.", report.chunks);
        }
        Command::Search { question, k } => {
            let retriever = open_retriever(&config, embedder)?;
            let k = k.unwrap_or(config.top_k());
            let results = retriever.retrieve(&question, k).await?;
            if results.is_empty() {
                println!("No passages found.");
            }
            for result in results {
                println!(
                    "{:>2}. {:.4}  {} ({})",
                    result.rank, result.score, result.chunk.section_title, result.chunk.source_id
                );
            }
        }
        Command::Ask { question, k } => {
            let assistant = open_assistant(&config, embedder)?;
            if !assistant.health().await {
                tracing::warn!("Generator at {} is not reachable", config.llm.base_url);
            }
            match assistant.ask(&question, k).await {
                Ok(answer) => {
                    println!("{}\n", answer.answer.trim());
                    println!("Sources:");
                    for citation in &answer.citations {
                        println!("  {}  {}", citation.format_inline(), citation.link);
                    }
                }
                Err(Error::NoContext(_)) => println!("No context found."),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Prompt { question, k } => {
            let assistant = open_assistant(&config, embedder)?;
            let (prompt, _) = assistant.prompt(&question, k).await?;
            println!("{}", prompt);
        }
    }

    Ok(())
}

fn open_retriever(config: &RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Retriever> {
    let kb = KnowledgeBase::open(&config.storage.index_dir, config.embedding_model_id())
        .with_context(|| {
            format!(
                "Could not open index at {}",
                config.storage.index_dir.display()
            )
        })?;
    Ok(Retriever::new(Arc::new(kb), embedder, config.top_k())?)
}

fn open_assistant(config: &RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Assistant> {
    let retriever = open_retriever(config, embedder)?;
    let llm = Arc::new(OllamaLlm::new(config)?);
    Ok(Assistant::new(retriever, llm, config.server.view_prefix.clone()))
}
