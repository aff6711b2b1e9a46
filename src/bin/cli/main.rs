use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use studium_lib::ai::{GeminiClient, GeminiEmbedder};
use studium_lib::config::StudyConfig;
use studium_lib::ocr::{PageSource, PdftotextSource, TextFileSource};
use studium_lib::rag::{Retriever, VectorIndex};
use studium_lib::study::{StudyOptions, StudyPipeline};

#[derive(Parser)]
#[command(name = "studium-cli", about = "Studium document study assistant", version)]
struct Cli {
    /// Path to a studium.toml config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a vector index from a document and save the snapshot
    Index {
        /// Source document (.pdf via pdftotext, anything else read as text)
        input: PathBuf,
        /// Snapshot directory (default: platform data dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Answer a question against a saved index snapshot
    Ask {
        /// The question to answer
        query: String,
        /// Snapshot directory (default: platform data dir)
        #[arg(long)]
        index: Option<PathBuf>,
        /// Number of chunks retrieved as context
        #[arg(long)]
        k: Option<usize>,
        /// Print the retrieved chunks instead of asking the model
        #[arg(long)]
        show_context: bool,
    },

    /// Run the full pipeline and write the study artifact
    Study {
        /// Source document (.pdf via pdftotext, anything else read as text)
        input: PathBuf,
        /// The question to answer alongside the summary and MCQs
        #[arg(long)]
        query: String,
        /// Output path for the study artifact
        #[arg(long, default_value = "results.json")]
        output: PathBuf,
    },
}

/// Pick a page source by file extension.
fn page_source(input: &Path) -> Box<dyn PageSource> {
    match input.extension().and_then(|e| e.to_str()) {
        Some("pdf") => Box::new(PdftotextSource::new(input.to_path_buf())),
        _ => Box::new(TextFileSource::new(input.to_path_buf())),
    }
}

fn document_name(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = StudyConfig::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Command::Index { input, out } => {
            let api_key = config.require_api_key()?;
            let embedder = GeminiEmbedder::new(api_key, config.embedding_model.clone())?;
            let model_stub = NoModel;
            let pipeline =
                StudyPipeline::new(&embedder, &model_stub, StudyOptions::from(&config));

            let pages = page_source(&input)
                .extract_pages()
                .context("failed to extract pages")?;
            let index = pipeline
                .index_document(&pages, &document_name(&input))
                .context("failed to build index")?;

            let dir = out.unwrap_or_else(|| config.resolve_index_dir());
            index.save(&dir).context("failed to save index snapshot")?;
            println!(
                "Indexed {} chunks ({} dimensions) into {}",
                index.len(),
                index.dimensions(),
                dir.display()
            );
        }

        Command::Ask {
            query,
            index,
            k,
            show_context,
        } => {
            let api_key = config.require_api_key()?;
            let embedder = GeminiEmbedder::new(api_key.clone(), config.embedding_model.clone())?;

            let dir = index.unwrap_or_else(|| config.resolve_index_dir());
            let index =
                VectorIndex::load(&dir).context("failed to load index snapshot")?;
            let k = k.unwrap_or(config.top_k);

            let retriever = Retriever::new(&index, &embedder);
            let results = retriever.retrieve(&query, k)?;

            if show_context {
                for result in &results {
                    println!(
                        "[page {} | score {:.4}]\n{}\n",
                        result.metadata.page_no, result.score, result.content
                    );
                }
                return Ok(());
            }

            if results.is_empty() {
                println!("No relevant documents found.");
                return Ok(());
            }

            let model = GeminiClient::new(api_key, config.generation_model.clone())?;
            let pipeline = StudyPipeline::new(&embedder, &model, StudyOptions::from(&config));
            let answer = pipeline.answer(&index, &query)?;
            println!("{}", answer);
        }

        Command::Study {
            input,
            query,
            output,
        } => {
            let api_key = config.require_api_key()?;
            let embedder = GeminiEmbedder::new(api_key.clone(), config.embedding_model.clone())?;
            let model = GeminiClient::new(api_key, config.generation_model.clone())?;
            let pipeline = StudyPipeline::new(&embedder, &model, StudyOptions::from(&config));

            let pages = page_source(&input)
                .extract_pages()
                .context("failed to extract pages")?;
            let artifact = pipeline.run(&pages, &document_name(&input), &query)?;

            artifact
                .save(&output)
                .context("failed to write study artifact")?;
            println!("{}", artifact.to_json()?);
            println!("Saved {}", output.display());
        }
    }

    Ok(())
}

/// Stand-in generative model for the index command, which never generates.
struct NoModel;

impl studium_lib::GenerativeModel for NoModel {
    fn ask(&self, _prompt: &str) -> Result<String, studium_lib::ai::GenerationError> {
        Err(studium_lib::ai::GenerationError::Unavailable(
            "no generative model configured for this command".into(),
        ))
    }
}
