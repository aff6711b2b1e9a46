//! End-to-end study pipeline orchestration.
//!
//! Chunks a document, builds the vector index, then runs the three
//! generation phases (answer, summarize, MCQ) against the injected
//! collaborators and assembles the study artifact. The pipeline is stateless
//! across runs; the index built for the current document is its only
//! transient state.

use thiserror::Error;

use crate::ai::{EmbedError, Embedder, GenerationError, GenerativeModel};
use crate::config::StudyConfig;
use crate::rag::{
    chunk_pages, ChunkingParams, Metric, RetrievalError, Retriever, VectorIndex, VectorIndexError,
};

use super::models::StudyArtifact;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("index phase: {0}")]
    Index(#[from] VectorIndexError),

    #[error("index phase: {0}")]
    Embed(#[from] EmbedError),

    #[error("{phase} phase: {source}")]
    Generation {
        phase: &'static str,
        source: GenerationError,
    },

    #[error("answer phase: {0}")]
    Retrieval(#[from] RetrievalError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Tunables for one pipeline run.
#[derive(Debug, Clone)]
pub struct StudyOptions {
    pub chunking: ChunkingParams,
    pub metric: Metric,
    /// Chunks retrieved as answer context
    pub top_k: usize,
    /// Chunks summarized, in original order
    pub max_pages: usize,
    /// Chunks joined into the MCQ context
    pub mcq_context_chunks: usize,
    /// Questions requested from the model
    pub num_mcqs: usize,
}

impl Default for StudyOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingParams::default(),
            metric: Metric::default(),
            top_k: 5,
            max_pages: 5,
            mcq_context_chunks: 10,
            num_mcqs: 5,
        }
    }
}

impl From<&StudyConfig> for StudyOptions {
    fn from(config: &StudyConfig) -> Self {
        Self {
            chunking: config.chunking,
            metric: config.metric,
            top_k: config.top_k,
            max_pages: config.max_pages,
            mcq_context_chunks: config.mcq_context_chunks,
            num_mcqs: config.num_mcqs,
        }
    }
}

/// Orchestrates chunking, indexing, retrieval, and generation.
pub struct StudyPipeline<'a> {
    embedder: &'a dyn Embedder,
    model: &'a dyn GenerativeModel,
    options: StudyOptions,
}

impl<'a> StudyPipeline<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        model: &'a dyn GenerativeModel,
        options: StudyOptions,
    ) -> Self {
        Self {
            embedder,
            model,
            options,
        }
    }

    /// Index phase: chunk pages, embed every chunk, build the index.
    ///
    /// Failures here are local to this phase and are never masked by later
    /// generation failures.
    pub fn index_document(&self, pages: &[String], filename: &str) -> Result<VectorIndex> {
        let chunks = chunk_pages(pages, filename, &self.options.chunking);
        log::info!("chunked {} pages into {} chunks", pages.len(), chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        Ok(VectorIndex::build(chunks, embeddings, self.options.metric)?)
    }

    /// Answer phase: retrieve context for the query and ask the model.
    pub fn answer(&self, index: &VectorIndex, query: &str) -> Result<String> {
        let retriever = Retriever::new(index, self.embedder);
        let results = retriever.retrieve(query, self.options.top_k)?;

        let context = results
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "Given the following context, answer this: {}\n\n{}",
            query, context
        );
        self.ask("answer", &prompt)
    }

    /// Summarize phase: one generation call per chunk, first `max_pages`
    /// chunks in original order, each summary labeled with its page number.
    pub fn summarize(&self, index: &VectorIndex) -> Result<String> {
        let mut summaries = Vec::new();
        for chunk in index.chunks().iter().take(self.options.max_pages) {
            let page = chunk.metadata.page_no;
            let prompt = format!(
                "Summarize the following text from page {}:\n\n{}",
                page, chunk.text
            );
            let response = self.ask("summarize", &prompt)?;
            summaries.push(format!("Page {} Summary:\n{}\n", page, response));
        }
        Ok(summaries.join("\n"))
    }

    /// MCQ phase: one generation call over a combined context.
    ///
    /// The model's text is returned verbatim; no structural parsing of the
    /// question format happens here.
    pub fn generate_mcqs(&self, index: &VectorIndex) -> Result<String> {
        let context = index
            .chunks()
            .iter()
            .take(self.options.mcq_context_chunks)
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Based on the following study material, generate {} multiple-choice questions (MCQs).\n\
             Each MCQ should have 4 options (A, B, C, D) and specify the correct answer clearly.\n\n\
             Context:\n{}",
            self.options.num_mcqs, context
        );
        self.ask("mcq", &prompt)
    }

    /// Full run: index, answer, summarize, MCQs, assemble the artifact.
    pub fn run(&self, pages: &[String], filename: &str, query: &str) -> Result<StudyArtifact> {
        let index = self.index_document(pages, filename)?;

        let answer = self.answer(&index, query)?;
        let summary = self.summarize(&index)?;
        let mcqs = self.generate_mcqs(&index)?;

        Ok(StudyArtifact::new(
            summary,
            query.to_string(),
            answer,
            mcqs,
        ))
    }

    fn ask(&self, phase: &'static str, prompt: &str) -> Result<String> {
        self.model
            .ask(prompt)
            .map_err(|source| PipelineError::Generation { phase, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::{BagOfWordsEmbedder, ScriptedModel, UnavailableModel};

    fn crud_pages() -> Vec<String> {
        vec![
            "CRUD stands for Create Read Update Delete.".to_string(),
            "Indexes speed up queries.".to_string(),
        ]
    }

    fn options() -> StudyOptions {
        StudyOptions {
            chunking: ChunkingParams {
                chunk_size: 500,
                overlap: 50,
            },
            ..StudyOptions::default()
        }
    }

    #[test]
    fn test_index_phase_one_chunk_per_short_page() {
        let embedder = BagOfWordsEmbedder::default();
        let model = ScriptedModel::new("ok");
        let pipeline = StudyPipeline::new(&embedder, &model, options());

        let index = pipeline.index_document(&crud_pages(), "dbms.pdf").unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.chunks()[0].metadata.page_no, 1);
        assert_eq!(index.chunks()[1].metadata.page_no, 2);
    }

    #[test]
    fn test_crud_query_retrieves_page_one() {
        let embedder = BagOfWordsEmbedder::default();
        let model = ScriptedModel::new("answer text");
        let pipeline = StudyPipeline::new(&embedder, &model, options());

        let index = pipeline.index_document(&crud_pages(), "dbms.pdf").unwrap();
        let retriever = Retriever::new(&index, &embedder);
        let results = retriever.retrieve("What is CRUD?", 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.page_no, 1);
    }

    #[test]
    fn test_summarize_issues_one_call_per_chunk_in_order() {
        let embedder = BagOfWordsEmbedder::default();
        let model = ScriptedModel::new("brief summary")
            .with_responses(vec!["about CRUD".to_string(), "about indexes".to_string()]);
        let pipeline = StudyPipeline::new(
            &embedder,
            &model,
            StudyOptions {
                max_pages: 2,
                ..options()
            },
        );

        let index = pipeline.index_document(&crud_pages(), "dbms.pdf").unwrap();
        let summary = pipeline.summarize(&index).unwrap();

        assert_eq!(model.call_count(), 2);
        let page1 = summary.find("Page 1 Summary:").unwrap();
        let page2 = summary.find("Page 2 Summary:").unwrap();
        assert!(page1 < page2);
        assert!(summary.contains("about CRUD"));
        assert!(summary.contains("about indexes"));
    }

    #[test]
    fn test_summarize_respects_max_pages() {
        let embedder = BagOfWordsEmbedder::default();
        let model = ScriptedModel::new("s");
        let pipeline = StudyPipeline::new(
            &embedder,
            &model,
            StudyOptions {
                max_pages: 1,
                ..options()
            },
        );

        let index = pipeline.index_document(&crud_pages(), "dbms.pdf").unwrap();
        pipeline.summarize(&index).unwrap();
        assert_eq!(model.call_count(), 1);
    }

    #[test]
    fn test_mcq_prompt_carries_count_and_context() {
        let embedder = BagOfWordsEmbedder::default();
        let model = ScriptedModel::new("Q1 ... Answer: B");
        let pipeline = StudyPipeline::new(
            &embedder,
            &model,
            StudyOptions {
                num_mcqs: 3,
                ..options()
            },
        );

        let index = pipeline.index_document(&crud_pages(), "dbms.pdf").unwrap();
        let mcqs = pipeline.generate_mcqs(&index).unwrap();
        assert_eq!(mcqs, "Q1 ... Answer: B");

        let prompts = model.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("generate 3 multiple-choice questions"));
        assert!(prompts[0].contains("CRUD stands for"));
    }

    #[test]
    fn test_full_run_assembles_artifact() {
        let embedder = BagOfWordsEmbedder::default();
        let model = ScriptedModel::new("generated");
        let pipeline = StudyPipeline::new(&embedder, &model, options());

        let artifact = pipeline
            .run(&crud_pages(), "dbms.pdf", "What is CRUD?")
            .unwrap();

        assert_eq!(artifact.user_query.query, "What is CRUD?");
        assert_eq!(artifact.user_query.answer, "generated");
        assert!(artifact.summariser.contains("Page 1 Summary:"));
        assert_eq!(artifact.mcqs, "generated");
    }

    #[test]
    fn test_empty_document_fails_in_index_phase() {
        let embedder = BagOfWordsEmbedder::default();
        let model = ScriptedModel::new("never called");
        let pipeline = StudyPipeline::new(&embedder, &model, options());

        let err = pipeline.index_document(&[], "empty.pdf").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Index(VectorIndexError::Empty)
        ));
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn test_generation_failure_reports_phase_and_spares_index() {
        let embedder = BagOfWordsEmbedder::default();
        let model = UnavailableModel;
        let pipeline = StudyPipeline::new(&embedder, &model, options());

        // Index phase does not depend on generation and must succeed.
        let index = pipeline.index_document(&crud_pages(), "dbms.pdf").unwrap();

        let err = pipeline.answer(&index, "What is CRUD?").unwrap_err();
        match err {
            PipelineError::Generation { phase, .. } => assert_eq!(phase, "answer"),
            other => panic!("unexpected error: {}", other),
        }

        let err = pipeline.summarize(&index).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Generation { phase: "summarize", .. }
        ));
    }
}
