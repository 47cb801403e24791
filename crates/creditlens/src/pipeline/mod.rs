//! Statement pipeline: parse, extract, normalize, score, narrate, assemble.
//!
//! External services sit behind [`DocumentParser`] and [`LanguageModel`] so
//! the orchestration can run against in-memory fakes.

mod document;
pub mod prompts;

pub use document::{split_into_sections, DocumentPart, ParsedDocument, Section};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::analysis::{AnalysisNormalizer, FinancialAnalysis};
use crate::report::{narrative_prompt, Narrative, Report, ReportAssembler};
use crate::scoring::{PolicyKind, ScoringEngine, ScoringError, ScoringResult};

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{service} failed: {message}")]
pub struct CollaboratorError {
    pub service: &'static str,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("parsed document has no content")]
    EmptyDocument,
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, path: &Path) -> Result<ParsedDocument, CollaboratorError>;
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError>;
}

/// Scores, flags and report for one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredAnalysis {
    pub analysis: FinancialAnalysis,
    pub scoring: ScoringResult,
    pub report: Report,
}

/// Collaborator-free half of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct AnalysisScorer {
    normalizer: AnalysisNormalizer,
    engine: ScoringEngine,
    assembler: ReportAssembler,
}

impl AnalysisScorer {
    pub fn new(engine: ScoringEngine, assembler: ReportAssembler) -> Self {
        Self {
            normalizer: AnalysisNormalizer::new(),
            engine,
            assembler,
        }
    }

    pub fn for_kind(kind: PolicyKind) -> Self {
        Self::new(ScoringEngine::for_kind(kind), ReportAssembler::default())
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.engine.policy().kind()
    }

    pub fn normalizer(&self) -> &AnalysisNormalizer {
        &self.normalizer
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn assembler(&self) -> &ReportAssembler {
        &self.assembler
    }

    /// Score raw model text; unreadable text is scored as the fallback record.
    pub fn score_text(&self, raw: &str) -> Result<ScoredAnalysis, ScoringError> {
        self.score_analysis(self.normalizer.normalize(raw))
    }

    pub fn score_value(&self, value: &Value) -> Result<ScoredAnalysis, ScoringError> {
        self.score_analysis(self.normalizer.from_value(value))
    }

    pub fn score_analysis(&self, analysis: FinancialAnalysis) -> Result<ScoredAnalysis, ScoringError> {
        let scoring = self.engine.calculate_score(&analysis)?;
        let report = self
            .assembler
            .assemble(&analysis, &scoring, &Narrative::default());
        Ok(ScoredAnalysis {
            analysis,
            scoring,
            report,
        })
    }
}

/// Every artifact produced while processing one statement.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub parsed_data: ParsedDocument,
    pub results: FinancialAnalysis,
    pub scoring: ScoringResult,
    pub final_output: Report,
}

pub struct StatementPipeline {
    parser: Arc<dyn DocumentParser>,
    model: Arc<dyn LanguageModel>,
    scorer: AnalysisScorer,
}

impl StatementPipeline {
    pub fn new(
        parser: Arc<dyn DocumentParser>,
        model: Arc<dyn LanguageModel>,
        scorer: AnalysisScorer,
    ) -> Self {
        Self {
            parser,
            model,
            scorer,
        }
    }

    pub fn scorer(&self) -> &AnalysisScorer {
        &self.scorer
    }

    #[instrument(skip(self), fields(policy = %self.scorer.policy_kind()))]
    pub async fn run(&self, path: &Path) -> Result<PipelineOutput, PipelineError> {
        info!(path = %path.display(), "parsing statement");
        let parsed_data = self.parser.parse(path).await?;
        let content = parsed_data
            .primary_content()
            .ok_or(PipelineError::EmptyDocument)?;

        info!(chars = content.len(), "requesting structured analysis");
        let prompt = prompts::analysis_prompt(content, self.scorer.policy_kind());
        let raw_analysis = self.model.complete(&prompt).await?;
        let analysis = self.scorer.normalizer().normalize(&raw_analysis);

        let scoring = self.scorer.engine().calculate_score(&analysis)?;
        info!(final_score = scoring.final_score, "statement scored");

        let raw_narrative = self.model.complete(&narrative_prompt(&scoring)).await?;
        let narrative = Narrative::parse(&raw_narrative);

        let final_output = self
            .scorer
            .assembler()
            .assemble(&analysis, &scoring, &narrative);
        info!(decision = %final_output.summary.health_status, "report assembled");

        Ok(PipelineOutput {
            parsed_data,
            results: analysis,
            scoring,
            final_output,
        })
    }
}

impl std::fmt::Debug for StatementPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementPipeline")
            .field("scorer", &self.scorer)
            .finish_non_exhaustive()
    }
}
