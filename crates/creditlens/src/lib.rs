//! Bank-statement scoring: normalize a model-extracted analysis, score it
//! under a versioned policy and assemble a loan-decision report.

pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod telemetry;

pub use analysis::{AnalysisNormalizer, FinancialAnalysis};
pub use error::AppError;
pub use pipeline::{AnalysisScorer, StatementPipeline};
pub use report::{Report, ReportAssembler};
pub use scoring::{PolicyKind, ScoringEngine, ScoringResult};
