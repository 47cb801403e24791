//! Normalization of language-model output into the canonical [`FinancialAnalysis`].

pub mod domain;
mod extract;
pub mod repair;

pub use domain::{
    Bucket, CashFlow, DebtCredit, Expenses, FinancialAnalysis, FinancialHealth, Income,
    IncomeSource, KeyIndicator, LineItem, FALLBACK_SUMMARY,
};
pub use extract::{safe_float, NEUTRAL_NUMBER};
pub use repair::RepairError;

use serde_json::Value;
use tracing::{debug, warn};

/// Stateless converter from raw model responses to canonical records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisNormalizer;

impl AnalysisNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Never fails: unrecoverable input yields [`FinancialAnalysis::fallback`].
    pub fn normalize(&self, raw: &str) -> FinancialAnalysis {
        match self.try_normalize(raw) {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(error = %err, "analysis payload unrecoverable, using fallback record");
                FinancialAnalysis::fallback()
            }
        }
    }

    pub fn try_normalize(&self, raw: &str) -> Result<FinancialAnalysis, RepairError> {
        let value = repair::repair(raw)?;
        debug!("analysis payload repaired");
        Ok(self.from_value(&value))
    }

    /// Populate a record from an already-parsed payload.
    pub fn from_value(&self, value: &Value) -> FinancialAnalysis {
        extract::build_analysis(value)
    }
}
