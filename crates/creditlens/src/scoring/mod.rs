//! Bucket and aggregate scoring of a canonical [`FinancialAnalysis`].

pub mod buckets;
mod flags;
pub mod keywords;
mod metrics;
mod policy;

#[cfg(test)]
mod tests;

pub use flags::{Flag, Severity};
pub use metrics::{
    CashFlowSummary, DebtMetrics, ExpenseMetrics, HealthIndicators, IncomeStability,
    IndicatorFinding, ScoringMetrics,
};
pub use policy::{
    policy_for, BucketWeight, ExpenseRules, FlagThresholds, IncomeRules, LiabilityPolicy,
    PolicyKind, PolicyRules, ScoringPolicy, UnknownPolicy, UtilizationPolicy,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::{Bucket, FinancialAnalysis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Integer bucket scores keyed in bucket declaration order.
pub type ComponentScores = BTreeMap<Bucket, u8>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("policy `{policy}` requires the {bucket} bucket but the analysis does not include it")]
    MissingBucket { policy: &'static str, bucket: &'static str },
}

/// Output of the aggregate scorer; a pure function of the analysis and policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub policy: String,
    pub final_score: f64,
    pub component_scores: ComponentScores,
    pub flags: Vec<Flag>,
    pub metrics: ScoringMetrics,
}

impl ScoringResult {
    pub fn score_of(&self, bucket: Bucket) -> Option<u8> {
        self.component_scores.get(&bucket).copied()
    }
}

/// Stateless aggregator applying one scoring policy.
#[derive(Clone)]
pub struct ScoringEngine {
    policy: Arc<dyn ScoringPolicy>,
}

impl ScoringEngine {
    pub fn new(policy: Arc<dyn ScoringPolicy>) -> Self {
        Self { policy }
    }

    /// Engine running the canonical liability policy.
    pub fn canonical() -> Self {
        Self::new(Arc::new(LiabilityPolicy::new()))
    }

    pub fn for_kind(kind: PolicyKind) -> Self {
        Self::new(policy_for(kind))
    }

    pub fn policy(&self) -> &dyn ScoringPolicy {
        self.policy.as_ref()
    }

    pub fn calculate_score(&self, analysis: &FinancialAnalysis) -> Result<ScoringResult, ScoringError> {
        let rules = self.policy.rules();
        let component_scores = self.component_scores(analysis)?;

        let weighted: f64 = rules
            .weights
            .iter()
            .filter_map(|entry| {
                let score = component_scores.get(&entry.bucket)?;
                Some(entry.weight * f64::from(*score))
            })
            .sum();
        let final_score = round_cents(weighted.clamp(0.0, 100.0));

        let flags = self.flags(analysis, &component_scores);
        debug!(
            policy = rules.name,
            final_score,
            ?component_scores,
            flag_count = flags.len(),
            "analysis scored"
        );

        Ok(ScoringResult {
            policy: rules.name.to_string(),
            final_score,
            component_scores,
            flags,
            metrics: ScoringMetrics::project(analysis),
        })
    }

    fn component_scores(&self, analysis: &FinancialAnalysis) -> Result<ComponentScores, ScoringError> {
        let rules = self.policy.rules();
        rules
            .buckets()
            .map(|bucket| {
                self.policy
                    .score_bucket(bucket, analysis)
                    .map(|score| (bucket, score))
                    .ok_or(ScoringError::MissingBucket {
                        policy: rules.name,
                        bucket: bucket.as_str(),
                    })
            })
            .collect()
    }

    fn flags(&self, analysis: &FinancialAnalysis, scores: &ComponentScores) -> Vec<Flag> {
        let thresholds = &self.policy.rules().thresholds;
        let mut flags: Vec<Flag> = self
            .policy
            .rules()
            .buckets()
            .filter_map(|bucket| {
                let score = scores.get(&bucket).copied()?;
                (score < thresholds.low_score).then(|| {
                    Flag::new(
                        format!("low_{}_score", bucket.as_str()),
                        Severity::Warning,
                        format!("Low {} score of {score}", bucket.label()),
                    )
                })
            })
            .collect();

        let net_flow = analysis.cash_flow.net_flow;
        if net_flow < thresholds.negative_cash_flow {
            flags.push(Flag::new(
                "negative_cash_flow",
                Severity::High,
                format!("Negative cash flow detected: ${net_flow:.2}"),
            ));
        }

        flags.extend(self.policy.policy_flags(analysis));

        let major_count = analysis.expenses.major_expenses.len();
        if major_count > 0 {
            flags.push(Flag::new(
                "large_expenses",
                Severity::Info,
                format!("Large expenses detected: {major_count} transactions"),
            ));
        }

        flags
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::canonical()
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("policy", &self.policy.rules().name)
            .finish()
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
