use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::buckets;
use super::flags::{Flag, Severity};
use crate::analysis::{Bucket, FinancialAnalysis};
use serde::{Deserialize, Serialize};

/// Selector for the shipped scoring policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Liability,
    Utilization,
}

impl PolicyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Liability => "liability",
            PolicyKind::Utilization => "utilization",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown scoring policy `{}` (expected `liability` or `utilization`)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "liability" | "liability-v2" => Ok(PolicyKind::Liability),
            "utilization" | "utilization-v1" => Ok(PolicyKind::Utilization),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Weight applied to one bucket in the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketWeight {
    pub bucket: Bucket,
    pub weight: f64,
}

impl BucketWeight {
    pub const fn new(bucket: Bucket, weight: f64) -> Self {
        Self { bucket, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagThresholds {
    /// Bucket scores strictly below this raise `low_<bucket>_score`.
    pub low_score: u8,
    /// Utilization fraction strictly above this raises `high_credit_utilization`.
    pub high_credit_utilization: f64,
    /// Net flow strictly below this raises `negative_cash_flow`.
    pub negative_cash_flow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRules {
    /// Numeric subscore when no expense amounts were extracted.
    pub empty_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeRules {
    /// Numeric subscore when irregular income exceeds regular income.
    /// `None` lets that case fall through to the default tier.
    pub mostly_irregular_score: Option<f64>,
}

/// Explicit rubric configuration behind a scoring policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyRules {
    pub name: &'static str,
    pub weights: Vec<BucketWeight>,
    pub thresholds: FlagThresholds,
    pub expenses: ExpenseRules,
    pub income: IncomeRules,
}

impl PolicyRules {
    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.weights.iter().map(|entry| entry.bucket)
    }

    pub fn weight_of(&self, bucket: Bucket) -> Option<f64> {
        self.weights
            .iter()
            .find(|entry| entry.bucket == bucket)
            .map(|entry| entry.weight)
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().map(|entry| entry.weight).sum()
    }
}

const DEFAULT_THRESHOLDS: FlagThresholds = FlagThresholds {
    low_score: 60,
    high_credit_utilization: 0.30,
    negative_cash_flow: 0.0,
};

const NEUTRAL_EXPENSES: ExpenseRules = ExpenseRules { empty_score: 50.0 };

/// One versioned scoring strategy.
///
/// Implementations only decide how the debt bucket is scored and which
/// policy-specific flags exist; the other ladders are shared and tuned
/// through [`PolicyRules`].
pub trait ScoringPolicy: Send + Sync {
    fn kind(&self) -> PolicyKind;

    fn rules(&self) -> &PolicyRules;

    fn score_debt_credit(&self, analysis: &FinancialAnalysis) -> u8;

    /// Score for `bucket`, or `None` when the record does not carry it.
    fn score_bucket(&self, bucket: Bucket, analysis: &FinancialAnalysis) -> Option<u8> {
        let rules = self.rules();
        let score = match bucket {
            Bucket::CashFlow => buckets::score_cash_flow(&analysis.cash_flow),
            Bucket::Expenses => buckets::score_expenses(&analysis.expenses, &rules.expenses),
            Bucket::Income => buckets::score_income(&analysis.income, &rules.income),
            Bucket::DebtCredit => self.score_debt_credit(analysis),
            Bucket::FinancialHealth => {
                buckets::score_financial_health(analysis.financial_health.as_ref()?)
            }
        };
        Some(score)
    }

    /// Flags raised only by this policy, appended after the shared cash-flow flag.
    fn policy_flags(&self, _analysis: &FinancialAnalysis) -> Vec<Flag> {
        Vec::new()
    }
}

/// Canonical four-bucket policy scoring debt by inferred liability types.
#[derive(Debug, Clone)]
pub struct LiabilityPolicy {
    rules: PolicyRules,
}

impl LiabilityPolicy {
    pub const NAME: &'static str = "liability-v2";

    pub fn new() -> Self {
        Self::with_rules(Self::default_rules())
    }

    pub fn with_rules(rules: PolicyRules) -> Self {
        Self { rules }
    }

    pub fn default_rules() -> PolicyRules {
        PolicyRules {
            name: Self::NAME,
            weights: vec![
                BucketWeight::new(Bucket::CashFlow, 0.30),
                BucketWeight::new(Bucket::Expenses, 0.20),
                BucketWeight::new(Bucket::Income, 0.30),
                BucketWeight::new(Bucket::DebtCredit, 0.20),
            ],
            thresholds: DEFAULT_THRESHOLDS,
            expenses: NEUTRAL_EXPENSES,
            income: IncomeRules {
                mostly_irregular_score: None,
            },
        }
    }
}

impl Default for LiabilityPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringPolicy for LiabilityPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Liability
    }

    fn rules(&self) -> &PolicyRules {
        &self.rules
    }

    fn score_debt_credit(&self, analysis: &FinancialAnalysis) -> u8 {
        buckets::score_debt_by_liabilities(&analysis.debt_credit)
    }
}

/// Legacy five-bucket policy scoring debt by credit utilization.
#[derive(Debug, Clone)]
pub struct UtilizationPolicy {
    rules: PolicyRules,
}

impl UtilizationPolicy {
    pub const NAME: &'static str = "utilization-v1";

    pub fn new() -> Self {
        Self::with_rules(Self::default_rules())
    }

    pub fn with_rules(rules: PolicyRules) -> Self {
        Self { rules }
    }

    pub fn default_rules() -> PolicyRules {
        PolicyRules {
            name: Self::NAME,
            weights: vec![
                BucketWeight::new(Bucket::CashFlow, 0.25),
                BucketWeight::new(Bucket::Expenses, 0.20),
                BucketWeight::new(Bucket::Income, 0.25),
                BucketWeight::new(Bucket::DebtCredit, 0.15),
                BucketWeight::new(Bucket::FinancialHealth, 0.15),
            ],
            thresholds: DEFAULT_THRESHOLDS,
            expenses: NEUTRAL_EXPENSES,
            income: IncomeRules {
                mostly_irregular_score: Some(50.0),
            },
        }
    }
}

impl Default for UtilizationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringPolicy for UtilizationPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Utilization
    }

    fn rules(&self) -> &PolicyRules {
        &self.rules
    }

    fn score_debt_credit(&self, analysis: &FinancialAnalysis) -> u8 {
        buckets::score_debt_by_utilization(&analysis.debt_credit)
    }

    fn policy_flags(&self, analysis: &FinancialAnalysis) -> Vec<Flag> {
        let threshold = self.rules.thresholds.high_credit_utilization;
        match analysis.debt_credit.utilization_fraction() {
            Some(fraction) if fraction > threshold => vec![Flag::new(
                "high_credit_utilization",
                Severity::High,
                format!("High credit utilization at {:.1}%", fraction * 100.0),
            )],
            _ => Vec::new(),
        }
    }
}

/// Shared policy instance for a configured kind.
pub fn policy_for(kind: PolicyKind) -> Arc<dyn ScoringPolicy> {
    match kind {
        PolicyKind::Liability => Arc::new(LiabilityPolicy::new()),
        PolicyKind::Utilization => Arc::new(UtilizationPolicy::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_kind_parses_configuration_values() {
        assert_eq!("liability".parse::<PolicyKind>(), Ok(PolicyKind::Liability));
        assert_eq!(" Utilization ".parse::<PolicyKind>(), Ok(PolicyKind::Utilization));
        assert_eq!("utilization-v1".parse::<PolicyKind>(), Ok(PolicyKind::Utilization));
        assert_eq!(
            "fico".parse::<PolicyKind>(),
            Err(UnknownPolicy("fico".to_string()))
        );
    }

    #[test]
    fn shipped_weights_sum_to_one() {
        for rules in [LiabilityPolicy::default_rules(), UtilizationPolicy::default_rules()] {
            assert!((rules.total_weight() - 1.0).abs() < 1e-9, "{}", rules.name);
        }
    }

    #[test]
    fn canonical_policy_has_four_buckets() {
        let rules = LiabilityPolicy::default_rules();
        assert_eq!(
            rules.buckets().collect::<Vec<_>>(),
            vec![Bucket::CashFlow, Bucket::Expenses, Bucket::Income, Bucket::DebtCredit]
        );
        assert_eq!(rules.weight_of(Bucket::FinancialHealth), None);
        assert_eq!(
            UtilizationPolicy::default_rules().weight_of(Bucket::FinancialHealth),
            Some(0.15)
        );
    }
}
