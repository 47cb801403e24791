use std::collections::BTreeMap;

use crate::analysis::{
    Bucket, CashFlow, DebtCredit, Expenses, FinancialAnalysis, FinancialHealth, Income,
    IncomeSource, KeyIndicator, LineItem,
};
use crate::scoring::{LiabilityPolicy, PolicyKind, PolicyRules, ScoringPolicy};

pub(super) fn cash_flow(
    inflow: f64,
    outflow: f64,
    net_flow: f64,
    beginning: f64,
    ending: f64,
    summary: &str,
) -> CashFlow {
    CashFlow {
        total_inflow: inflow,
        total_outflow: outflow,
        net_flow,
        beginning_balance: beginning,
        ending_balance: ending,
        summary: summary.to_string(),
    }
}

/// Cash flow with steady balances so only the net ratio drives the ladder.
pub(super) fn cash_flow_with_ratio(net_ratio: f64) -> CashFlow {
    let inflow = 1000.0;
    cash_flow(inflow, inflow * (1.0 - net_ratio), inflow * net_ratio, 5000.0, 5000.0, "")
}

pub(super) fn expenses(major: &[f64], recurring: &[f64], summary: &str) -> Expenses {
    let items = |amounts: &[f64], label: &str| {
        amounts
            .iter()
            .enumerate()
            .map(|(idx, amount)| LineItem::new(format!("{label} {idx}"), *amount))
            .collect()
    };
    Expenses {
        major_expenses: items(major, "major"),
        recurring_expenses: items(recurring, "recurring"),
        summary: summary.to_string(),
    }
}

pub(super) fn income(regular: &[f64], irregular: &[f64], summary: &str) -> Income {
    Income {
        regular_sources: regular
            .iter()
            .enumerate()
            .map(|(idx, amount)| IncomeSource {
                description: format!("employer {idx}"),
                total_amount: *amount,
            })
            .collect(),
        irregular_sources: irregular
            .iter()
            .enumerate()
            .map(|(idx, amount)| LineItem::new(format!("side income {idx}"), *amount))
            .collect(),
        summary: summary.to_string(),
    }
}

pub(super) fn debt(utilization: &str, liabilities: &str, summary: &str) -> DebtCredit {
    DebtCredit {
        recurring_debt_payments: vec![LineItem::new("Auto loan", 320.0)],
        inferred_liability_types: liabilities.to_string(),
        credit_utilization: utilization.to_string(),
        summary: summary.to_string(),
    }
}

pub(super) fn indicator(category: &str, impact: &str) -> KeyIndicator {
    KeyIndicator {
        category: category.to_string(),
        observation: format!("{category} observed"),
        impact: impact.to_string(),
    }
}

pub(super) fn health(indicators: Vec<KeyIndicator>, summary: &str) -> FinancialHealth {
    FinancialHealth {
        key_indicators: indicators,
        summary: summary.to_string(),
    }
}

/// Borrower with a healthy surplus, one large rent payment and an auto loan.
///
/// Liability policy scores: cash_flow 87, expenses 62, income 78, debt 69.
pub(super) fn sample_analysis() -> FinancialAnalysis {
    FinancialAnalysis {
        cash_flow: cash_flow(5000.0, 3000.0, 2000.0, 4000.0, 6000.0, "stable and healthy"),
        expenses: expenses(&[1500.0], &[200.0, 80.0], "Manageable and reasonable"),
        income: income(&[5000.0], &[], "Steady payroll"),
        debt_credit: debt("45%", "auto", "Paying off an auto loan"),
        financial_health: None,
    }
}

/// [`sample_analysis`] with a savings-heavy health section (scores 88).
pub(super) fn sample_with_health() -> FinancialAnalysis {
    FinancialAnalysis {
        financial_health: Some(health(
            vec![
                indicator("Savings", "positive"),
                indicator("Emergency savings", "positive"),
                indicator("Overdraft", "negative"),
            ],
            "Disciplined savings habits",
        )),
        ..sample_analysis()
    }
}

/// Policy that reports preset bucket scores, for exercising aggregation rules.
pub(super) struct FixedScorePolicy {
    rules: PolicyRules,
    scores: BTreeMap<Bucket, u8>,
}

impl FixedScorePolicy {
    pub(super) fn new(scores: &[(Bucket, u8)]) -> Self {
        Self {
            rules: LiabilityPolicy::default_rules(),
            scores: scores.iter().copied().collect(),
        }
    }
}

impl ScoringPolicy for FixedScorePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Liability
    }

    fn rules(&self) -> &PolicyRules {
        &self.rules
    }

    fn score_debt_credit(&self, _analysis: &FinancialAnalysis) -> u8 {
        self.scores.get(&Bucket::DebtCredit).copied().unwrap_or(70)
    }

    fn score_bucket(&self, bucket: Bucket, _analysis: &FinancialAnalysis) -> Option<u8> {
        Some(self.scores.get(&bucket).copied().unwrap_or(70))
    }
}
