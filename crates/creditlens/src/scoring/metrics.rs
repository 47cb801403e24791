use serde::{Deserialize, Serialize};

use crate::analysis::{FinancialAnalysis, LineItem};

/// Reporting projection of a [`FinancialAnalysis`]; carries no scoring logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringMetrics {
    pub cash_flow_summary: CashFlowSummary,
    pub expense_metrics: ExpenseMetrics,
    pub income_stability: IncomeStability,
    pub debt_metrics: DebtMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_health_indicators: Option<HealthIndicators>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    pub net_flow: f64,
    pub total_inflow: f64,
    pub total_outflow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseMetrics {
    pub major_expenses_count: usize,
    pub recurring_expenses_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStability {
    pub regular_sources: usize,
    pub irregular_sources: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtMetrics {
    pub recurring_debt_payments: Vec<LineItem>,
    pub credit_utilization: String,
    pub inferred_liability_types: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthIndicators {
    pub indicators_count: usize,
    pub key_findings: Vec<IndicatorFinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorFinding {
    pub category: String,
    pub impact: String,
}

impl ScoringMetrics {
    pub fn project(analysis: &FinancialAnalysis) -> Self {
        let cash_flow = &analysis.cash_flow;
        Self {
            cash_flow_summary: CashFlowSummary {
                net_flow: cash_flow.net_flow,
                total_inflow: cash_flow.total_inflow,
                total_outflow: cash_flow.total_outflow,
            },
            expense_metrics: ExpenseMetrics {
                major_expenses_count: analysis.expenses.major_expenses.len(),
                recurring_expenses_count: analysis.expenses.recurring_expenses.len(),
            },
            income_stability: IncomeStability {
                regular_sources: analysis.income.regular_sources.len(),
                irregular_sources: analysis.income.irregular_sources.len(),
            },
            debt_metrics: DebtMetrics {
                recurring_debt_payments: analysis.debt_credit.recurring_debt_payments.clone(),
                credit_utilization: analysis.debt_credit.credit_utilization.clone(),
                inferred_liability_types: analysis.debt_credit.inferred_liability_types.clone(),
            },
            financial_health_indicators: analysis.financial_health.as_ref().map(|health| {
                HealthIndicators {
                    indicators_count: health.key_indicators.len(),
                    key_findings: health
                        .key_indicators
                        .iter()
                        .map(|indicator| IndicatorFinding {
                            category: indicator.category.clone(),
                            impact: indicator.impact.clone(),
                        })
                        .collect(),
                }
            }),
        }
    }

    /// `- Key: value` lines used in the narrative prompt.
    pub fn prompt_lines(&self) -> Vec<String> {
        let cash = &self.cash_flow_summary;
        let mut lines = vec![
            format!(
                "- Cash Flow Summary: net flow {:.2}, total inflow {:.2}, total outflow {:.2}",
                cash.net_flow, cash.total_inflow, cash.total_outflow
            ),
            format!(
                "- Expense Metrics: {} major expenses, {} recurring expenses",
                self.expense_metrics.major_expenses_count,
                self.expense_metrics.recurring_expenses_count
            ),
            format!(
                "- Income Stability: {} regular sources, {} irregular sources",
                self.income_stability.regular_sources, self.income_stability.irregular_sources
            ),
        ];

        let debt = &self.debt_metrics;
        let mut debt_line = format!(
            "- Debt Metrics: {} recurring debt payments",
            debt.recurring_debt_payments.len()
        );
        if !debt.credit_utilization.is_empty() {
            debt_line.push_str(&format!(", credit utilization {}", debt.credit_utilization));
        }
        if !debt.inferred_liability_types.is_empty() {
            debt_line.push_str(&format!(", liabilities: {}", debt.inferred_liability_types));
        }
        lines.push(debt_line);

        if let Some(health) = &self.financial_health_indicators {
            let findings = health
                .key_findings
                .iter()
                .map(|finding| format!("{} ({})", finding.category, finding.impact))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "- Financial Health Indicators: {} indicators [{}]",
                health.indicators_count, findings
            ));
        }
        lines
    }
}
