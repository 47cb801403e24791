//! Loan-decision report assembled from scores, flags, metrics and narrative.

mod narrative;
mod status;
mod views;

pub use narrative::{narrative_prompt, ComponentNarrative, Narrative};
pub use status::{HealthTier, LoanDecision, StatusBand, StatusBands, UNDEFINED_STATUS};
pub use views::{
    CashFlowView, ComponentDetails, ComponentReport, DebtAndSavings, DetailedAnalysis,
    ExpenseBreakdown, IncomeSourcesView, Recommendations, Report, ReportMetrics, ReportSummary,
};

use chrono::{DateTime, Utc};

use crate::analysis::{Bucket, FinancialAnalysis};
use crate::scoring::ScoringResult;

/// Packages computed results with the externally written narrative.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    bands: StatusBands,
}

impl ReportAssembler {
    pub fn new(bands: StatusBands) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &StatusBands {
        &self.bands
    }

    pub fn assemble(
        &self,
        analysis: &FinancialAnalysis,
        scoring: &ScoringResult,
        narrative: &Narrative,
    ) -> Report {
        self.assemble_at(analysis, scoring, narrative, Utc::now())
    }

    pub fn assemble_at(
        &self,
        analysis: &FinancialAnalysis,
        scoring: &ScoringResult,
        narrative: &Narrative,
        generated_at: DateTime<Utc>,
    ) -> Report {
        let band = self.bands.classify(scoring.final_score);
        let health_status = self.bands.describe(scoring.final_score);
        let key_findings = if narrative.summary.is_empty() {
            format!("Overall score {:.2} ({health_status})", scoring.final_score)
        } else {
            narrative.summary.clone()
        };

        let components = scoring
            .component_scores
            .iter()
            .filter_map(|(bucket, score)| {
                let details = component_details(*bucket, analysis)?;
                let commentary = narrative.component(*bucket).cloned().unwrap_or_default();
                Some((
                    *bucket,
                    ComponentReport {
                        score: *score,
                        status: self.bands.describe(f64::from(*score)),
                        summary: analysis.summary_for(*bucket).unwrap_or_default().to_string(),
                        details,
                        strengths: commentary.strengths,
                        concerns: commentary.concerns,
                    },
                ))
            })
            .collect();

        let metrics = &scoring.metrics;
        Report {
            summary: ReportSummary {
                overall_score: scoring.final_score,
                health_status,
                decision: band.map(|band| band.decision),
                key_findings,
            },
            detailed_analysis: DetailedAnalysis {
                components,
                narrative: narrative.analysis.clone(),
            },
            recommendations: Recommendations {
                immediate_actions: narrative.recommendations.clone(),
                flags: scoring.flags.clone(),
            },
            metrics: ReportMetrics {
                cash_flow: CashFlowView {
                    net_monthly_flow: metrics.cash_flow_summary.net_flow,
                    income: metrics.cash_flow_summary.total_inflow,
                    expenses: metrics.cash_flow_summary.total_outflow,
                },
                expense_breakdown: ExpenseBreakdown {
                    major_expenses: metrics.expense_metrics.major_expenses_count,
                    recurring_expenses: metrics.expense_metrics.recurring_expenses_count,
                },
                income_sources: IncomeSourcesView {
                    regular: metrics.income_stability.regular_sources,
                    irregular: metrics.income_stability.irregular_sources,
                },
                debt_and_savings: DebtAndSavings {
                    credit_utilization: metrics.debt_metrics.credit_utilization.clone(),
                    outstanding_debt: metrics.debt_metrics.recurring_debt_payments.clone(),
                    liability_types: metrics.debt_metrics.inferred_liability_types.clone(),
                    financial_indicators: metrics
                        .financial_health_indicators
                        .as_ref()
                        .map(|health| health.key_findings.clone())
                        .unwrap_or_default(),
                },
            },
            raw_scores: scoring.component_scores.clone(),
            policy: scoring.policy.clone(),
            generated_at,
        }
    }
}

fn component_details(bucket: Bucket, analysis: &FinancialAnalysis) -> Option<ComponentDetails> {
    let details = match bucket {
        Bucket::CashFlow => {
            let cash = &analysis.cash_flow;
            ComponentDetails::CashFlow {
                net_flow: cash.net_flow,
                total_inflow: cash.total_inflow,
                total_outflow: cash.total_outflow,
                beginning_balance: cash.beginning_balance,
                ending_balance: cash.ending_balance,
            }
        }
        Bucket::Expenses => ComponentDetails::Expenses {
            major_expenses: analysis.expenses.major_expenses.clone(),
            recurring_expenses: analysis.expenses.recurring_expenses.clone(),
        },
        Bucket::Income => ComponentDetails::Income {
            regular_sources: analysis.income.regular_sources.clone(),
            irregular_sources: analysis.income.irregular_sources.clone(),
        },
        Bucket::DebtCredit => ComponentDetails::DebtCredit {
            recurring_debt_payments: analysis.debt_credit.recurring_debt_payments.clone(),
            credit_utilization: analysis.debt_credit.credit_utilization.clone(),
            inferred_liability_types: analysis.debt_credit.inferred_liability_types.clone(),
        },
        Bucket::FinancialHealth => ComponentDetails::FinancialHealth {
            key_indicators: analysis.financial_health.as_ref()?.key_indicators.clone(),
        },
    };
    Some(details)
}
