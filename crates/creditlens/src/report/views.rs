use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::status::LoanDecision;
use crate::analysis::{Bucket, IncomeSource, KeyIndicator, LineItem};
use crate::scoring::{ComponentScores, Flag, IndicatorFinding};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub detailed_analysis: DetailedAnalysis,
    pub recommendations: Recommendations,
    pub metrics: ReportMetrics,
    pub raw_scores: ComponentScores,
    pub policy: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub overall_score: f64,
    pub health_status: String,
    pub decision: Option<LoanDecision>,
    pub key_findings: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedAnalysis {
    pub components: BTreeMap<Bucket, ComponentReport>,
    pub narrative: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentReport {
    pub score: u8,
    pub status: String,
    pub summary: String,
    pub details: ComponentDetails,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

/// Bucket-specific figures shown next to a component score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComponentDetails {
    CashFlow {
        net_flow: f64,
        total_inflow: f64,
        total_outflow: f64,
        beginning_balance: f64,
        ending_balance: f64,
    },
    Expenses {
        major_expenses: Vec<LineItem>,
        recurring_expenses: Vec<LineItem>,
    },
    Income {
        regular_sources: Vec<IncomeSource>,
        irregular_sources: Vec<LineItem>,
    },
    DebtCredit {
        recurring_debt_payments: Vec<LineItem>,
        credit_utilization: String,
        inferred_liability_types: String,
    },
    FinancialHealth {
        key_indicators: Vec<KeyIndicator>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub immediate_actions: Vec<String>,
    pub flags: Vec<Flag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetrics {
    pub cash_flow: CashFlowView,
    pub expense_breakdown: ExpenseBreakdown,
    pub income_sources: IncomeSourcesView,
    pub debt_and_savings: DebtAndSavings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CashFlowView {
    pub net_monthly_flow: f64,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpenseBreakdown {
    pub major_expenses: usize,
    pub recurring_expenses: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncomeSourcesView {
    pub regular: usize,
    pub irregular: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtAndSavings {
    pub credit_utilization: String,
    pub outstanding_debt: Vec<LineItem>,
    pub liability_types: String,
    pub financial_indicators: Vec<IndicatorFinding>,
}
