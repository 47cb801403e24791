use serde::{Deserialize, Serialize};

/// Summary text attached to every bucket of the fallback record.
pub const FALLBACK_SUMMARY: &str = "Analysis failed";

/// Fixed financial categories scored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    CashFlow,
    Expenses,
    Income,
    DebtCredit,
    FinancialHealth,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::CashFlow => "cash_flow",
            Bucket::Expenses => "expenses",
            Bucket::Income => "income",
            Bucket::DebtCredit => "debt_credit",
            Bucket::FinancialHealth => "financial_health",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::CashFlow => "cash flow",
            Bucket::Expenses => "expenses",
            Bucket::Income => "income",
            Bucket::DebtCredit => "debt credit",
            Bucket::FinancialHealth => "financial health",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Bucket::CashFlow => "Cash Flow",
            Bucket::Expenses => "Expenses",
            Bucket::Income => "Income",
            Bucket::DebtCredit => "Debt Credit",
            Bucket::FinancialHealth => "Financial Health",
        }
    }
}

/// Canonical record consumed by every scoring function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysis {
    pub cash_flow: CashFlow,
    pub expenses: Expenses,
    pub income: Income,
    pub debt_credit: DebtCredit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_health: Option<FinancialHealth>,
}

impl FinancialAnalysis {
    /// Score-neutral record substituted when the upstream payload cannot be recovered.
    pub fn fallback() -> Self {
        Self {
            cash_flow: CashFlow {
                total_inflow: 50.0,
                total_outflow: 50.0,
                net_flow: 0.0,
                beginning_balance: 50.0,
                ending_balance: 50.0,
                summary: FALLBACK_SUMMARY.to_string(),
            },
            expenses: Expenses {
                major_expenses: Vec::new(),
                recurring_expenses: Vec::new(),
                summary: FALLBACK_SUMMARY.to_string(),
            },
            income: Income {
                regular_sources: Vec::new(),
                irregular_sources: Vec::new(),
                summary: FALLBACK_SUMMARY.to_string(),
            },
            debt_credit: DebtCredit {
                recurring_debt_payments: Vec::new(),
                inferred_liability_types: String::new(),
                credit_utilization: "N/A".to_string(),
                summary: FALLBACK_SUMMARY.to_string(),
            },
            financial_health: Some(FinancialHealth {
                key_indicators: Vec::new(),
                summary: FALLBACK_SUMMARY.to_string(),
            }),
        }
    }

    pub fn summary_for(&self, bucket: Bucket) -> Option<&str> {
        match bucket {
            Bucket::CashFlow => Some(&self.cash_flow.summary),
            Bucket::Expenses => Some(&self.expenses.summary),
            Bucket::Income => Some(&self.income.summary),
            Bucket::DebtCredit => Some(&self.debt_credit.summary),
            Bucket::FinancialHealth => self
                .financial_health
                .as_ref()
                .map(|health| health.summary.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub net_flow: f64,
    pub beginning_balance: f64,
    pub ending_balance: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expenses {
    pub major_expenses: Vec<LineItem>,
    pub recurring_expenses: Vec<LineItem>,
    pub summary: String,
}

impl Expenses {
    pub fn major_total(&self) -> f64 {
        self.major_expenses.iter().map(|item| item.amount).sum()
    }

    pub fn recurring_total(&self) -> f64 {
        self.recurring_expenses.iter().map(|item| item.amount).sum()
    }
}

/// Income source reported with its period total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub description: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub regular_sources: Vec<IncomeSource>,
    pub irregular_sources: Vec<LineItem>,
    pub summary: String,
}

impl Income {
    pub fn regular_total(&self) -> f64 {
        self.regular_sources
            .iter()
            .map(|source| source.total_amount)
            .sum()
    }

    pub fn irregular_total(&self) -> f64 {
        self.irregular_sources.iter().map(|item| item.amount).sum()
    }
}

/// Debt and credit bucket.
///
/// Carries the fields of both payload schemas; the active scoring policy
/// decides whether `credit_utilization` or `inferred_liability_types` is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtCredit {
    pub recurring_debt_payments: Vec<LineItem>,
    pub inferred_liability_types: String,
    pub credit_utilization: String,
    pub summary: String,
}

impl DebtCredit {
    /// Utilization as a fraction, `None` when the text is not numeric.
    ///
    /// `"45%"` and `"45"` both read as 0.45.
    pub fn utilization_fraction(&self) -> Option<f64> {
        let trimmed = self.credit_utilization.trim();
        let number = trimmed.trim_end_matches('%').trim();
        number
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value / 100.0)
    }

    /// Liability types split from the free-text field, lowercased.
    pub fn liability_types(&self) -> Vec<String> {
        self.inferred_liability_types
            .split([',', ';', '\n'])
            .flat_map(|part| part.split(" and "))
            .map(|part| part.trim().to_lowercase())
            .filter(|part| !part.is_empty() && !is_placeholder(part))
            .collect()
    }
}

fn is_placeholder(value: &str) -> bool {
    matches!(value, "none" | "n/a" | "na" | "unknown" | "-")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyIndicator {
    pub category: String,
    pub observation: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealth {
    pub key_indicators: Vec<KeyIndicator>,
    pub summary: String,
}
