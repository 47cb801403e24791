use super::keywords::{
    KeywordTable, CASH_FLOW_KEYWORDS, DEBT_CREDIT_KEYWORDS, EXPENSE_KEYWORDS,
    FINANCIAL_HEALTH_KEYWORDS, INCOME_KEYWORDS,
};
use super::policy::{ExpenseRules, IncomeRules};
use crate::analysis::{CashFlow, DebtCredit, Expenses, FinancialHealth, Income};

/// Split between the rule ladder and the summary scan for one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketRubric {
    pub numeric_weight: f64,
    pub text_weight: f64,
    pub keywords: &'static KeywordTable,
}

impl BucketRubric {
    /// `round(clamp(numeric * Wn + text * Wt, 0, 100))`, ties to even.
    pub fn blend(&self, numeric: f64, summary: &str) -> u8 {
        let text = self.keywords.text_subscore(summary);
        let combined = numeric * self.numeric_weight + text * self.text_weight;
        combined.clamp(0.0, 100.0).round_ties_even() as u8
    }
}

pub const CASH_FLOW_RUBRIC: BucketRubric = BucketRubric {
    numeric_weight: 0.6,
    text_weight: 0.4,
    keywords: &CASH_FLOW_KEYWORDS,
};

pub const EXPENSE_RUBRIC: BucketRubric = BucketRubric {
    numeric_weight: 0.7,
    text_weight: 0.3,
    keywords: &EXPENSE_KEYWORDS,
};

pub const INCOME_RUBRIC: BucketRubric = BucketRubric {
    numeric_weight: 0.65,
    text_weight: 0.35,
    keywords: &INCOME_KEYWORDS,
};

pub const DEBT_CREDIT_RUBRIC: BucketRubric = BucketRubric {
    numeric_weight: 0.75,
    text_weight: 0.25,
    keywords: &DEBT_CREDIT_KEYWORDS,
};

pub const FINANCIAL_HEALTH_RUBRIC: BucketRubric = BucketRubric {
    numeric_weight: 0.7,
    text_weight: 0.3,
    keywords: &FINANCIAL_HEALTH_KEYWORDS,
};

const CRITICAL_BALANCE: f64 = 500.0;

pub fn cash_flow_numeric(cash_flow: &CashFlow) -> f64 {
    let CashFlow {
        total_inflow: inflow,
        total_outflow: outflow,
        net_flow,
        beginning_balance: beginning,
        ending_balance: ending,
        ..
    } = *cash_flow;

    if beginning < CRITICAL_BALANCE || ending < CRITICAL_BALANCE {
        return 30.0;
    }
    if net_flow > 0.0 && (ending < net_flow * 0.2 || beginning < net_flow * 0.2) {
        return 35.0;
    }
    if inflow == 0.0 {
        return if outflow == 0.0 { 50.0 } else { 30.0 };
    }

    let net_ratio = net_flow / inflow;
    let ladder = if net_flow < -1000.0 {
        20.0
    } else if net_ratio < -0.2 {
        30.0
    } else if net_ratio < -0.1 {
        40.0
    } else if net_ratio < 0.0 {
        (50.0 + 50.0 * net_ratio).max(20.0)
    } else if net_ratio < 0.05 {
        55.0
    } else if net_ratio < 0.1 {
        65.0
    } else if net_ratio < 0.2 {
        75.0
    } else {
        // 0.2..0.3 and above 0.3 share the top tier.
        85.0
    };

    if ending < beginning * 0.8 {
        (ladder - 20.0).max(30.0)
    } else if ending > beginning * 1.2 {
        (ladder + 10.0).min(95.0)
    } else {
        ladder
    }
}

pub fn score_cash_flow(cash_flow: &CashFlow) -> u8 {
    CASH_FLOW_RUBRIC.blend(cash_flow_numeric(cash_flow), &cash_flow.summary)
}

pub fn expenses_numeric(expenses: &Expenses, rules: &ExpenseRules) -> f64 {
    let major_total = expenses.major_total();
    let recurring_total = expenses.recurring_total();
    let major_count = expenses.major_expenses.len();
    let recurring_count = expenses.recurring_expenses.len();

    if major_total + recurring_total == 0.0 {
        rules.empty_score
    } else if major_count > 3 && recurring_count > 8 {
        45.0
    } else if major_total > recurring_total * 2.0 {
        55.0
    } else if recurring_count > 8 {
        60.0
    } else {
        70.0
    }
}

pub fn score_expenses(expenses: &Expenses, rules: &ExpenseRules) -> u8 {
    EXPENSE_RUBRIC.blend(expenses_numeric(expenses, rules), &expenses.summary)
}

pub fn income_numeric(income: &Income, rules: &IncomeRules) -> f64 {
    let regular_total = income.regular_total();
    let irregular_total = income.irregular_total();
    let regular_count = income.regular_sources.len();

    if regular_total + irregular_total == 0.0 {
        return 50.0;
    }
    if regular_count >= 2 && irregular_total < 0.2 * regular_total {
        return 90.0;
    }
    if regular_count == 1 && irregular_total < 0.3 * regular_total {
        return 80.0;
    }
    match rules.mostly_irregular_score {
        Some(score) if irregular_total > regular_total => score,
        _ => 65.0,
    }
}

pub fn score_income(income: &Income, rules: &IncomeRules) -> u8 {
    INCOME_RUBRIC.blend(income_numeric(income, rules), &income.summary)
}

/// Ladder on the reported utilization; unreadable text counts as zero.
pub fn utilization_numeric(debt: &DebtCredit) -> f64 {
    let utilization = debt.utilization_fraction().unwrap_or(0.0);
    if utilization > 0.7 {
        30.0
    } else if utilization > 0.5 {
        45.0
    } else if utilization > 0.3 {
        60.0
    } else if utilization > 0.1 {
        75.0
    } else {
        85.0
    }
}

pub fn score_debt_by_utilization(debt: &DebtCredit) -> u8 {
    DEBT_CREDIT_RUBRIC.blend(utilization_numeric(debt), &debt.summary)
}

const MORTGAGE_MARKERS: &[&str] = &["mortgage", "home loan", "heloc"];
const AUTO_MARKERS: &[&str] = &["auto", "vehicle", "car loan", "car payment"];

/// Score from the count and kind of inferred liabilities.
pub fn liability_numeric(debt: &DebtCredit) -> f64 {
    let types = debt.liability_types();
    if types.is_empty() {
        return 85.0;
    }
    if types.len() > 4 {
        return 45.0;
    }

    let has = |markers: &[&str]| {
        types
            .iter()
            .any(|kind| markers.iter().any(|marker| kind.contains(marker)))
    };

    let mut score: f64 = 65.0;
    if has(MORTGAGE_MARKERS) {
        score += 5.0;
    }
    if has(AUTO_MARKERS) && types.len() <= 2 {
        score += 3.0;
    }
    score.clamp(30.0, 90.0)
}

pub fn score_debt_by_liabilities(debt: &DebtCredit) -> u8 {
    DEBT_CREDIT_RUBRIC.blend(liability_numeric(debt), &debt.summary)
}

pub fn financial_health_numeric(health: &FinancialHealth) -> f64 {
    let indicators = &health.key_indicators;
    let impact_count = |impact: &str| {
        indicators
            .iter()
            .filter(|indicator| indicator.impact.eq_ignore_ascii_case(impact))
            .count()
    };
    let positive_count = impact_count("positive");
    let negative_count = impact_count("negative");
    let savings_count = indicators
        .iter()
        .filter(|indicator| indicator.category.to_lowercase().contains("saving"))
        .count();

    let positive_ratio = positive_count as f64 / indicators.len().max(1) as f64;

    if negative_count > positive_count * 2 {
        40.0
    } else if negative_count > positive_count {
        55.0
    } else if savings_count >= 2 && positive_ratio > 0.6 {
        90.0
    } else if positive_ratio > 0.7 {
        85.0
    } else if positive_ratio > 0.5 {
        75.0
    } else {
        65.0
    }
}

pub fn score_financial_health(health: &FinancialHealth) -> u8 {
    FINANCIAL_HEALTH_RUBRIC.blend(financial_health_numeric(health), &health.summary)
}
