use super::domain::{
    CashFlow, DebtCredit, Expenses, FinancialAnalysis, FinancialHealth, Income, IncomeSource,
    KeyIndicator, LineItem,
};
use serde_json::Value;

/// Neutral value substituted for unreadable numeric fields.
pub const NEUTRAL_NUMBER: f64 = 50.0;

/// Section names accepted for each bucket, prompt schema first.
const CASH_FLOW_SECTIONS: &[&str] = &["Cash Flow Analysis", "cash_flow", "Cash Flow"];
const EXPENSE_SECTIONS: &[&str] = &["Expense Analysis", "expenses", "Expenses"];
const INCOME_SECTIONS: &[&str] = &["Income Analysis", "income", "Income"];
const DEBT_SECTIONS: &[&str] = &[
    "Debt and Credit",
    "debt_credit",
    "Debt and Credit Analysis",
];
const HEALTH_SECTIONS: &[&str] = &[
    "Financial Health Indicators",
    "financial_health",
    "Financial Health",
];

pub(crate) fn build_analysis(root: &Value) -> FinancialAnalysis {
    FinancialAnalysis {
        cash_flow: cash_flow(root),
        expenses: expenses(root),
        income: income(root),
        debt_credit: debt_credit(root),
        financial_health: Some(financial_health(root)),
    }
}

fn cash_flow(root: &Value) -> CashFlow {
    let field = |names: &[&str]| lookup(root, CASH_FLOW_SECTIONS, names);

    let total_inflow = safe_float(field(&["total_inflows", "total_inflow"]), NEUTRAL_NUMBER);
    let total_outflow = safe_float(field(&["total_outflows", "total_outflow"]), NEUTRAL_NUMBER);
    let net_flow = match field(&["net_flow"]) {
        Some(value @ (Value::Number(_) | Value::String(_))) => {
            safe_float(Some(value), total_inflow - total_outflow)
        }
        _ => total_inflow - total_outflow,
    };

    CashFlow {
        total_inflow,
        total_outflow,
        net_flow,
        beginning_balance: safe_float(field(&["beginning_balance"]), NEUTRAL_NUMBER),
        ending_balance: safe_float(field(&["ending_balance"]), NEUTRAL_NUMBER),
        summary: text(field(&["summary"])),
    }
}

fn expenses(root: &Value) -> Expenses {
    let field = |names: &[&str]| lookup(root, EXPENSE_SECTIONS, names);
    Expenses {
        major_expenses: line_items(field(&["major_expenses"]), &["amount", "total_amount"]),
        recurring_expenses: line_items(
            field(&["recurring_expenses"]),
            &["amount", "total_amount"],
        ),
        summary: text(field(&["summary"])),
    }
}

fn income(root: &Value) -> Income {
    let field = |names: &[&str]| lookup(root, INCOME_SECTIONS, names);

    let regular_sources = line_items(
        field(&["regular_income_sources", "regular_sources"]),
        &["total_amount", "amount"],
    )
    .into_iter()
    .map(|item| IncomeSource {
        description: item.description,
        total_amount: item.amount,
    })
    .collect();

    Income {
        regular_sources,
        irregular_sources: line_items(
            field(&["additional_irregular_income", "irregular_sources"]),
            &["amount", "total_amount"],
        ),
        summary: text(field(&["summary"])),
    }
}

fn debt_credit(root: &Value) -> DebtCredit {
    let field = |names: &[&str]| lookup(root, DEBT_SECTIONS, names);

    let credit_utilization = match field(&["credit_utilization"]) {
        Some(Value::Number(number)) => match number.as_f64() {
            Some(fraction) if fraction <= 1.0 => format!("{}%", fraction * 100.0),
            Some(percent) => format!("{percent}%"),
            None => String::new(),
        },
        other => text(other),
    };

    let inferred_liability_types = match field(&["inferred_liability_types"]) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => text(other),
    };

    DebtCredit {
        recurring_debt_payments: line_items(
            field(&[
                "recurring_debt_payments",
                "outstanding_debt_payments",
                "outstanding_debt",
            ]),
            &["amount", "total_amount"],
        ),
        inferred_liability_types,
        credit_utilization,
        summary: text(field(&["summary"])),
    }
}

/// An absent section yields no indicators and an empty summary.
fn financial_health(root: &Value) -> FinancialHealth {
    let field = |names: &[&str]| lookup(root, HEALTH_SECTIONS, names);

    let key_indicators = match field(&["key_indicators"]) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter(|entry| entry.is_object())
            .map(|entry| KeyIndicator {
                category: text(entry.get("category")),
                observation: text(entry.get("observation")),
                impact: text(entry.get("impact")),
            })
            .collect(),
        _ => Vec::new(),
    };

    FinancialHealth {
        key_indicators,
        summary: text(field(&["summary"])),
    }
}

/// First non-empty section object among `sections`.
fn section<'a>(root: &'a Value, sections: &[&str]) -> Option<&'a Value> {
    sections
        .iter()
        .filter_map(|name| root.get(*name))
        .find(|value| value.as_object().is_some_and(|map| !map.is_empty()))
}

/// Nested lookup that treats absent keys, `null`, empty objects and
/// non-object intermediates as missing.
pub(crate) fn lookup<'a>(root: &'a Value, sections: &[&str], fields: &[&str]) -> Option<&'a Value> {
    let section = section(root, sections)?;
    fields
        .iter()
        .filter_map(|name| section.get(*name))
        .find(|value| !is_blank(value))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Numeric coercion with a neutral default.
///
/// JSON numbers pass through unchanged, zero included. Strings are parsed
/// after removing `"`; a failed parse and a parsed zero both yield `default`,
/// because upstream models emit `"0"` as a placeholder.
pub fn safe_float(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(default),
        Some(Value::String(raw)) => match raw.replace('"', "").trim().parse::<f64>() {
            Ok(parsed) if parsed != 0.0 && parsed.is_finite() => parsed,
            _ => default,
        },
        _ => default,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn line_items(value: Option<&Value>, amount_keys: &[&str]) -> Vec<LineItem> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| {
            let amount = amount_keys
                .iter()
                .filter_map(|key| entry.get(*key))
                .find(|value| !value.is_null());
            LineItem {
                description: text(entry.get("description")),
                amount: safe_float(amount, 0.0),
            }
        })
        .collect()
}
