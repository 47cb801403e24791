use crate::scoring::PolicyKind;

const FOCUS_COMMON: &str = "\
1. Cash Flow Analysis:
- Total inflows and outflows
- Beginning and ending balance
- Overall cash flow health

2. Expense Analysis:
- Major expenses (over $500)
- Recurring expenses
- Expense categories breakdown

3. Income Analysis:
- Regular income sources
- Additional/irregular income
- Income stability
";

const FOCUS_LIABILITY: &str = "
4. Debt and Credit:
- Recurring debt payments
- The kinds of liabilities those payments imply (mortgage, auto loan, credit card, student loan, ...)
";

const FOCUS_UTILIZATION: &str = "
4. Debt and Credit:
- Outstanding debt payments
- Credit utilization
- Payment patterns

5. Financial Health Indicators:
- Financial stability and trends
- Risk factors
- Areas of strength or concern
";

const SCHEMA_COMMON: &str = r#"    "Cash Flow Analysis": {
        "total_inflows": <float>,
        "total_outflows": <float>,
        "beginning_balance": <float>,
        "ending_balance": <float>,
        "summary": <string>
    },
    "Expense Analysis": {
        "major_expenses": [{"description": <string>, "amount": <float>}],
        "recurring_expenses": [{"description": <string>, "amount": <float>}],
        "summary": <string>
    },
    "Income Analysis": {
        "regular_income_sources": [{"description": <string>, "total_amount": <float>}],
        "additional_irregular_income": [{"description": <string>, "amount": <float>}],
        "summary": <string>
    },"#;

const SCHEMA_LIABILITY: &str = r#"
    "Debt and Credit": {
        "recurring_debt_payments": [{"description": <string>, "amount": <float>}],
        "inferred_liability_types": <string, comma separated>,
        "summary": <string>
    }"#;

const SCHEMA_UTILIZATION: &str = r#"
    "Debt and Credit": {
        "outstanding_debt_payments": [{"description": <string>, "amount": <float>}],
        "credit_utilization": <string, percent>,
        "summary": <string>
    },
    "Financial Health Indicators": {
        "key_indicators": [{"category": <string>, "observation": <string>, "impact": "positive" | "negative" | "neutral"}],
        "summary": <string>
    }"#;

/// Extraction prompt whose JSON schema matches what `policy` scores.
pub fn analysis_prompt(document_content: &str, policy: PolicyKind) -> String {
    let (focus, schema) = match policy {
        PolicyKind::Liability => (FOCUS_LIABILITY, SCHEMA_LIABILITY),
        PolicyKind::Utilization => (FOCUS_UTILIZATION, SCHEMA_UTILIZATION),
    };
    format!(
        "As a financial analyst, analyze this bank statement data and provide a structured analysis. Focus on:\n\n\
         {FOCUS_COMMON}{focus}\n\
         Statement Data:\n{document_content}\n\n\
         Please provide your analysis in exactly this JSON structure:\n\n\
         {{\n{SCHEMA_COMMON}{schema}\n}}\n\n\
         Use plain numbers without arithmetic or currency symbols, and populate every field."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_schema_follows_policy() {
        let liability = analysis_prompt("STATEMENT BODY", PolicyKind::Liability);
        assert!(liability.contains("STATEMENT BODY"));
        assert!(liability.contains("inferred_liability_types"));
        assert!(!liability.contains("Financial Health Indicators"));

        let utilization = analysis_prompt("STATEMENT BODY", PolicyKind::Utilization);
        assert!(utilization.contains("credit_utilization"));
        assert!(utilization.contains("\"Financial Health Indicators\": {"));
        assert!(!utilization.contains("inferred_liability_types"));
    }
}
