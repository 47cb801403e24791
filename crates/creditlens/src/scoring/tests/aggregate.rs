use std::sync::Arc;

use super::common::*;
use crate::analysis::{Bucket, FinancialAnalysis};
use crate::scoring::{
    Flag, PolicyKind, ScoringEngine, ScoringError, Severity, UtilizationPolicy,
};

fn kinds(flags: &[Flag]) -> Vec<&str> {
    flags.iter().map(|flag| flag.kind.as_str()).collect()
}

#[test]
fn canonical_engine_weighs_four_buckets() {
    let result = ScoringEngine::canonical()
        .calculate_score(&sample_analysis())
        .expect("liability policy scores without health bucket");

    assert_eq!(result.policy, "liability-v2");
    assert_eq!(
        result.component_scores.iter().map(|(b, s)| (*b, *s)).collect::<Vec<_>>(),
        vec![
            (Bucket::CashFlow, 87),
            (Bucket::Expenses, 62),
            (Bucket::Income, 78),
            (Bucket::DebtCredit, 69),
        ]
    );
    assert!((result.final_score - 75.7).abs() < 1e-9, "{}", result.final_score);
    assert_eq!(kinds(&result.flags), vec!["large_expenses"]);
    assert_eq!(result.flags[0].message, "Large expenses detected: 1 transactions");
}

#[test]
fn utilization_engine_weighs_five_buckets_and_flags_utilization() {
    let result = ScoringEngine::for_kind(PolicyKind::Utilization)
        .calculate_score(&sample_with_health())
        .expect("health bucket present");

    assert_eq!(result.policy, "utilization-v1");
    assert_eq!(result.score_of(Bucket::DebtCredit), Some(63));
    assert_eq!(result.score_of(Bucket::FinancialHealth), Some(88));
    assert!((result.final_score - 76.3).abs() < 1e-9, "{}", result.final_score);
    assert_eq!(
        kinds(&result.flags),
        vec!["high_credit_utilization", "large_expenses"]
    );
    assert_eq!(result.flags[0].severity, Severity::High);
    assert_eq!(result.flags[0].message, "High credit utilization at 45.0%");
}

#[test]
fn utilization_flag_is_skipped_for_non_numeric_text() {
    let mut analysis = sample_with_health();
    analysis.debt_credit.credit_utilization = "N/A".to_string();

    let result = ScoringEngine::new(Arc::new(UtilizationPolicy::new()))
        .calculate_score(&analysis)
        .expect("scores");
    assert!(!kinds(&result.flags).contains(&"high_credit_utilization"));
}

#[test]
fn missing_required_bucket_is_an_error() {
    let err = ScoringEngine::for_kind(PolicyKind::Utilization)
        .calculate_score(&sample_analysis())
        .expect_err("health bucket missing");

    assert_eq!(
        err,
        ScoringError::MissingBucket {
            policy: "utilization-v1",
            bucket: "financial_health",
        }
    );
}

#[test]
fn low_score_flag_threshold_is_exclusive() {
    let engine = ScoringEngine::new(Arc::new(FixedScorePolicy::new(&[
        (Bucket::CashFlow, 59),
        (Bucket::Expenses, 60),
        (Bucket::Income, 80),
        (Bucket::DebtCredit, 45),
    ])));
    let mut analysis = sample_analysis();
    analysis.expenses.major_expenses.clear();

    let result = engine.calculate_score(&analysis).expect("scores");

    assert_eq!(
        kinds(&result.flags),
        vec!["low_cash_flow_score", "low_debt_credit_score"]
    );
    assert_eq!(result.flags[0].severity, Severity::Warning);
    assert_eq!(result.flags[0].message, "Low cash flow score of 59");
    assert_eq!(result.flags[1].message, "Low debt credit score of 45");
}

#[test]
fn negative_cash_flow_is_flagged_before_expenses() {
    let mut analysis = sample_analysis();
    analysis.cash_flow = cash_flow(4000.0, 4250.0, -250.0, 3000.0, 2750.0, "");

    let result = ScoringEngine::canonical()
        .calculate_score(&analysis)
        .expect("scores");
    let negative = result
        .flags
        .iter()
        .find(|flag| flag.kind == "negative_cash_flow")
        .expect("negative cash flow flagged");

    assert_eq!(negative.severity, Severity::High);
    assert_eq!(negative.message, "Negative cash flow detected: $-250.00");
    assert_eq!(kinds(&result.flags).last(), Some(&"large_expenses"));
}

#[test]
fn fallback_record_scores_deterministically() {
    let engine = ScoringEngine::for_kind(PolicyKind::Utilization);
    let first = engine
        .calculate_score(&FinancialAnalysis::fallback())
        .expect("fallback carries every bucket");
    let second = engine
        .calculate_score(&FinancialAnalysis::fallback())
        .expect("fallback carries every bucket");

    assert_eq!(first, second);
    assert!((0.0..=100.0).contains(&first.final_score));
    assert!(first.component_scores.values().all(|score| *score <= 100));
}

#[test]
fn final_score_is_rounded_to_cents() {
    let engine = ScoringEngine::new(Arc::new(FixedScorePolicy::new(&[
        (Bucket::CashFlow, 73),
        (Bucket::Expenses, 61),
        (Bucket::Income, 67),
        (Bucket::DebtCredit, 71),
    ])));
    let result = engine.calculate_score(&sample_analysis()).expect("scores");

    // 21.9 + 12.2 + 20.1 + 14.2
    assert!((result.final_score - 68.4).abs() < 1e-9);
    assert_eq!(result.final_score, (result.final_score * 100.0).round() / 100.0);
}

#[test]
fn metrics_project_the_analysis() {
    let result = ScoringEngine::for_kind(PolicyKind::Utilization)
        .calculate_score(&sample_with_health())
        .expect("scores");
    let metrics = &result.metrics;

    assert_eq!(metrics.cash_flow_summary.net_flow, 2000.0);
    assert_eq!(metrics.expense_metrics.major_expenses_count, 1);
    assert_eq!(metrics.expense_metrics.recurring_expenses_count, 2);
    assert_eq!(metrics.income_stability.regular_sources, 1);
    assert_eq!(metrics.debt_metrics.credit_utilization, "45%");
    let health = metrics
        .financial_health_indicators
        .as_ref()
        .expect("health metrics present");
    assert_eq!(health.indicators_count, 3);
    assert_eq!(health.key_findings[2].impact, "negative");

    let canonical = ScoringEngine::canonical()
        .calculate_score(&sample_analysis())
        .expect("scores");
    assert!(canonical.metrics.financial_health_indicators.is_none());
}
