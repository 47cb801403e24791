use super::common::*;
use crate::scoring::buckets::{
    cash_flow_numeric, expenses_numeric, financial_health_numeric, income_numeric,
    liability_numeric, score_cash_flow, score_debt_by_liabilities, score_debt_by_utilization,
    score_expenses, score_financial_health, score_income, utilization_numeric,
};
use crate::scoring::{IncomeRules, LiabilityPolicy, UtilizationPolicy};

#[test]
fn cash_flow_surplus_with_growing_balance_scores_87() {
    let flow = cash_flow(5000.0, 3000.0, 2000.0, 4000.0, 6000.0, "stable and healthy");

    assert_eq!(cash_flow_numeric(&flow), 95.0);
    assert_eq!(score_cash_flow(&flow), 87);
}

#[test]
fn cash_flow_balance_floor_is_strictly_below_500() {
    let below = cash_flow(5000.0, 3000.0, 2000.0, 499.0, 6000.0, "stable and healthy");
    let at = cash_flow(5000.0, 3000.0, 2000.0, 500.0, 6000.0, "stable and healthy");

    assert_eq!(cash_flow_numeric(&below), 30.0);
    assert_eq!(cash_flow_numeric(&at), 95.0);

    let low_ending = cash_flow(5000.0, 3000.0, 2000.0, 4000.0, 120.0, "");
    assert_eq!(cash_flow_numeric(&low_ending), 30.0);
}

#[test]
fn cash_flow_thin_balance_against_net_flow() {
    // Balances clear the floor but sit under a fifth of a large surplus.
    let flow = cash_flow(20_000.0, 5_000.0, 15_000.0, 2_500.0, 2_600.0, "");
    assert_eq!(cash_flow_numeric(&flow), 35.0);
}

#[test]
fn cash_flow_without_inflow() {
    assert_eq!(cash_flow_numeric(&cash_flow(0.0, 0.0, 0.0, 900.0, 900.0, "")), 50.0);
    assert_eq!(cash_flow_numeric(&cash_flow(0.0, 400.0, -400.0, 900.0, 900.0, "")), 30.0);
}

#[test]
fn cash_flow_ladder_is_monotonic_in_net_ratio() {
    let ratios = [
        -0.55, -0.3, -0.2, -0.15, -0.1, -0.05, 0.0, 0.03, 0.05, 0.08, 0.1, 0.15, 0.2, 0.25, 0.3,
        0.45,
    ];
    let scores: Vec<f64> = ratios
        .iter()
        .map(|ratio| cash_flow_numeric(&cash_flow_with_ratio(*ratio)))
        .collect();

    for pair in scores.windows(2) {
        assert!(pair[0] <= pair[1], "ladder decreased: {scores:?}");
    }
    assert_eq!(cash_flow_numeric(&cash_flow_with_ratio(-0.05)), 47.5);
    assert_eq!(cash_flow_numeric(&cash_flow_with_ratio(0.15)), 75.0);
    assert_eq!(cash_flow_numeric(&cash_flow_with_ratio(0.45)), 85.0);
}

#[test]
fn cash_flow_large_deficit_hits_bottom_tier() {
    let flow = cash_flow(10_000.0, 11_500.0, -1_500.0, 5_000.0, 5_000.0, "");
    assert_eq!(cash_flow_numeric(&flow), 20.0);
}

#[test]
fn cash_flow_trend_adjusts_ladder() {
    // Ratio 0.15 sits in the 75 tier before the trend adjustment.
    let shrinking = cash_flow(1000.0, 850.0, 150.0, 5000.0, 3900.0, "");
    assert_eq!(cash_flow_numeric(&shrinking), 55.0);

    let growing = cash_flow(1000.0, 850.0, 150.0, 5000.0, 6100.0, "");
    assert_eq!(cash_flow_numeric(&growing), 85.0);
}

#[test]
fn expenses_ladder() {
    let rules = LiabilityPolicy::default_rules().expenses;

    assert_eq!(expenses_numeric(&expenses(&[], &[], ""), &rules), 50.0);
    assert_eq!(
        expenses_numeric(&expenses(&[900.0; 4], &[50.0; 9], ""), &rules),
        45.0
    );
    assert_eq!(
        expenses_numeric(&expenses(&[1500.0], &[200.0, 80.0], ""), &rules),
        55.0
    );
    assert_eq!(expenses_numeric(&expenses(&[], &[60.0; 9], ""), &rules), 60.0);
    assert_eq!(
        expenses_numeric(&expenses(&[400.0], &[300.0, 250.0], ""), &rules),
        70.0
    );
}

#[test]
fn empty_expenses_round_ties_to_even() {
    let rules = UtilizationPolicy::default_rules().expenses;
    // 50 * 0.7 + 65 * 0.3 = 54.5
    assert_eq!(score_expenses(&expenses(&[], &[], ""), &rules), 54);
}

#[test]
fn expenses_blend_with_summary() {
    let rules = LiabilityPolicy::default_rules().expenses;
    let record = expenses(&[1500.0], &[200.0, 80.0], "Manageable and reasonable");
    assert_eq!(score_expenses(&record, &rules), 62);
}

#[test]
fn income_ladder() {
    let rules = LiabilityPolicy::default_rules().income;

    assert_eq!(income_numeric(&income(&[], &[], ""), &rules), 50.0);
    assert_eq!(
        income_numeric(&income(&[3000.0, 1200.0], &[500.0], ""), &rules),
        90.0
    );
    assert_eq!(income_numeric(&income(&[4000.0], &[1000.0], ""), &rules), 80.0);
    assert_eq!(income_numeric(&income(&[4000.0], &[1500.0], ""), &rules), 65.0);
}

#[test]
fn mostly_irregular_income_depends_on_policy() {
    let gig_heavy = income(&[300.0], &[1000.0, 450.0], "");

    assert_eq!(
        income_numeric(&gig_heavy, &LiabilityPolicy::default_rules().income),
        65.0
    );
    assert_eq!(
        income_numeric(&gig_heavy, &UtilizationPolicy::default_rules().income),
        50.0
    );
    let custom = IncomeRules {
        mostly_irregular_score: Some(40.0),
    };
    assert_eq!(income_numeric(&gig_heavy, &custom), 40.0);
}

#[test]
fn income_blend_with_summary() {
    let rules = LiabilityPolicy::default_rules().income;
    assert_eq!(score_income(&income(&[5000.0], &[], "Steady payroll"), &rules), 78);
}

#[test]
fn utilization_ladder() {
    let expectations = [
        ("75%", 30.0),
        ("55%", 45.0),
        ("45%", 60.0),
        ("30%", 75.0),
        ("10%", 85.0),
        ("N/A", 85.0),
        ("", 85.0),
    ];
    for (utilization, expected) in expectations {
        assert_eq!(
            utilization_numeric(&debt(utilization, "", "")),
            expected,
            "utilization {utilization}"
        );
    }
    assert_eq!(score_debt_by_utilization(&debt("45%", "", "Paying off an auto loan")), 63);
}

#[test]
fn liability_count_ladder() {
    assert_eq!(liability_numeric(&debt("", "none", "")), 85.0);
    assert_eq!(liability_numeric(&debt("", "credit card", "")), 65.0);
    assert_eq!(liability_numeric(&debt("", "auto", "")), 68.0);
    assert_eq!(liability_numeric(&debt("", "Home loan, car payment", "")), 73.0);
    assert_eq!(
        liability_numeric(&debt("", "mortgage, auto loan, credit card", "")),
        70.0
    );
    assert_eq!(
        liability_numeric(&debt("", "mortgage, auto, credit card, student loan, personal loan", "")),
        45.0
    );
    assert_eq!(score_debt_by_liabilities(&debt("", "auto", "Paying off an auto loan")), 69);
}

#[test]
fn financial_health_ladder() {
    let mostly_negative = health(
        vec![
            indicator("Overdraft", "negative"),
            indicator("Late fees", "negative"),
            indicator("Payday loan", "negative"),
            indicator("Payroll", "positive"),
        ],
        "",
    );
    assert_eq!(financial_health_numeric(&mostly_negative), 40.0);

    let tilted_negative = health(
        vec![
            indicator("Overdraft", "Negative"),
            indicator("Late fees", "negative"),
            indicator("Payroll", "positive"),
        ],
        "",
    );
    assert_eq!(financial_health_numeric(&tilted_negative), 55.0);

    let all_positive = health(
        vec![
            indicator("Payroll", "positive"),
            indicator("Rent on time", "positive"),
        ],
        "",
    );
    assert_eq!(financial_health_numeric(&all_positive), 85.0);

    let mixed = health(
        vec![
            indicator("Payroll", "positive"),
            indicator("Rent on time", "positive"),
            indicator("Subscriptions", "neutral"),
        ],
        "",
    );
    assert_eq!(financial_health_numeric(&mixed), 75.0);

    assert_eq!(financial_health_numeric(&health(Vec::new(), "")), 65.0);

    let record = sample_with_health().financial_health.expect("section present");
    assert_eq!(financial_health_numeric(&record), 90.0);
    assert_eq!(score_financial_health(&record), 88);
}

#[test]
fn bucket_scores_stay_in_range() {
    let flows = [
        cash_flow(0.0, 1e9, -1e9, -1e6, -1e6, "deficit overdrawn volatile"),
        cash_flow(1e9, 0.0, 1e9, 1e9, 1e10, "surplus savings healthy"),
        cash_flow_with_ratio(-0.6),
    ];
    for flow in &flows {
        assert!(score_cash_flow(flow) <= 100);
        let numeric = cash_flow_numeric(flow);
        assert!((0.0..=100.0).contains(&numeric), "numeric {numeric}");
    }
}
