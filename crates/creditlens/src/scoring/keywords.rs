//! Phrase weights used by the summary sentiment scan.
//!
//! Matching is case-insensitive substring containment, so "inconsistent"
//! also triggers "consistent".

/// Starting point of every text subscore before keyword adjustments.
pub const TEXT_BASE_SCORE: f64 = 65.0;
pub const TEXT_SCORE_FLOOR: f64 = 20.0;
pub const TEXT_SCORE_CEILING: f64 = 100.0;
const ADJUSTMENT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordTable {
    pub positive: &'static [(&'static str, i32)],
    pub negative: &'static [(&'static str, i32)],
}

impl KeywordTable {
    /// Sum of the weights of every phrase contained in `summary`.
    pub fn adjustment(&self, summary: &str) -> i32 {
        let summary = summary.to_lowercase();
        self.positive
            .iter()
            .chain(self.negative.iter())
            .filter(|(phrase, _)| summary.contains(phrase))
            .map(|(_, weight)| weight)
            .sum()
    }

    pub fn text_subscore(&self, summary: &str) -> f64 {
        let adjusted = TEXT_BASE_SCORE + f64::from(self.adjustment(summary)) * ADJUSTMENT_MULTIPLIER;
        adjusted.clamp(TEXT_SCORE_FLOOR, TEXT_SCORE_CEILING)
    }
}

pub static CASH_FLOW_KEYWORDS: KeywordTable = KeywordTable {
    positive: &[
        ("consistent", 3),
        ("stable", 2),
        ("healthy", 3),
        ("strong", 2),
        ("positive", 3),
        ("surplus", 5),
        ("savings", 4),
        ("well-managed", 4),
    ],
    negative: &[
        ("inconsistent", -3),
        ("unstable", -3),
        ("concerning", -4),
        ("negative", -3),
        ("deficit", -5),
        ("irregular", -2),
        ("volatile", -3),
        ("overdrawn", -5),
    ],
};

pub static EXPENSE_KEYWORDS: KeywordTable = KeywordTable {
    positive: &[
        ("manageable", 4),
        ("controlled", 3),
        ("reasonable", 3),
        ("within budget", 5),
        ("reduced", 4),
        ("minimal", 4),
        ("essential", 3),
    ],
    negative: &[
        ("high", -3),
        ("excessive", -5),
        ("concerning", -4),
        ("irregular", -3),
        ("uncontrolled", -5),
        ("overspending", -5),
    ],
};

pub static INCOME_KEYWORDS: KeywordTable = KeywordTable {
    positive: &[
        ("stable", 5),
        ("reliable", 4),
        ("consistent", 4),
        ("multiple", 5),
        ("growing", 5),
        ("diversified", 3),
        ("steady", 4),
    ],
    negative: &[
        ("institution", -3),
        ("bank", -3),
        ("unsure", -3),
        ("unstable", -4),
        ("irregular", -3),
        ("declining", -5),
        ("unreliable", -4),
        ("variable", -3),
    ],
};

pub static DEBT_CREDIT_KEYWORDS: KeywordTable = KeywordTable {
    positive: &[
        ("manageable", 4),
        ("low utilization", 5),
        ("paying off", 4),
        ("decreasing", 3),
        ("minimal", 4),
        ("good standing", 5),
    ],
    negative: &[
        ("high balance", -4),
        ("missed payment", -5),
        ("increasing", -3),
        ("maxed out", -5),
        ("overleveraged", -4),
    ],
};

pub static FINANCIAL_HEALTH_KEYWORDS: KeywordTable = KeywordTable {
    positive: &[
        ("improving", 4),
        ("stable", 3),
        ("strong", 4),
        ("savings", 5),
        ("responsible", 4),
        ("disciplined", 4),
        ("well-managed", 5),
        ("emergency fund", 5),
    ],
    negative: &[
        ("struggling", -4),
        ("concerning", -3),
        ("unstable", -4),
        ("risky", -4),
        ("vulnerable", -3),
        ("no savings", -5),
        ("overextended", -5),
        ("deteriorating", -4),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_summary_keeps_base_score() {
        assert_eq!(CASH_FLOW_KEYWORDS.text_subscore(""), TEXT_BASE_SCORE);
        assert_eq!(CASH_FLOW_KEYWORDS.text_subscore("Nothing notable"), TEXT_BASE_SCORE);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(CASH_FLOW_KEYWORDS.adjustment("STABLE and Healthy"), 5);
        // "inconsistent" contains "consistent": -3 + 3.
        assert_eq!(CASH_FLOW_KEYWORDS.adjustment("inconsistent deposits"), 0);
        // "unstable" contains "stable": -4 + 5 in the income table.
        assert_eq!(INCOME_KEYWORDS.adjustment("unstable"), 1);
    }

    #[test]
    fn text_subscore_is_clamped() {
        let grim = "deficit, overdrawn, volatile, concerning, negative, unstable, irregular";
        assert_eq!(CASH_FLOW_KEYWORDS.text_subscore(grim), TEXT_SCORE_FLOOR);
        let glowing = "surplus savings well-managed consistent healthy positive strong stable";
        assert_eq!(CASH_FLOW_KEYWORDS.text_subscore(glowing), TEXT_SCORE_CEILING);
    }
}
