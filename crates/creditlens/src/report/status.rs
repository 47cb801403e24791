use std::fmt;

use serde::{Deserialize, Serialize};

pub const UNDEFINED_STATUS: &str = "undefined status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    Excellent,
    Good,
    Fair,
    Concerning,
}

impl HealthTier {
    pub fn label(self) -> &'static str {
        match self {
            HealthTier::Excellent => "Excellent",
            HealthTier::Good => "Good",
            HealthTier::Fair => "Fair",
            HealthTier::Concerning => "Concerning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanDecision {
    #[serde(rename = "Loan Approved")]
    Approved,
    #[serde(rename = "Further information needed")]
    FurtherInformationNeeded,
    #[serde(rename = "Loan Denied")]
    Denied,
}

impl LoanDecision {
    pub fn label(self) -> &'static str {
        match self {
            LoanDecision::Approved => "Loan Approved",
            LoanDecision::FurtherInformationNeeded => "Further information needed",
            LoanDecision::Denied => "Loan Denied",
        }
    }
}

impl fmt::Display for LoanDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive integer range `[min, max]` mapped to a tier and decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusBand {
    pub min: f64,
    pub max: f64,
    pub tier: HealthTier,
    pub decision: LoanDecision,
}

impl StatusBand {
    pub const fn new(min: f64, max: f64, tier: HealthTier, decision: LoanDecision) -> Self {
        Self {
            min,
            max,
            tier,
            decision,
        }
    }

    /// Fractional scores between two integer bands belong to the lower one.
    pub fn contains(&self, score: f64) -> bool {
        self.min <= score && score < self.max + 1.0
    }

    /// `"Good: Loan Approved"`
    pub fn description(&self) -> String {
        format!("{}: {}", self.tier.label(), self.decision.label())
    }
}

/// Ordered band table; the first matching band wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBands {
    bands: Vec<StatusBand>,
}

impl StatusBands {
    pub fn new(bands: Vec<StatusBand>) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &[StatusBand] {
        &self.bands
    }

    pub fn classify(&self, score: f64) -> Option<&StatusBand> {
        self.bands.iter().find(|band| band.contains(score))
    }

    pub fn describe(&self, score: f64) -> String {
        self.classify(score)
            .map(StatusBand::description)
            .unwrap_or_else(|| UNDEFINED_STATUS.to_string())
    }
}

impl Default for StatusBands {
    fn default() -> Self {
        Self::new(vec![
            StatusBand::new(90.0, 100.0, HealthTier::Excellent, LoanDecision::Approved),
            StatusBand::new(72.0, 89.0, HealthTier::Good, LoanDecision::Approved),
            StatusBand::new(
                60.0,
                71.0,
                HealthTier::Fair,
                LoanDecision::FurtherInformationNeeded,
            ),
            StatusBand::new(0.0, 59.0, HealthTier::Concerning, LoanDecision::Denied),
        ])
    }
}
