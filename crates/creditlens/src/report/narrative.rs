use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::analysis::{repair, Bucket};
use crate::scoring::ScoringResult;

/// Model-written commentary merged into the report.
///
/// Built from loosely keyed JSON: the first top-level key containing
/// `summary`, `analysis` or `recommend` feeds the matching field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Narrative {
    pub summary: String,
    pub analysis: Value,
    pub components: BTreeMap<Bucket, ComponentNarrative>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentNarrative {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

impl Narrative {
    /// Never fails; unrecoverable text produces an empty narrative.
    pub fn parse(raw: &str) -> Self {
        match repair::repair(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                warn!(error = %err, "narrative response unreadable, continuing without narrative");
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(root) = value.as_object() else {
            return Self::default();
        };

        let analysis = key_containing(root, "analysis")
            .cloned()
            .unwrap_or(Value::Null);
        let components = analysis
            .as_object()
            .map(component_narratives)
            .unwrap_or_default();

        Self {
            summary: key_containing(root, "summary")
                .map(summary_text)
                .unwrap_or_default(),
            analysis,
            components,
            recommendations: key_containing(root, "recommend")
                .map(string_list)
                .unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.analysis.is_null()
            && self.components.is_empty()
            && self.recommendations.is_empty()
    }

    pub fn component(&self, bucket: Bucket) -> Option<&ComponentNarrative> {
        self.components.get(&bucket)
    }
}

/// An exact (case-insensitive) key wins; otherwise the alphabetically first
/// key containing `needle`.
fn key_containing<'a>(map: &'a Map<String, Value>, needle: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(needle))
        .or_else(|| {
            map.iter()
                .find(|(key, _)| key.to_lowercase().contains(needle))
        })
        .map(|(_, value)| value)
}

fn summary_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) => map
            .values()
            .find_map(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Strings from an array, a single string, or objects carrying a text field.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => vec![text.clone()],
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(text) => Some(text.clone()),
                Value::Object(map) => map.values().find_map(Value::as_str).map(str::to_string),
                _ => None,
            })
            .filter(|text| !text.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

const BUCKETS: [Bucket; 5] = [
    Bucket::CashFlow,
    Bucket::Expenses,
    Bucket::Income,
    Bucket::DebtCredit,
    Bucket::FinancialHealth,
];

fn component_narratives(analysis: &Map<String, Value>) -> BTreeMap<Bucket, ComponentNarrative> {
    analysis
        .iter()
        .filter_map(|(key, value)| {
            let bucket = bucket_for_key(key)?;
            let section = value.as_object()?;
            let narrative = ComponentNarrative {
                strengths: key_containing(section, "strength")
                    .map(string_list)
                    .unwrap_or_default(),
                concerns: key_containing(section, "concern")
                    .or_else(|| key_containing(section, "weakness"))
                    .map(string_list)
                    .unwrap_or_default(),
            };
            Some((bucket, narrative))
        })
        .collect()
}

/// Maps `"Cash Flow"`, `"cash_flow"` or `"cash-flow analysis"` to a bucket.
fn bucket_for_key(key: &str) -> Option<Bucket> {
    let normalized: String = key
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    BUCKETS.into_iter().find(|bucket| {
        normalized.contains(bucket.as_str())
            || (*bucket == Bucket::Expenses && normalized.contains("expense"))
            || (*bucket == Bucket::DebtCredit && normalized.contains("debt"))
    })
}

/// Context sent to the language model when requesting the narrative.
pub fn narrative_prompt(scoring: &ScoringResult) -> String {
    let components = scoring
        .component_scores
        .iter()
        .map(|(bucket, score)| format!("- {}: {score}/100", bucket.title()))
        .collect::<Vec<_>>()
        .join("\n");
    let metrics = scoring.metrics.prompt_lines().join("\n");
    let flags = if scoring.flags.is_empty() {
        "- none".to_string()
    } else {
        scoring
            .flags
            .iter()
            .map(|flag| {
                format!(
                    "- {}: {}",
                    flag.severity.to_string().to_uppercase(),
                    flag.message
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Analyze this financial data and provide insights:\n\n\
         Overall Score: {}\n\n\
         Component Scores:\n{components}\n\n\
         Key Metrics:\n{metrics}\n\n\
         Flags:\n{flags}\n\n\
         Provide a structured JSON response with:\n\
         1. \"summary\": a brief summary of overall financial health\n\
         2. \"analysis\": an object keyed by component ({keys}), each with \"strengths\" and \"concerns\" lists\n\
         3. \"recommendations\": specific, actionable recommendations based on the flags and metrics\n",
        scoring.final_score,
        keys = scoring
            .component_scores
            .keys()
            .map(|bucket| bucket.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}
