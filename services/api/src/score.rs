use clap::Args;
use creditlens::config::AppConfig;
use creditlens::error::AppError;
use creditlens::pipeline::{AnalysisScorer, ScoredAnalysis};
use creditlens::scoring::PolicyKind;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// File holding a model-extracted analysis (JSON, possibly malformed)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Scoring policy: liability (default) or utilization. Falls back to SCORING_POLICY.
    #[arg(long)]
    pub(crate) policy: Option<PolicyKind>,
    /// Print the full scored analysis as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        input,
        policy,
        json,
    } = args;

    let policy = match policy {
        Some(policy) => policy,
        None => AppConfig::load()?.scoring.policy,
    };

    let raw = std::fs::read_to_string(&input)?;
    let scored = AnalysisScorer::for_kind(policy).score_text(&raw)?;

    if json {
        let rendered = serde_json::to_string_pretty(&scored).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_summary(&input, &scored);
    }
    Ok(())
}

fn render_summary(input: &std::path::Path, scored: &ScoredAnalysis) {
    let scoring = &scored.scoring;
    let report = &scored.report;

    println!("Statement analysis: {}", input.display());
    println!("Policy: {}", scoring.policy);
    println!(
        "Overall score: {:.2} ({})",
        scoring.final_score, report.summary.health_status
    );
    println!();

    println!("Components");
    for (bucket, component) in &report.detailed_analysis.components {
        println!(
            "  {:<18} {:>3}/100  {}",
            bucket.title(),
            component.score,
            component.status
        );
    }

    println!();
    if scoring.flags.is_empty() {
        println!("Flags: none");
    } else {
        println!("Flags");
        for flag in &scoring.flags {
            println!("  [{}] {}", flag.severity, flag.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_file_under_requested_policy() {
        let input = std::env::temp_dir().join(format!(
            "creditlens-score-{}.json",
            std::process::id()
        ));
        std::fs::write(&input, "```json\n{\"Cash Flow Analysis\": {\"total_inflows\": 1000,}}\n```")
            .expect("fixture written");

        let result = run_score(ScoreArgs {
            input: input.clone(),
            policy: Some(PolicyKind::Liability),
            json: true,
        });
        let _ = std::fs::remove_file(&input);
        assert!(result.is_ok());
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let result = run_score(ScoreArgs {
            input: PathBuf::from("/nonexistent/creditlens/analysis.json"),
            policy: Some(PolicyKind::Utilization),
            json: false,
        });
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
