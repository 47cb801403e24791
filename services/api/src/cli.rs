use crate::score::{run_score, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use creditlens::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "creditlens",
    about = "Score bank statements for loan decisions, over HTTP or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an already-extracted analysis file without calling external services
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creditlens::scoring::PolicyKind;

    #[test]
    fn score_command_parses_policy_aliases() {
        let cli = Cli::try_parse_from([
            "creditlens",
            "score",
            "--input",
            "analysis.json",
            "--policy",
            "utilization-v1",
            "--json",
        ])
        .expect("arguments parse");
        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.policy, Some(PolicyKind::Utilization));
                assert!(args.json);
                assert_eq!(args.input, std::path::PathBuf::from("analysis.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["creditlens"]).expect("arguments parse");
        assert!(cli.command.is_none());
        assert!(Cli::try_parse_from(["creditlens", "score", "--input", "a.json", "--policy", "fico"]).is_err());
    }
}
