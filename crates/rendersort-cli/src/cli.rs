//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use rendersort_core::PlacementMode;
use uuid::Uuid;

use crate::client::{AppContext, CliDependencies, CliResult, parse_url};
use crate::commands::map::handle_map;
use crate::commands::run::handle_run;
use crate::commands::upload::handle_upload;

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Parses CLI arguments, executes the requested command and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let trace_id = Uuid::new_v4().to_string();
    let result = match CliDependencies::from_env(&cli, &trace_id) {
        Ok(deps) => dispatch(cli, &deps).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(cli: Cli, deps: &CliDependencies) -> CliResult<()> {
    match cli.command {
        Command::Map(args) => handle_map(args, cli.output),
        Command::Run(args) => handle_run(args, cli.output).await,
        Command::Upload(args) => {
            let ctx = AppContext {
                client: deps.client.clone(),
                base_url: args.api_url.clone(),
            };
            handle_upload(&ctx, args, cli.output).await
        }
    }
}

#[derive(Parser)]
#[command(
    name = "rendersort",
    about = "Rename rendered AOV passes and regroup them per asset"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "RENDERSORT_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for reports"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the normalized name for each filename.
    Map(MapArgs),
    /// Reorganize a local directory.
    Run(RunArgs),
    /// Send a directory to a running service and save the returned archive.
    Upload(UploadArgs),
}

#[derive(Args)]
pub(crate) struct MapArgs {
    #[arg(required = true)]
    pub(crate) names: Vec<String>,
}

#[derive(Args)]
pub(crate) struct RunArgs {
    pub(crate) dir: PathBuf,
    #[arg(long, value_enum, default_value_t = ModeArg::InPlace)]
    pub(crate) mode: ModeArg,
    #[arg(long, help = "Destination root for clean output; must be empty or missing")]
    pub(crate) dest: Option<PathBuf>,
    #[arg(long, help = "Also write the final tree as a zip archive")]
    pub(crate) zip: Option<PathBuf>,
    #[arg(long, conflicts_with_all = ["dest", "zip"], help = "Report decisions without touching the filesystem")]
    pub(crate) dry_run: bool,
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    pub(crate) dir: PathBuf,
    #[arg(
        long,
        env = "RENDERSORT_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(long, default_value = "processed.zip")]
    pub(crate) out: PathBuf,
    #[arg(long, value_enum)]
    pub(crate) mode: Option<ModeArg>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    InPlace,
    Clean,
}

impl From<ModeArg> for PlacementMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::InPlace => Self::InPlace,
            ModeArg::Clean => Self::Clean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults_to_in_place_table_output() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["rendersort", "run", "renders"])?;
        assert_eq!(cli.output, OutputFormat::Table);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.mode, ModeArg::InPlace);
        assert_eq!(PlacementMode::from(args.mode), PlacementMode::InPlace);
        assert!(!args.dry_run);
        Ok(())
    }

    #[test]
    fn dry_run_conflicts_with_outputs() {
        let result = Cli::try_parse_from([
            "rendersort",
            "run",
            "renders",
            "--dry-run",
            "--zip",
            "out.zip",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn output_flag_is_global() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["rendersort", "map", "a.png", "--output", "json"])?;
        assert_eq!(cli.output, OutputFormat::Json);
        Ok(())
    }

    #[test]
    fn map_requires_a_name() {
        assert!(Cli::try_parse_from(["rendersort", "map"]).is_err());
    }
}
