use crate::commands::{
    run_add_candidate, run_generate_report, run_import_candidates, run_list_candidates, AddArgs,
    ImportArgs, ListArgs,
};
use crate::server;
use candidate_report::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Candidate Report",
    about = "Register candidates and publish the eligible shortlist as a PDF report",
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
    /// Manage the candidate file
    Candidates {
        #[command(subcommand)]
        command: CandidatesCommand,
    },
    /// Work with the shortlist report
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CandidatesCommand {
    /// Validate and append a single candidate
    Add(AddArgs),
    /// Validate and append every row of a CSV file
    Import(ImportArgs),
    /// Print stored candidates
    List(ListArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Filter stored candidates and publish a fresh PDF report
    Generate,
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
        Command::Candidates { command } => match command {
            CandidatesCommand::Add(args) => run_add_candidate(args),
            CandidatesCommand::Import(args) => run_import_candidates(args),
            CandidatesCommand::List(args) => run_list_candidates(args),
        },
        Command::Report {
            command: ReportCommand::Generate,
        } => run_generate_report(),
    }
}
