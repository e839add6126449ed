use clap::{Args, Parser, Subcommand};
use jobboard::error::AppError;

use crate::demo::{run_demo, DemoArgs};
use crate::searches::{run_searches, SearchesArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "jobboard",
    about = "Run the job board API or exercise its workflows from the command line",
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
    /// Walk a duplicated posting through the wizard and print the result
    Demo(DemoArgs),
    /// Manage recent job searches and hidden jobs in the local data directory
    Searches(SearchesArgs),
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
    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::Searches(args) => run_searches(args),
    }
}
