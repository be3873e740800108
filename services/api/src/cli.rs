use crate::reports::{
    run_curation, run_dashboard, run_recommendation, CurateArgs, DashboardArgs, RecommendArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use radar_ali::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Radar ALI 360",
    about = "Serve and query the Radar ALI 360 solution recommender",
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
    /// Print the regional dashboard summary
    Dashboard(DashboardArgs),
    /// Recommend solutions for one company
    Recommend(RecommendArgs),
    /// List underserved challenges and optionally ask the model for new solutions
    Curate(CurateArgs),
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
        Command::Dashboard(args) => run_dashboard(args).await,
        Command::Recommend(args) => run_recommendation(args).await,
        Command::Curate(args) => run_curation(args).await,
    }
}
