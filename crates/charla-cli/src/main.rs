use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(
    name = "charla",
    version,
    about = "Self-retraining conversational responder"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        commands::Commands::Chat(args) => commands::chat::run(args),
        commands::Commands::Ask(args) => commands::ask::run(args),
        commands::Commands::Train(args) => commands::train::run(args),
        commands::Commands::BuildDataset(args) => commands::build_dataset::run(args),
        commands::Commands::TrainModel(args) => commands::train_model::run(args),
        commands::Commands::Status(args) => commands::status::run(args),
        commands::Commands::Clean(args) => commands::clean::run(args),
        commands::Commands::Reset(args) => commands::reset::run(args),
        commands::Commands::Logs(args) => commands::logs::run(args),
    }
}
