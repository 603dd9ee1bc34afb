use clap::Parser;
use std::path::PathBuf;
use take_bot::config::ConfigLoader;
use take_bot::pipeline::Pipeline;
use tracing::{debug, error, trace};

/// Generate fantasy football takes and post them to Slack
#[derive(Parser)]
#[command(name = "take-bot")]
#[command(about = "Turns today's fantasy football chatter into takes for each manager", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file (default: ./take-bot.toml if present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Render messages and log them instead of posting to Slack
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,reqwest=debug", // -vvv shows everything including dependencies
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .with_writer(std::io::stderr)
        .init();

    debug!("take-bot started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if dotenvy::dotenv().is_ok() {
        debug!("Loaded environment from .env");
    }

    let mut loader = ConfigLoader::new(cli.config);
    if cli.dry_run {
        loader = loader.without_webhook();
    }
    let config = loader.load().await?;

    let pipeline = Pipeline::from_config(&config, cli.dry_run)?;
    let summary = pipeline.run().await?;
    trace!("Run summary: {}", serde_json::to_string(&summary)?);
    Ok(())
}
