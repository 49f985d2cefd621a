use clap::Parser;
use tracing::error;
use trendsync::adapter::inbound::cli::{execute, Cli};
use trendsync::config::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();

    if let Err(e) = execute(cli, config).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }
}
