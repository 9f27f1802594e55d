use clap::Parser;
use ws_tether::cli::{Cli, Commands};
use ws_tether::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    ws_tether::telemetry::init_logging(&config.telemetry.log_level)?;

    match cli.command {
        Commands::Run(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  URL: {}", config.connection.url);
            println!(
                "  Reconnect on failure: {}",
                config.connection.reconnect_on_failure
            );
            println!(
                "  Backoff: base={}ms, max={}ms",
                config.connection.base_delay_ms, config.connection.max_delay_ms
            );
            println!("  Log level: {}", config.telemetry.log_level);
        }
    }

    Ok(())
}
