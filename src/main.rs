use clap::Parser;
use trendscout::cli::{Cli, Commands};
use trendscout::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .unwrap_or_else(|e| {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::default()
        })
        .with_mode(cli.mode);

    trendscout::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(mode = ?cli.mode, "Starting scanner");
            args.execute(config).await?;
        }
        Commands::Scan(args) => {
            tracing::info!(mode = ?cli.mode, "Running single sweep");
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Scan: every {}s, {} symbols, top {} signals",
                config.scan.interval_secs, config.scan.scan_limit, config.scan.top_n
            );
            println!(
                "  Universe: quote volume >= {}, cooldown {}s",
                config.scan.min_quote_volume, config.scan.cooldown_secs
            );
            println!(
                "  Threshold: base {} / fallback {} (floor {}, ceil {})",
                config.threshold.base_min_score,
                config.threshold.fallback_min_score,
                config.threshold.floor,
                config.threshold.ceil
            );
            println!(
                "  Risk: stop {}xATR, targets {:?}R",
                config.risk.stop_mult, config.risk.tp_r
            );
            println!("  Learner: {}", if config.learner.enabled { "on" } else { "off" });
        }
    }

    Ok(())
}
