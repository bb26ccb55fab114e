//! Command line entry point.
//!
//! ```text
//! price-radar fetch [--region mumbai|pune|all]
//! price-radar validate [--path data/prices.json]
//! price-radar schema
//! price-radar serve [--addr 0.0.0.0:5000]      (or PRICE_RADAR_ADDR)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};
use urban_price_radar::{
    validate_file, GeminiClient, PricePipeline, RadarConfig, RegionSelection, ValidatedDataset,
};

#[derive(Parser)]
#[command(
    name = "price-radar",
    about = "Refresh, validate and serve indicative real-estate price bands"
)]
struct Cli {
    /// Price document location
    #[arg(long, global = true, env = "PRICE_RADAR_OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch fresh prices and merge them into the document
    Fetch {
        /// Region to fetch prices for
        #[arg(long, default_value = "all")]
        region: RegionSelection,
    },
    /// Check the stored document against the strict schema
    Validate {
        /// Document to check, defaults to the configured output
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print the JSON Schema of a valid document
    Schema,
    /// Serve the stored document over HTTP
    Serve {
        #[arg(long, env = "PRICE_RADAR_ADDR", default_value = "0.0.0.0:5000")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = RadarConfig::from_env()?;
    if let Some(output) = cli.output {
        config.output_path = output;
    }

    match cli.command {
        Commands::Fetch { region } => {
            let api_key = config.require_api_key()?.to_string();
            let client = GeminiClient::new(api_key, config.model.clone());
            let pipeline =
                PricePipeline::new(client, config.request_interval(), &config.output_path);

            info!(
                "Rate limit: {} requests/min (~{:.1}s delay), model {}",
                config.requests_per_minute,
                config.request_interval().as_secs_f64(),
                config.model
            );

            let summary = pipeline.run(region, None).await?;
            for failure in &summary.failures {
                info!("  skipped {} ({:?}): {}", failure.area_id, failure.kind, failure.message);
            }
            info!(
                "Price update complete: {}/{} areas refreshed, {} areas in {}",
                summary.updated,
                summary.attempted,
                summary.total_areas,
                pipeline.output_path().display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { path } => {
            let path = path.unwrap_or(config.output_path);
            match validate_file(&path) {
                Ok(validated) => {
                    info!(
                        "Validation passed: {} areas loaded from {}",
                        validated.areas.len(),
                        path.display()
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("Validation failed for {}: {}", path.display(), e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Schema => {
            println!("{}", ValidatedDataset::schema_as_json()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Serve { addr } => {
            urban_price_radar::server::serve(&addr, config.output_path).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_address_from_environment() {
        std::env::set_var("PRICE_RADAR_ADDR", "127.0.0.1:8080");
        let cli = Cli::try_parse_from(["price-radar", "serve"]).unwrap();
        std::env::remove_var("PRICE_RADAR_ADDR");

        match cli.command {
            Commands::Serve { addr } => assert_eq!(addr, "127.0.0.1:8080"),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_region_parsing() {
        let cli = Cli::try_parse_from(["price-radar", "fetch", "--region", "pune"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Fetch {
                region: RegionSelection::Pune
            }
        ));
        assert!(Cli::try_parse_from(["price-radar", "fetch", "--region", "delhi"]).is_err());
    }
}
