use std::time::Duration;

use async_trait::async_trait;
use urban_price_radar::{
    validate_file, PriceGenerator, PricePipeline, RegionSelection, Result,
};

/// Stands in for the generation service: fenced JSON with a chatty preamble,
/// which is what real models tend to send back.
struct CannedGenerator;

const CANNED_RESPONSE: &str = r#"Sure, here are the current bands:
```json
{
  "buy": {
    "1rk": {"min": 2500000, "max": 3500000, "confidence": "low"},
    "1bhk": {"min": 4500000, "max": 6500000, "confidence": "medium"},
    "2bhk": {"min": 7500000, "max": 11000000, "confidence": "high"},
    "3bhk_plus": {"min": 12000000, "max": 20000000, "confidence": "medium"}
  },
  "rent": {
    "1rk": {"min": 8000, "max": 12000, "confidence": "low"},
    "1bhk": {"min": 15000, "max": 22000, "confidence": "medium"},
    "2bhk": {"min": 25000, "max": 35000, "confidence": "high"},
    "3bhk_plus": {"min": 40000, "max": 65000, "confidence": "medium"}
  }
}
```"#;

#[async_trait]
impl PriceGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(CANNED_RESPONSE.to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("prices.json");
    let pipeline = PricePipeline::new(CannedGenerator, Duration::ZERO, &path);

    let areas: Vec<_> = RegionSelection::Pune.areas().into_iter().take(3).collect();
    let summary = pipeline.run_areas(&areas, "Pune", None).await?;
    println!(
        "Refreshed {}/{} areas, document holds {}",
        summary.updated, summary.attempted, summary.total_areas
    );

    let validated = validate_file(&path)?;
    for area in &validated.areas {
        println!(
            "{:<16} 2BHK buy {:>10}-{:<10} rent {:>6}-{:<6}",
            area.area.name,
            area.buy.two_bhk.min,
            area.buy.two_bhk.max,
            area.rent.two_bhk.min,
            area.rent.two_bhk.max
        );
    }

    Ok(())
}
