//! # Urban Price Radar
//!
//! Maintains indicative real-estate price bands (buy and rent, by unit type)
//! for areas of the Mumbai metropolitan region and Pune, stored as a single
//! JSON document that a read-only API serves as-is.
//!
//! ## Pipeline
//!
//! - **Catalog**: the fixed list of areas, selected by region
//! - **Acquisition**: one rate-paced, sequential request per area to a text
//!   generation service; the answer is pulled out of whatever prose or
//!   markdown surrounds it. A failed area is skipped, never fatal.
//! - **Merge**: new records replace old ones by area id; areas not refreshed
//!   in this run keep their previous data
//! - **Persistence**: the merged document is written atomically
//! - **Validation**: a strict structural check of the stored document, run
//!   offline as an integrity gate
//!
//! ## Example
//!
//! ```rust,ignore
//! use urban_price_radar::*;
//!
//! let config = RadarConfig::from_env()?;
//! let client = GeminiClient::new(config.require_api_key()?.to_string(), &config.model);
//! let pipeline = PricePipeline::new(client, config.request_interval(), &config.output_path);
//!
//! let summary = pipeline.run(RegionSelection::Pune, None).await?;
//! println!("Updated {} of {} areas", summary.updated, summary.attempted);
//! ```

pub mod acquirer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod merge;
pub mod persistence;
pub mod schema;
#[cfg(feature = "server")]
pub mod server;
pub mod validator;

pub use acquirer::{
    record_from_response, request_interval, AcquisitionEvent, AcquisitionFailure,
    AcquisitionReport, Acquirer, FailureKind,
};
pub use catalog::{CatalogEntry, RegionSelection};
pub use config::RadarConfig;
pub use error::{PriceRadarError, Result};
pub use llm::*;
pub use merge::{merge_datasets, merge_now};
pub use persistence::{load_dataset, save_dataset};
pub use schema::*;
pub use validator::{validate_dataset, validate_document, validate_file, ValidationError};

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use tokio::sync::mpsc::Sender;

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub attempted: usize,
    pub updated: usize,
    pub failures: Vec<AcquisitionFailure>,
    /// Number of areas in the document after the merge.
    pub total_areas: usize,
    /// Set when the merged document does not yet pass strict validation.
    pub validation_error: Option<ValidationError>,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }
}

/// Acquire, merge and persist in one pass.
pub struct PricePipeline<G> {
    acquirer: Acquirer<G>,
    output_path: PathBuf,
}

impl<G: PriceGenerator> PricePipeline<G> {
    pub fn new(generator: G, interval: Duration, output_path: impl AsRef<Path>) -> Self {
        Self {
            acquirer: Acquirer::new(generator, interval),
            output_path: output_path.as_ref().to_path_buf(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Refreshes every catalog area of `selection`.
    pub async fn run(
        &self,
        selection: RegionSelection,
        progress: Option<Sender<AcquisitionEvent>>,
    ) -> Result<RunSummary> {
        info!("Refreshing prices for region '{}'", selection);
        self.run_areas(&selection.areas(), selection.city(), progress)
            .await
    }

    /// Refreshes the given areas and rewrites the document once at the end.
    ///
    /// The previous document is loaded before any request is made, so an
    /// unreadable document aborts the run without spending quota.
    pub async fn run_areas(
        &self,
        areas: &[AreaDescriptor],
        city: &str,
        progress: Option<Sender<AcquisitionEvent>>,
    ) -> Result<RunSummary> {
        let previous = load_dataset(&self.output_path)?;

        let report = self.acquirer.acquire(areas, city, progress).await;
        let attempted = report.attempted();
        let updated = report.updated.len();

        let merged = merge_now(previous, report.updated);

        let validation_error = validate_dataset(&merged).err().map(|e| match e {
            PriceRadarError::Validation(v) => v,
            other => ValidationError {
                field: "document".to_string(),
                reason: other.to_string(),
            },
        });
        if let Some(err) = &validation_error {
            warn!("Merged document does not pass validation yet: {}", err);
        }

        save_dataset(&merged, &self.output_path)?;

        info!(
            "Updated {} areas, total {} areas",
            updated,
            merged.areas.len()
        );

        Ok(RunSummary {
            attempted,
            updated,
            failures: report.failures,
            total_areas: merged.areas.len(),
            validation_error,
        })
    }
}
