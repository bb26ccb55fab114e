use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::schema::PriceDataset;

/// Loads the previously persisted document.
///
/// A missing file yields [`PriceDataset::empty`]. Area records are kept as
/// stored, whatever their shape, as long as each has a string `id`. A file
/// that cannot be read, is not a JSON object, or whose `areas` is not such a
/// list is an error so that a run never overwrites data it failed to load.
pub fn load_dataset(path: &Path) -> Result<PriceDataset> {
    if !path.exists() {
        info!(
            "No existing document at {}, starting from an empty dataset",
            path.display()
        );
        return Ok(PriceDataset::empty());
    }

    let contents = fs::read_to_string(path)?;
    let dataset: PriceDataset = serde_json::from_str(&contents)?;
    debug!(
        "Loaded {} areas (version {}) from {}",
        dataset.areas.len(),
        dataset.version,
        path.display()
    );
    Ok(dataset)
}

/// Writes `dataset` to `path`, replacing any previous document wholesale.
///
/// The JSON is written to a temporary file in the same directory and renamed
/// over `path`, so readers see either the old or the new document.
pub fn save_dataset(dataset: &PriceDataset, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let json = serde_json::to_string_pretty(dataset)?;
    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(json.as_bytes())?;
    staged.write_all(b"\n")?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    info!("Saved {} areas to {}", dataset.areas.len(), path.display());
    Ok(())
}
