use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;

use crate::schema::{AreaRecord, PriceDataset, DISCLAIMER};

/// Upserts `updates` into `previous`, keyed by area id.
///
/// Records in `updates` replace the previous record with the same id
/// entirely; untouched records are carried over as they were. Previous order
/// is kept and ids new to the document are appended. The version is carried
/// over while the timestamp and disclaimer are refreshed.
pub fn merge_datasets(
    previous: PriceDataset,
    updates: Vec<AreaRecord>,
    generated_at: DateTime<Utc>,
) -> PriceDataset {
    let mut areas: Vec<AreaRecord> = Vec::with_capacity(previous.areas.len() + updates.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in previous.areas.into_iter().chain(updates) {
        match positions.get(record.id()) {
            Some(&index) => areas[index] = record,
            None => {
                positions.insert(record.id().to_string(), areas.len());
                areas.push(record);
            }
        }
    }

    debug!("Merged dataset holds {} areas", areas.len());

    PriceDataset {
        version: previous.version,
        generated_at: Some(generated_at),
        disclaimer: DISCLAIMER.to_string(),
        areas,
    }
}

/// [`merge_datasets`] stamped with the current time.
pub fn merge_now(previous: PriceDataset, updates: Vec<AreaRecord>) -> PriceDataset {
    merge_datasets(previous, updates, Utc::now())
}
