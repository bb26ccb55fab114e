//! Strict structural checks for the persisted price document.
//!
//! Acquisition only makes sure a response carries `buy` and `rent`; this
//! module is the integrity gate for everything else. It is meant to run
//! against the file on disk and reports the first violation with the path of
//! the offending field, e.g. `areas[3].buy.2bhk.max`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::{
    parse_timestamp, AreaDescriptor, Confidence, PriceBand, PriceDataset, PropertyPrices, UnitType,
    ValidatedArea, ValidatedDataset, ZoomLevel,
};

pub const MIN_DISCLAIMER_CHARS: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

type Checked<T> = std::result::Result<T, ValidationError>;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("version pattern compiles"))
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Checked<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::new(path, "must be an object"))
}

fn require<'a>(object: &'a Map<String, Value>, path: &str, key: &str) -> Checked<&'a Value> {
    object
        .get(key)
        .ok_or_else(|| ValidationError::new(join(path, key), "is required"))
}

fn require_str<'a>(object: &'a Map<String, Value>, path: &str, key: &str) -> Checked<&'a str> {
    require(object, path, key)?
        .as_str()
        .ok_or_else(|| ValidationError::new(join(path, key), "must be a string"))
}

fn require_non_empty(object: &Map<String, Value>, path: &str, key: &str) -> Checked<String> {
    let value = require_str(object, path, key)?;
    if value.is_empty() {
        return Err(ValidationError::new(join(path, key), "must not be empty"));
    }
    Ok(value.to_string())
}

fn require_in_range(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    limit: f64,
) -> Checked<f64> {
    let field = join(path, key);
    let value = require(object, path, key)?
        .as_f64()
        .ok_or_else(|| ValidationError::new(&field, "must be a number"))?;
    if !(-limit..=limit).contains(&value) {
        return Err(ValidationError::new(
            field,
            format!("{} is outside [-{}, {}]", value, limit, limit),
        ));
    }
    Ok(value)
}

/// A non-negative whole number. Floats without a fractional part pass.
fn require_amount(object: &Map<String, Value>, path: &str, key: &str) -> Checked<u64> {
    let field = join(path, key);
    let value = require(object, path, key)?;

    if let Some(amount) = value.as_u64() {
        return Ok(amount);
    }
    if let Some(amount) = value.as_i64() {
        return Err(ValidationError::new(
            field,
            format!("{} must not be negative", amount),
        ));
    }
    match value.as_f64() {
        Some(amount) if amount < 0.0 => Err(ValidationError::new(
            field,
            format!("{} must not be negative", amount),
        )),
        Some(amount) if amount.fract() == 0.0 && amount <= u64::MAX as f64 => Ok(amount as u64),
        Some(amount) => Err(ValidationError::new(
            field,
            format!("{} is not a whole number", amount),
        )),
        None => Err(ValidationError::new(field, "must be a number")),
    }
}

fn parse_confidence(raw: &str) -> Option<Confidence> {
    Confidence::ALL.into_iter().find(|c| c.as_str() == raw)
}

fn parse_zoom_level(raw: &str) -> Option<ZoomLevel> {
    ZoomLevel::ALL.into_iter().find(|z| z.as_str() == raw)
}

pub fn validate_price_band(value: &Value, path: &str) -> Checked<PriceBand> {
    let band = as_object(value, path)?;
    let min = require_amount(band, path, "min")?;
    let max = require_amount(band, path, "max")?;
    if max < min {
        return Err(ValidationError::new(
            join(path, "max"),
            format!("max ({}) must be greater than or equal to min ({})", max, min),
        ));
    }

    let raw = require_str(band, path, "confidence")?;
    let confidence = parse_confidence(raw).ok_or_else(|| {
        ValidationError::new(
            join(path, "confidence"),
            format!("'{}' is not one of low, medium, high", raw),
        )
    })?;

    Ok(PriceBand {
        min,
        max,
        confidence,
    })
}

pub fn validate_property_prices(value: &Value, path: &str) -> Checked<PropertyPrices> {
    let prices = as_object(value, path)?;
    let band = |unit: UnitType| {
        let key = unit.key();
        let field = join(path, key);
        let raw = prices
            .get(key)
            .ok_or_else(|| ValidationError::new(&field, "missing required unit type"))?;
        validate_price_band(raw, &field)
    };

    Ok(PropertyPrices {
        one_rk: band(UnitType::OneRk)?,
        one_bhk: band(UnitType::OneBhk)?,
        two_bhk: band(UnitType::TwoBhk)?,
        three_bhk_plus: band(UnitType::ThreeBhkPlus)?,
    })
}

pub fn validate_area(value: &Value, path: &str) -> Checked<ValidatedArea> {
    let area = as_object(value, path)?;

    let id = require_non_empty(area, path, "id")?;
    let name = require_non_empty(area, path, "name")?;
    let region = require_non_empty(area, path, "region")?;
    let lat = require_in_range(area, path, "lat", 90.0)?;
    let lng = require_in_range(area, path, "lng", 180.0)?;

    let raw_zoom = require_str(area, path, "zoom_level")?;
    let zoom_level = parse_zoom_level(raw_zoom).ok_or_else(|| {
        ValidationError::new(
            join(path, "zoom_level"),
            format!("'{}' is not one of region, area, micro", raw_zoom),
        )
    })?;

    let buy = validate_property_prices(require(area, path, "buy")?, &join(path, "buy"))?;
    let rent = validate_property_prices(require(area, path, "rent")?, &join(path, "rent"))?;

    Ok(ValidatedArea {
        area: AreaDescriptor {
            id,
            name,
            region,
            lat,
            lng,
            zoom_level,
        },
        buy,
        rent,
    })
}

/// Validates a whole document, returning its strictly typed form.
pub fn validate_document(document: &Value) -> Checked<ValidatedDataset> {
    let root = as_object(document, "document")?;

    let version = require_str(root, "", "version")?;
    if !version_pattern().is_match(version) {
        return Err(ValidationError::new(
            "version",
            format!("'{}' does not match MAJOR.MINOR.PATCH", version),
        ));
    }

    let raw_generated_at = require_str(root, "", "generated_at")?;
    let generated_at = parse_timestamp(raw_generated_at).ok_or_else(|| {
        ValidationError::new(
            "generated_at",
            format!("'{}' is not an ISO-8601 timestamp", raw_generated_at),
        )
    })?;

    let disclaimer = require_str(root, "", "disclaimer")?;
    if disclaimer.chars().count() < MIN_DISCLAIMER_CHARS {
        return Err(ValidationError::new(
            "disclaimer",
            format!("must be at least {} characters", MIN_DISCLAIMER_CHARS),
        ));
    }

    let raw_areas = require(root, "", "areas")?
        .as_array()
        .ok_or_else(|| ValidationError::new("areas", "must be an array"))?;
    if raw_areas.is_empty() {
        return Err(ValidationError::new("areas", "must contain at least one area"));
    }

    let mut areas = Vec::with_capacity(raw_areas.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (i, raw) in raw_areas.iter().enumerate() {
        let path = format!("areas[{}]", i);
        let area = validate_area(raw, &path)?;
        if let Some(first) = seen.insert(area.area.id.clone(), i) {
            return Err(ValidationError::new(
                join(&path, "id"),
                format!("duplicate id '{}' (first used by areas[{}])", area.area.id, first),
            ));
        }
        areas.push(area);
    }

    Ok(ValidatedDataset {
        version: version.to_string(),
        generated_at,
        disclaimer: disclaimer.to_string(),
        areas,
    })
}

/// Validates an in-memory dataset exactly as it would be written to disk.
pub fn validate_dataset(dataset: &PriceDataset) -> crate::Result<ValidatedDataset> {
    let document = serde_json::to_value(dataset)?;
    Ok(validate_document(&document)?)
}

/// Reads and validates the document stored at `path`.
pub fn validate_file(path: &Path) -> crate::Result<ValidatedDataset> {
    let contents = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&contents)?;
    Ok(validate_document(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn band(min: u64, max: u64) -> Value {
        json!({"min": min, "max": max, "confidence": "medium"})
    }

    fn prices() -> Value {
        json!({
            "1rk": band(10_000, 50_000),
            "1bhk": band(20_000, 60_000),
            "2bhk": band(30_000, 90_000),
            "3bhk_plus": band(50_000, 150_000),
        })
    }

    fn area(id: &str) -> Value {
        json!({
            "id": id,
            "name": "Bandra",
            "region": "Mumbai",
            "lat": 19.0596,
            "lng": 72.8295,
            "zoom_level": "area",
            "buy": prices(),
            "rent": prices(),
        })
    }

    fn document() -> Value {
        json!({
            "version": "1.0.0",
            "generated_at": "2025-01-06T00:30:00.123456+00:00",
            "disclaimer": "Prices shown are indicative bands.",
            "areas": [area("bandra"), area("mum-khar")],
        })
    }

    fn field_of(document: &Value) -> String {
        validate_document(document).unwrap_err().field
    }

    #[test]
    fn test_valid_document() {
        let validated = validate_document(&document()).unwrap();
        assert_eq!(validated.areas.len(), 2);
        assert_eq!(validated.areas[0].buy.two_bhk.max, 90_000);
        assert_eq!(validated.areas[1].area.id, "mum-khar");
    }

    #[test]
    fn test_band_max_below_min() {
        let inverted = json!({"min": 50000, "max": 10000, "confidence": "low"});
        let err = validate_price_band(&inverted, "band").unwrap_err();
        assert_eq!(err.field, "band.max");

        let ordered = json!({"min": 10000, "max": 50000, "confidence": "low"});
        let band = validate_price_band(&ordered, "band").unwrap();
        assert_eq!(band.confidence, Confidence::Low);
    }

    #[test]
    fn test_band_amounts() {
        let negative = json!({"min": -1, "max": 10, "confidence": "low"});
        assert_eq!(validate_price_band(&negative, "b").unwrap_err().field, "b.min");

        let fractional = json!({"min": 1, "max": 10.5, "confidence": "low"});
        assert_eq!(validate_price_band(&fractional, "b").unwrap_err().field, "b.max");

        let whole_float = json!({"min": 1.0, "max": 10.0, "confidence": "high"});
        assert_eq!(validate_price_band(&whole_float, "b").unwrap().max, 10);

        let text = json!({"min": "1", "max": 10, "confidence": "low"});
        assert!(validate_price_band(&text, "b").is_err());
    }

    #[test]
    fn test_band_confidence_out_of_set() {
        let band = json!({"min": 1, "max": 2, "confidence": "certain"});
        assert_eq!(
            validate_price_band(&band, "b").unwrap_err().field,
            "b.confidence"
        );
    }

    #[test]
    fn test_missing_unit_type() {
        let mut doc = document();
        doc["areas"][1]["rent"]
            .as_object_mut()
            .unwrap()
            .remove("3bhk_plus");
        assert_eq!(field_of(&doc), "areas[1].rent.3bhk_plus");
    }

    #[test]
    fn test_nested_band_path() {
        let mut doc = document();
        doc["areas"][0]["buy"]["2bhk"] = json!({"min": 9, "max": 1, "confidence": "low"});
        assert_eq!(field_of(&doc), "areas[0].buy.2bhk.max");
    }

    #[test]
    fn test_version_pattern() {
        let mut doc = document();
        doc["version"] = json!("1.0");
        assert_eq!(field_of(&doc), "version");

        doc["version"] = json!("10.20.30");
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn test_generated_at() {
        let mut doc = document();
        doc["generated_at"] = json!("last monday");
        assert_eq!(field_of(&doc), "generated_at");

        doc["generated_at"] = json!(null);
        assert_eq!(field_of(&doc), "generated_at");

        doc["generated_at"] = json!("2025-01-06T00:30:00");
        assert!(validate_document(&doc).is_ok());

        doc["generated_at"] = json!("2025-01-06T06:00:00+05:30");
        let validated = validate_document(&doc).unwrap();
        assert_eq!(validated.generated_at.to_rfc3339(), "2025-01-06T00:30:00+00:00");
    }

    #[test]
    fn test_short_disclaimer() {
        let mut doc = document();
        doc["disclaimer"] = json!("n/a");
        assert_eq!(field_of(&doc), "disclaimer");
    }

    #[test]
    fn test_empty_areas() {
        let mut doc = document();
        doc["areas"] = json!([]);
        assert_eq!(field_of(&doc), "areas");
    }

    #[test]
    fn test_duplicate_ids() {
        let mut doc = document();
        doc["areas"] = json!([area("bandra"), area("khar"), area("bandra")]);
        let err = validate_document(&doc).unwrap_err();
        assert_eq!(err.field, "areas[2].id");
        assert!(err.reason.contains("areas[0]"));
    }

    #[test]
    fn test_descriptor_bounds() {
        let mut doc = document();
        doc["areas"][0]["lat"] = json!(91.0);
        assert_eq!(field_of(&doc), "areas[0].lat");

        let mut doc = document();
        doc["areas"][1]["lng"] = json!(-180.5);
        assert_eq!(field_of(&doc), "areas[1].lng");

        let mut doc = document();
        doc["areas"][0]["name"] = json!("");
        assert_eq!(field_of(&doc), "areas[0].name");

        let mut doc = document();
        doc["areas"][0]["zoom_level"] = json!("street");
        assert_eq!(field_of(&doc), "areas[0].zoom_level");
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(field_of(&json!([])), "document");
    }
}
