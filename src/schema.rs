use chrono::{DateTime, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_VERSION: &str = "1.0.0";

pub const DISCLAIMER: &str =
    "Prices shown are indicative bands based on recent public listings, not verified transactions.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
    #[schemars(description = "Visible at metro-region zoom")]
    Region,

    #[schemars(description = "Visible at neighbourhood zoom")]
    Area,

    #[schemars(description = "Visible only when zoomed into a micro-market")]
    Micro,
}

impl ZoomLevel {
    pub const ALL: [ZoomLevel; 3] = [ZoomLevel::Region, ZoomLevel::Area, ZoomLevel::Micro];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoomLevel::Region => "region",
            ZoomLevel::Area => "area",
            ZoomLevel::Micro => "micro",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[schemars(description = "Sparse or inconsistent listings found")]
    Low,

    #[schemars(description = "Multiple recent listings available")]
    Medium,

    #[schemars(description = "Strong consensus across multiple sources")]
    High,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::Low, Confidence::Medium, Confidence::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// Housing categories priced for every area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    OneRk,
    OneBhk,
    TwoBhk,
    ThreeBhkPlus,
}

impl UnitType {
    pub const ALL: [UnitType; 4] = [
        UnitType::OneRk,
        UnitType::OneBhk,
        UnitType::TwoBhk,
        UnitType::ThreeBhkPlus,
    ];

    /// The JSON key used for this unit type in the persisted document.
    pub fn key(&self) -> &'static str {
        match self {
            UnitType::OneRk => "1rk",
            UnitType::OneBhk => "1bhk",
            UnitType::TwoBhk => "2bhk",
            UnitType::ThreeBhkPlus => "3bhk_plus",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct PriceBand {
    #[schemars(description = "Lower end of the observed range in INR")]
    pub min: u64,

    #[schemars(description = "Upper end of the observed range in INR. Never below `min`.")]
    pub max: u64,

    #[schemars(description = "How well the range is supported by current listings")]
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct PropertyPrices {
    #[serde(rename = "1rk")]
    #[schemars(description = "Single room with kitchen")]
    pub one_rk: PriceBand,

    #[serde(rename = "1bhk")]
    pub one_bhk: PriceBand,

    #[serde(rename = "2bhk")]
    pub two_bhk: PriceBand,

    #[serde(rename = "3bhk_plus")]
    #[schemars(description = "Three bedrooms or larger")]
    pub three_bhk_plus: PriceBand,
}

impl PropertyPrices {
    pub fn get(&self, unit: UnitType) -> &PriceBand {
        match unit {
            UnitType::OneRk => &self.one_rk,
            UnitType::OneBhk => &self.one_bhk,
            UnitType::TwoBhk => &self.two_bhk,
            UnitType::ThreeBhkPlus => &self.three_bhk_plus,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AreaDescriptor {
    #[schemars(description = "Stable unique key, e.g. 'pune-baner'")]
    pub id: String,

    #[schemars(description = "Display name used in prompts and on the map")]
    pub name: String,

    #[schemars(description = "Parent region, e.g. 'Mumbai', 'Thane', 'Navi Mumbai'")]
    pub region: String,

    #[schemars(description = "Latitude in degrees, -90 to 90")]
    pub lat: f64,

    #[schemars(description = "Longitude in degrees, -180 to 180")]
    pub lng: f64,

    pub zoom_level: ZoomLevel,
}

/// One entry of the document's `areas` list, held as the JSON object it is
/// stored as.
///
/// Records read from disk are carried through untouched, including keys this
/// crate does not know about and the exact number forms they were written
/// with. Only a string `id` is required; everything else is judged by
/// [`crate::validator`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct AreaRecord {
    fields: Map<String, Value>,
}

impl AreaRecord {
    /// Builds a fresh record from a catalog entry and the acquired price
    /// objects. `buy` and `rent` are stored as-is.
    pub fn new(area: &AreaDescriptor, buy: Value, rent: Value) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::from(area.id.as_str()));
        fields.insert("name".to_string(), Value::from(area.name.as_str()));
        fields.insert("region".to_string(), Value::from(area.region.as_str()));
        fields.insert("lat".to_string(), Value::from(area.lat));
        fields.insert("lng".to_string(), Value::from(area.lng));
        fields.insert("zoom_level".to_string(), Value::from(area.zoom_level.as_str()));
        fields.insert("buy".to_string(), buy);
        fields.insert("rent".to_string(), rent);
        Self { fields }
    }

    /// Wraps a stored object. Fails when it has no string `id`.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, String> {
        match fields.get("id") {
            Some(Value::String(_)) => Ok(Self { fields }),
            Some(other) => Err(format!("area id must be a string, found {}", other)),
            None => Err("area record has no 'id'".to_string()),
        }
    }

    pub fn id(&self) -> &str {
        self.fields
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn buy(&self) -> Option<&Value> {
        self.get("buy")
    }

    pub fn rent(&self) -> Option<&Value> {
        self.get("rent")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl<'de> Deserialize<'de> for AreaRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::deserialize(deserializer)?;
        AreaRecord::from_fields(fields).map_err(serde::de::Error::custom)
    }
}

/// Parses an ISO-8601 timestamp. Timestamps without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// The previous timestamp is replaced on every run, so an unreadable one is
/// dropped rather than failing the load.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// The persisted document as the pipeline reads and rewrites it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceDataset {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub disclaimer: String,

    #[serde(default)]
    pub areas: Vec<AreaRecord>,
}

impl PriceDataset {
    /// The starting point when no document has been persisted yet.
    pub fn empty() -> Self {
        Self {
            version: default_version(),
            generated_at: None,
            disclaimer: String::new(),
            areas: Vec::new(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&AreaRecord> {
        self.areas.iter().find(|a| a.id() == id)
    }
}

impl Default for PriceDataset {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ValidatedArea {
    #[serde(flatten)]
    pub area: AreaDescriptor,

    #[schemars(description = "Total purchase price bands")]
    pub buy: PropertyPrices,

    #[schemars(description = "Monthly rent bands")]
    pub rent: PropertyPrices,
}

/// A document that passed [`crate::validator::validate_document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ValidatedDataset {
    #[schemars(regex(pattern = r"^\d+\.\d+\.\d+$"))]
    pub version: String,

    pub generated_at: DateTime<Utc>,

    #[schemars(length(min = 10))]
    pub disclaimer: String,

    #[schemars(
        length(min = 1),
        description = "Areas with price data. Ids are unique across the list."
    )]
    pub areas: Vec<ValidatedArea>,
}

impl ValidatedDataset {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ValidatedDataset)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
