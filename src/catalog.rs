//! Static registry of the areas priced by the pipeline.
//!
//! The catalog is fixed at build time. Areas are never added or removed by a
//! run; an area only shows up in the persisted document once an acquisition
//! for it has succeeded.

use std::fmt;
use std::str::FromStr;

use crate::schema::{AreaDescriptor, ZoomLevel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub region: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub zoom_level: ZoomLevel,
}

impl CatalogEntry {
    pub fn to_descriptor(&self) -> AreaDescriptor {
        AreaDescriptor {
            id: self.id.to_string(),
            name: self.name.to_string(),
            region: self.region.to_string(),
            lat: self.lat,
            lng: self.lng,
            zoom_level: self.zoom_level,
        }
    }
}

const fn entry(
    id: &'static str,
    name: &'static str,
    region: &'static str,
    lat: f64,
    lng: f64,
) -> CatalogEntry {
    CatalogEntry {
        id,
        name,
        region,
        lat,
        lng,
        zoom_level: ZoomLevel::Area,
    }
}

/// Which metro region a run refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionSelection {
    Mumbai,
    Pune,
    #[default]
    All,
}

impl RegionSelection {
    /// City named in the prompt. Mixed runs fall back to the country.
    pub fn city(&self) -> &'static str {
        match self {
            RegionSelection::Mumbai => "Mumbai",
            RegionSelection::Pune => "Pune",
            RegionSelection::All => "India",
        }
    }

    pub fn entries(&self) -> Vec<&'static CatalogEntry> {
        match self {
            RegionSelection::Mumbai => MUMBAI_AREAS.iter().collect(),
            RegionSelection::Pune => PUNE_AREAS.iter().collect(),
            RegionSelection::All => MUMBAI_AREAS.iter().chain(PUNE_AREAS.iter()).collect(),
        }
    }

    pub fn areas(&self) -> Vec<AreaDescriptor> {
        self.entries()
            .into_iter()
            .map(CatalogEntry::to_descriptor)
            .collect()
    }
}

impl FromStr for RegionSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mumbai" => Ok(RegionSelection::Mumbai),
            "pune" => Ok(RegionSelection::Pune),
            "all" => Ok(RegionSelection::All),
            other => Err(format!(
                "Unknown region '{}': expected one of mumbai, pune, all",
                other
            )),
        }
    }
}

impl fmt::Display for RegionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionSelection::Mumbai => "mumbai",
            RegionSelection::Pune => "pune",
            RegionSelection::All => "all",
        };
        f.write_str(name)
    }
}

// Mumbai metropolitan region, refreshed Monday morning IST.
const MUMBAI_AREAS: &[CatalogEntry] = &[
    // South Mumbai
    entry("mum-churchgate", "Churchgate", "Mumbai", 18.9322, 72.8264),
    entry("mum-marinedrive", "Marine Drive", "Mumbai", 18.9432, 72.8235),
    entry("mum-colaba", "Colaba", "Mumbai", 18.9067, 72.8147),
    entry("mum-fortarea", "Fort", "Mumbai", 18.9318, 72.8352),
    entry("mum-nariman", "Nariman Point", "Mumbai", 18.9254, 72.8242),
    entry("mum-malabarhill", "Malabar Hill", "Mumbai", 18.9550, 72.7975),
    entry("mum-worli", "Worli", "Mumbai", 19.0176, 72.8150),
    entry("mum-lowerparel", "Lower Parel", "Mumbai", 18.9980, 72.8302),
    entry("mum-prabhadevi", "Prabhadevi", "Mumbai", 19.0166, 72.8285),
    // Central Mumbai
    entry("mum-dadar", "Dadar", "Mumbai", 19.0178, 72.8478),
    entry("mum-matunga", "Matunga", "Mumbai", 19.0275, 72.8517),
    entry("mum-sion", "Sion", "Mumbai", 19.0400, 72.8620),
    entry("mum-wadala", "Wadala", "Mumbai", 19.0177, 72.8674),
    entry("mum-kurla", "Kurla", "Mumbai", 19.0726, 72.8793),
    entry("mum-chembur", "Chembur", "Mumbai", 19.0620, 72.8960),
    // Eastern Suburbs
    entry("mum-ghatkopar", "Ghatkopar", "Mumbai", 19.0865, 72.9080),
    entry("mum-vikhroli", "Vikhroli", "Mumbai", 19.1100, 72.9280),
    entry("mum-kanjurmarg", "Kanjurmarg", "Mumbai", 19.1310, 72.9340),
    entry("mum-bhandup", "Bhandup", "Mumbai", 19.1480, 72.9380),
    entry("mum-mulund", "Mulund", "Mumbai", 19.1726, 72.9565),
    entry("mum-powai", "Powai", "Mumbai", 19.1176, 72.9060),
    // Western Suburbs - Bandra to Andheri
    entry("mum-mahim", "Mahim", "Mumbai", 19.0360, 72.8402),
    entry("bandra", "Bandra", "Mumbai", 19.0596, 72.8295),
    entry("mum-khar", "Khar", "Mumbai", 19.0710, 72.8360),
    entry("mum-santacruz", "Santacruz", "Mumbai", 19.0830, 72.8410),
    entry("mum-vileparle", "Vile Parle", "Mumbai", 19.0990, 72.8440),
    entry("andheri-west", "Andheri West", "Mumbai", 19.1364, 72.8296),
    entry("andheri-east", "Andheri East", "Mumbai", 19.1197, 72.8684),
    entry("mum-juhu", "Juhu", "Mumbai", 19.1075, 72.8263),
    entry("mum-versova", "Versova", "Mumbai", 19.1300, 72.8120),
    entry("mum-lokhandwala", "Lokhandwala", "Mumbai", 19.1410, 72.8320),
    // Western Suburbs - Goregaon to Dahisar
    entry("mum-jogeshwari", "Jogeshwari", "Mumbai", 19.1360, 72.8490),
    entry("goregaon-west", "Goregaon", "Mumbai", 19.1663, 72.8526),
    entry("malad-west", "Malad", "Mumbai", 19.1870, 72.8485),
    entry("kandivali-west", "Kandivali", "Mumbai", 19.2040, 72.8520),
    entry("borivali-west", "Borivali", "Mumbai", 19.2307, 72.8567),
    entry("mum-dahisar", "Dahisar", "Mumbai", 19.2590, 72.8610),
    // Extended Western Line
    entry("mum-miraroad", "Mira Road", "Mumbai", 19.2870, 72.8720),
    entry("mum-bhayander", "Bhayandar", "Mumbai", 19.3010, 72.8510),
    entry("mum-vasai", "Vasai", "Mumbai", 19.3920, 72.8280),
    entry("mum-virar", "Virar", "Mumbai", 19.4550, 72.8110),
    // Thane
    entry("thane-west", "Thane West", "Thane", 19.2183, 72.9781),
    entry("thane-east", "Thane East", "Thane", 19.1860, 72.9756),
    entry("ghodbunder", "Ghodbunder Road", "Thane", 19.2560, 72.9670),
    // Navi Mumbai
    entry("navi-mumbai-vashi", "Vashi", "Navi Mumbai", 19.0771, 72.9986),
    entry("kharghar", "Kharghar", "Navi Mumbai", 19.0474, 73.0699),
    entry("panvel", "Panvel", "Navi Mumbai", 18.9894, 73.1175),
    entry("airoli", "Airoli", "Navi Mumbai", 19.1550, 72.9983),
    entry("belapur", "CBD Belapur", "Navi Mumbai", 19.0235, 73.0391),
    entry("nerul", "Nerul", "Navi Mumbai", 19.0330, 73.0160),
    // Bhiwandi
    entry("bhiwandi-kalher", "Kalher", "Bhiwandi", 19.2473, 73.0178),
    entry("bhiwandi-anjur", "Anjur", "Bhiwandi", 19.2750, 73.0280),
    entry("bhiwandi-kasheli", "Kasheli", "Bhiwandi", 19.2360, 73.0146),
];

// Pune, refreshed Monday evening IST.
const PUNE_AREAS: &[CatalogEntry] = &[
    // Core Pune
    entry("pune-kothrud", "Kothrud", "Pune", 18.5074, 73.8077),
    entry("pune-deccan", "Deccan", "Pune", 18.5170, 73.8400),
    entry("pune-shivaji", "Shivajinagar", "Pune", 18.5308, 73.8475),
    entry("pune-camp", "Camp", "Pune", 18.5140, 73.8800),
    // IT Corridor (West)
    entry("pune-baner", "Baner", "Pune", 18.5590, 73.7868),
    entry("pune-balewadi", "Balewadi", "Pune", 18.5726, 73.7698),
    entry("pune-wakad", "Wakad", "Pune", 18.5980, 73.7640),
    entry("pune-hinjewadi", "Hinjewadi", "Pune", 18.5912, 73.7380),
    entry("pune-tathawade", "Tathawade", "Pune", 18.6140, 73.7550),
    entry("pune-aundh", "Aundh", "Pune", 18.5580, 73.8070),
    entry("pune-pashan", "Pashan", "Pune", 18.5330, 73.7880),
    entry("pune-bavdhan", "Bavdhan", "Pune", 18.5120, 73.7690),
    // East Pune
    entry("pune-vimannagar", "Viman Nagar", "Pune", 18.5679, 73.9143),
    entry("pune-kalyani", "Kalyani Nagar", "Pune", 18.5462, 73.9020),
    entry("pune-koregaon", "Koregaon Park", "Pune", 18.5362, 73.8940),
    entry("pune-kharadi", "Kharadi", "Pune", 18.5530, 73.9470),
    entry("pune-hadapsar", "Hadapsar", "Pune", 18.5089, 73.9260),
    entry("pune-magarpatta", "Magarpatta", "Pune", 18.5158, 73.9280),
    entry("pune-wagholi", "Wagholi", "Pune", 18.5790, 73.9770),
    entry("pune-dhanori", "Dhanori", "Pune", 18.5880, 73.9060),
    // South Pune
    entry("pune-kondhwa", "Kondhwa", "Pune", 18.4650, 73.8930),
    entry("pune-undri", "Undri", "Pune", 18.4580, 73.9100),
    entry("pune-wanowrie", "Wanowrie", "Pune", 18.4940, 73.8940),
    entry("pune-bibwewadi", "Bibwewadi", "Pune", 18.4830, 73.8630),
    entry("pune-warje", "Warje", "Pune", 18.4860, 73.8060),
    entry("pune-sinhagad", "Sinhagad Road", "Pune", 18.4740, 73.8220),
    // PCMC (Pimpri-Chinchwad)
    entry("pune-pimpri", "Pimpri", "Pune", 18.6298, 73.7997),
    entry("pune-chinchwad", "Chinchwad", "Pune", 18.6492, 73.7658),
    entry("pune-nigdi", "Nigdi", "Pune", 18.6518, 73.7708),
];
