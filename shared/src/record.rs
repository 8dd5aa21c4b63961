//! Forecast record payloads
//!
//! A record groups the fields edited by the four forecast aspects (track,
//! intensity, wind radii, seas) with context fields that no session edits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ForecastAspect, RecordKey};

/// Largest radius (nm) accepted for wind or wave radii
pub const MAX_RADIUS_NM: u16 = 995;

/// Largest sustained wind (kt) accepted for intensity
pub const MAX_WIND_KT: u16 = 250;

/// Whether a radii set holds one shared value or four independent ones
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuadrantMode {
    #[serde(rename = "AAA")]
    Circle,
    #[default]
    #[serde(rename = "NEQ")]
    Quadrant,
}

impl QuadrantMode {
    pub fn code(&self) -> &'static str {
        match self {
            QuadrantMode::Circle => "AAA",
            QuadrantMode::Quadrant => "NEQ",
        }
    }
}

impl fmt::Display for QuadrantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Radii (nm) for the NE, SE, SW and NW quadrants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Radii {
    pub mode: QuadrantMode,
    pub quadrants: [u16; 4],
}

impl Radii {
    pub fn circle(radius: u16) -> Self {
        Self {
            mode: QuadrantMode::Circle,
            quadrants: [radius; 4],
        }
    }

    pub fn quadrants(ne: u16, se: u16, sw: u16, nw: u16) -> Self {
        Self {
            mode: QuadrantMode::Quadrant,
            quadrants: [ne, se, sw, nw],
        }
    }

    /// Radii that cannot describe a wind field: an empty circle, or four empty quadrants
    pub fn is_degenerate(&self) -> bool {
        match self.mode {
            QuadrantMode::Circle => self.quadrants[0] == 0,
            QuadrantMode::Quadrant => self.quadrants.iter().all(|q| *q == 0),
        }
    }

    pub fn clear(&mut self) {
        self.quadrants = [0; 4];
    }
}

/// Development stage of the system
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Development {
    DB,
    TD,
    TS,
    TY,
    ST,
    TC,
    HU,
    SD,
    SS,
    EX,
    IN,
    DS,
    LO,
    WV,
    ET,
    PT,
    #[default]
    XX,
}

impl Development {
    pub fn description(&self) -> &'static str {
        match self {
            Development::DB => "disturbance",
            Development::TD => "tropical depression",
            Development::TS => "tropical storm",
            Development::TY => "typhoon",
            Development::ST => "super typhoon",
            Development::TC => "tropical cyclone",
            Development::HU => "hurricane",
            Development::SD => "subtropical depression",
            Development::SS => "subtropical storm",
            Development::EX => "extratropical cyclone",
            Development::IN => "inland",
            Development::DS => "dissipating",
            Development::LO => "low",
            Development::WV => "tropical wave",
            Development::ET => "extrapolated",
            Development::PT => "post-tropical cyclone",
            Development::XX => "unknown",
        }
    }
}

impl std::str::FromStr for Development {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stage = match s.trim().to_uppercase().as_str() {
            "DB" => Development::DB,
            "TD" => Development::TD,
            "TS" => Development::TS,
            "TY" => Development::TY,
            "ST" => Development::ST,
            "TC" => Development::TC,
            "HU" => Development::HU,
            "SD" => Development::SD,
            "SS" => Development::SS,
            "EX" => Development::EX,
            "IN" => Development::IN,
            "DS" => Development::DS,
            "LO" => Development::LO,
            "WV" => Development::WV,
            "ET" => Development::ET,
            "PT" => Development::PT,
            "XX" => Development::XX,
            other => return Err(format!("Unknown development stage: {other}")),
        };
        Ok(stage)
    }
}

/// Storm center position in decimal degrees (east longitude positive)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

/// One forecast record
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    // Track
    pub position: Position,
    pub storm_speed: Option<u16>,
    pub storm_direction: Option<u16>,

    // Intensity
    pub max_wind: u16,
    pub gust: u16,
    pub development: Development,

    // Wind radii
    pub wind_radii: Radii,

    // Seas (12 ft)
    pub wave_radii: Radii,

    // Context, never edited by a session
    pub mslp: Option<u16>,
    pub storm_name: String,
    pub forecaster: String,
}

impl ForecastRecord {
    /// Copy the fields owned by `aspect` from `source`, leaving everything else intact
    pub fn copy_aspect_from(&mut self, source: &ForecastRecord, aspect: ForecastAspect) {
        match aspect {
            ForecastAspect::Track => {
                self.position = source.position;
                self.storm_speed = source.storm_speed;
                self.storm_direction = source.storm_direction;
            }
            ForecastAspect::Intensity => {
                self.max_wind = source.max_wind;
                self.gust = source.gust;
                self.development = source.development;
            }
            ForecastAspect::WindRadii => {
                self.wind_radii = source.wind_radii;
            }
            ForecastAspect::Seas => {
                self.wave_radii = source.wave_radii;
            }
        }
    }
}

/// A record together with its identity, as exchanged with remote stores
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyedRecord {
    pub key: RecordKey,
    pub record: ForecastRecord,
}

impl KeyedRecord {
    pub fn new(key: RecordKey, record: ForecastRecord) -> Self {
        Self { key, record }
    }
}

/// How a secondary record in a batch update should be applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditType {
    New,
    Modify,
    Delete,
}

impl fmt::Display for EditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditType::New => write!(f, "NEW"),
            EditType::Modify => write!(f, "MODIFY"),
            EditType::Delete => write!(f, "DELETE"),
        }
    }
}

/// A secondary record tagged with its edit type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModifiedRecord {
    pub edit_type: EditType,
    pub record: KeyedRecord,
}
