//! Core identity types shared by every forecast component
//!
//! A forecast record is identified by the aid (technique) that produced it,
//! the cycle it belongs to, its lead time and its wind-radii threshold.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{SharedError, SharedResult};

/// Technique name of the official forecast aid
pub const OFFICIAL_AID: &str = "OFCL";

/// Technique name used for the working forecast track
pub const FORECAST_AID: &str = "FCST";

/// Storm identifier, e.g. `AL092024`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StormId(String);

impl StormId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference time of a forecast run, rendered as a 10-digit DTG (`YYYYMMDDHH`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CycleTime(DateTime<Utc>);

impl CycleTime {
    const DTG_FORMAT: &'static str = "%Y%m%d%H";

    /// Build a cycle time, truncating anything below the hour
    pub fn new(time: DateTime<Utc>) -> Self {
        let truncated = time
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time);
        Self(truncated)
    }

    /// Parse a `YYYYMMDDHH` date-time group
    pub fn from_dtg(dtg: &str) -> SharedResult<Self> {
        let trimmed = dtg.trim();
        if trimmed.len() != 10 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(SharedError::InvalidDtg { input: dtg.to_string() });
        }
        let naive = NaiveDateTime::parse_from_str(&format!("{trimmed}00"), "%Y%m%d%H%M")
            .map_err(|_| SharedError::InvalidDtg { input: dtg.to_string() })?;
        Ok(Self(Utc.from_utc_datetime(&naive)))
    }

    pub fn to_dtg(&self) -> String {
        self.0.format(Self::DTG_FORMAT).to_string()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Valid time of a forecast made at this cycle for the given lead
    pub fn valid_time(&self, lead_hours: i32) -> DateTime<Utc> {
        self.0 + chrono::Duration::hours(i64::from(lead_hours))
    }
}

impl fmt::Display for CycleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dtg())
    }
}

impl FromStr for CycleTime {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dtg(s)
    }
}

impl TryFrom<String> for CycleTime {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_dtg(&value)
    }
}

impl From<CycleTime> for String {
    fn from(value: CycleTime) -> Self {
        value.to_dtg()
    }
}

/// Wind-radii category of a record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum WindThreshold {
    /// Track/intensity-only record with no wind radii
    None,
    Kt34,
    Kt50,
    Kt64,
}

impl WindThreshold {
    /// Thresholds that carry wind radii, lowest first
    pub const RADII: [WindThreshold; 3] = [WindThreshold::Kt34, WindThreshold::Kt50, WindThreshold::Kt64];

    pub fn knots(&self) -> u16 {
        match self {
            WindThreshold::None => 0,
            WindThreshold::Kt34 => 34,
            WindThreshold::Kt50 => 50,
            WindThreshold::Kt64 => 64,
        }
    }

    /// Next threshold down the 64 → 50 → 34 chain
    pub fn next_lower(&self) -> Option<WindThreshold> {
        match self {
            WindThreshold::Kt64 => Some(WindThreshold::Kt50),
            WindThreshold::Kt50 => Some(WindThreshold::Kt34),
            WindThreshold::Kt34 | WindThreshold::None => None,
        }
    }

    pub fn is_radii(&self) -> bool {
        !matches!(self, WindThreshold::None)
    }
}

impl fmt::Display for WindThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kt", self.knots())
    }
}

impl TryFrom<u16> for WindThreshold {
    type Error = SharedError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WindThreshold::None),
            34 => Ok(WindThreshold::Kt34),
            50 => Ok(WindThreshold::Kt50),
            64 => Ok(WindThreshold::Kt64),
            other => Err(SharedError::InvalidThreshold { value: other }),
        }
    }
}

impl From<WindThreshold> for u16 {
    fn from(value: WindThreshold) -> Self {
        value.knots()
    }
}

/// Composite identity of a forecast record
///
/// Ordering is aid, cycle, lead, threshold so sorted batches come out by lead
/// time first and wind radii second.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub aid: String,
    pub cycle: CycleTime,
    pub lead_hours: i32,
    pub threshold: WindThreshold,
}

impl RecordKey {
    pub fn new(aid: impl Into<String>, cycle: CycleTime, lead_hours: i32, threshold: WindThreshold) -> Self {
        Self {
            aid: aid.into(),
            cycle,
            lead_hours,
            threshold,
        }
    }

    /// Same aid/cycle/lead with a different threshold
    pub fn with_threshold(&self, threshold: WindThreshold) -> Self {
        Self {
            threshold,
            ..self.clone()
        }
    }

    /// Same cycle/lead/threshold under another aid
    pub fn with_aid(&self, aid: impl Into<String>) -> Self {
        Self {
            aid: aid.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/TAU{}/{}",
            self.aid, self.cycle, self.lead_hours, self.threshold
        )
    }
}

/// Identifier of one edit session, carried on its log events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a server-side staging area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SandboxId(pub i64);

impl fmt::Display for SandboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sandbox#{}", self.0)
    }
}

/// Deck a secondary record batch belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckType {
    /// Objective aids
    A,
    /// Best track
    B,
    /// Fixes
    F,
}

impl fmt::Display for DeckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckType::A => write!(f, "A"),
            DeckType::B => write!(f, "B"),
            DeckType::F => write!(f, "F"),
        }
    }
}

/// The forecast dimension a session edits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastAspect {
    Track,
    Intensity,
    WindRadii,
    Seas,
}

impl fmt::Display for ForecastAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastAspect::Track => write!(f, "track"),
            ForecastAspect::Intensity => write!(f, "intensity"),
            ForecastAspect::WindRadii => write!(f, "wind-radii"),
            ForecastAspect::Seas => write!(f, "seas"),
        }
    }
}

impl FromStr for ForecastAspect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "track" => Ok(ForecastAspect::Track),
            "intensity" => Ok(ForecastAspect::Intensity),
            "wind-radii" | "windradii" | "radii" => Ok(ForecastAspect::WindRadii),
            "seas" => Ok(ForecastAspect::Seas),
            _ => Err(format!("Unknown forecast aspect: {s}")),
        }
    }
}
