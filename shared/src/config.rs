//! Site forecast preferences

use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};

/// Ratio applied to the sustained wind when no gust pair covers it
pub const DEFAULT_GUST_FACTOR: f64 = 1.2;

/// Round to the nearest multiple of 5, halves rounding up
pub fn round_to_five(value: f64) -> i64 {
    ((value / 5.0 + 0.5).floor() as i64) * 5
}

/// Maximum wind → gust pairs, ordered by wind
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GustTable {
    pairs: Vec<(u16, u16)>,
}

impl GustTable {
    pub fn new(mut pairs: Vec<(u16, u16)>) -> Self {
        pairs.sort_by_key(|(wind, _)| *wind);
        pairs.dedup_by_key(|(wind, _)| *wind);
        Self { pairs }
    }

    /// Parse `wind gust` lines; blank lines and `#` comments are skipped
    pub fn parse(text: &str) -> SharedResult<Self> {
        let mut pairs = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(wind), Some(gust)) = (fields.next(), fields.next()) else {
                return Err(SharedError::InvalidConfig {
                    field: "gust_table".to_string(),
                    value: line.to_string(),
                });
            };
            let parse = |v: &str| {
                v.parse::<u16>().map_err(|_| SharedError::InvalidConfig {
                    field: "gust_table".to_string(),
                    value: line.to_string(),
                })
            };
            pairs.push((parse(wind)?, parse(gust)?));
        }
        Ok(Self::new(pairs))
    }

    /// Gust for a sustained wind: the pair with the highest wind not above it,
    /// or the default factor when the table has nothing that low
    pub fn gust_for(&self, max_wind: u16) -> u16 {
        match self.pairs.iter().rev().find(|(wind, _)| *wind <= max_wind) {
            Some((_, gust)) => *gust,
            None => round_to_five(f64::from(max_wind) * DEFAULT_GUST_FACTOR).clamp(0, i64::from(u16::MAX)) as u16,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Lead-time limits and options configured for the forecasting site
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLimits {
    /// Longest lead time (hours) that can be edited at all
    pub forecast_horizon: i32,
    /// Longest lead time carrying 34/50kt wind radii
    pub all_radii_horizon: i32,
    /// Longest lead time carrying 64kt wind radii
    pub radii_64kt_horizon: i32,
    /// The optional extended lead time
    pub extended_lead: i32,
    pub use_extended_lead: bool,
    pub gust_table: GustTable,
}

impl Default for SiteLimits {
    fn default() -> Self {
        Self {
            forecast_horizon: 120,
            all_radii_horizon: 72,
            radii_64kt_horizon: 48,
            extended_lead: 60,
            use_extended_lead: false,
            gust_table: GustTable::default(),
        }
    }
}

impl SiteLimits {
    pub fn validate(&self) -> SharedResult<()> {
        let checks = [
            ("forecast_horizon", self.forecast_horizon),
            ("all_radii_horizon", self.all_radii_horizon),
            ("radii_64kt_horizon", self.radii_64kt_horizon),
            ("extended_lead", self.extended_lead),
        ];
        for (field, value) in checks {
            if value <= 0 {
                return Err(SharedError::InvalidConfig {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
