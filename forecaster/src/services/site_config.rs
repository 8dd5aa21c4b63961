//! Site preferences from the environment
//!
//! ## Configuration Sources
//! Values are loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! ## Keys
//! - `ATCF_FORECAST_HORIZON`: longest editable lead time (default 120)
//! - `ATCF_TAU_LIMIT_ALL_WIND_RADII`: longest lead with 34/50kt radii (default 72)
//! - `ATCF_TAU_LIMIT_64KT_WIND_RADII`: longest lead with 64kt radii (default 48)
//! - `ATCF_USE_TAU60`: enable the TAU 60 forecast (default false)
//! - `ATCF_GUST_FILE`: path to a `wind gust` pair table (optional)

use std::collections::HashMap;

use shared::{GustTable, SiteLimits};

use crate::error::{ForecastError, ForecastResult};
use crate::traits::SiteConfigSource;

/// Site configuration read from environment variables
pub struct EnvSiteConfig {
    /// Fixed values used instead of the process environment
    vars: Option<HashMap<String, String>>,
}

impl EnvSiteConfig {
    pub const FORECAST_HORIZON: &'static str = "ATCF_FORECAST_HORIZON";
    pub const ALL_RADII_HORIZON: &'static str = "ATCF_TAU_LIMIT_ALL_WIND_RADII";
    pub const RADII_64KT_HORIZON: &'static str = "ATCF_TAU_LIMIT_64KT_WIND_RADII";
    pub const USE_EXTENDED_LEAD: &'static str = "ATCF_USE_TAU60";
    pub const GUST_FILE: &'static str = "ATCF_GUST_FILE";

    pub fn new() -> Self {
        // Missing .env is fine
        let _ = dotenv::dotenv();
        Self { vars: None }
    }

    /// Read from a fixed set of variables instead of the environment
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars: Some(vars) }
    }

    fn var(&self, name: &str) -> Option<String> {
        let value = match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn lead(&self, name: &str, default: i32) -> ForecastResult<i32> {
        match self.var(name) {
            None => Ok(default),
            Some(value) => value
                .parse::<i32>()
                .map_err(|_| ForecastError::config(name, format!("{value:?} is not a lead time"))),
        }
    }

    fn flag(&self, name: &str, default: bool) -> ForecastResult<bool> {
        match self.var(name).map(|v| v.to_lowercase()) {
            None => Ok(default),
            Some(value) => match value.as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(ForecastError::config(name, format!("{value:?} is not a boolean"))),
            },
        }
    }
}

impl Default for EnvSiteConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteConfigSource for EnvSiteConfig {
    fn site_limits(&self) -> ForecastResult<SiteLimits> {
        let defaults = SiteLimits::default();

        let gust_table = match self.var(Self::GUST_FILE) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)?;
                GustTable::parse(&text)?
            }
            None => GustTable::default(),
        };

        let limits = SiteLimits {
            forecast_horizon: self.lead(Self::FORECAST_HORIZON, defaults.forecast_horizon)?,
            all_radii_horizon: self.lead(Self::ALL_RADII_HORIZON, defaults.all_radii_horizon)?,
            radii_64kt_horizon: self.lead(Self::RADII_64KT_HORIZON, defaults.radii_64kt_horizon)?,
            extended_lead: defaults.extended_lead,
            use_extended_lead: self.flag(Self::USE_EXTENDED_LEAD, defaults.use_extended_lead)?,
            gust_table,
        };
        limits.validate()?;
        Ok(limits)
    }
}
