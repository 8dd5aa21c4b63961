//! Editability and completeness rules for wind radii

use shared::{SiteLimits, WindThreshold};

use crate::core::store::RecordStore;
use crate::error::ForecastError;

/// Thresholds at one lead whose radii are missing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletenessReport {
    pub lead_hours: i32,
    pub missing: Vec<WindThreshold>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn message(&self) -> String {
        if self.missing.is_empty() {
            return format!("Wind radii complete at TAU {}", self.lead_hours);
        }
        let thresholds: Vec<String> = self.missing.iter().map(|t| t.to_string()).collect();
        format!(
            "Missing wind radii for {} at TAU {}",
            thresholds.join(", "),
            self.lead_hours
        )
    }

    pub fn into_result(self) -> Result<(), ForecastError> {
        if self.is_complete() {
            return Ok(());
        }
        let message = self.message();
        Err(ForecastError::IncompleteForecast {
            lead_hours: self.lead_hours,
            thresholds: self.missing,
            message,
        })
    }
}

/// Wind-radii policy driven by the site's lead-time limits
#[derive(Clone, Debug, Default)]
pub struct WindRadiiPolicy {
    limits: SiteLimits,
}

impl WindRadiiPolicy {
    pub fn new(limits: SiteLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SiteLimits {
        &self.limits
    }

    /// Longest lead carrying radii for a threshold
    pub fn threshold_horizon(&self, threshold: WindThreshold) -> i32 {
        match threshold {
            WindThreshold::Kt64 => self.limits.radii_64kt_horizon,
            _ => self.limits.all_radii_horizon,
        }
    }

    pub fn is_lead_time_editable(&self, store: &RecordStore, lead_hours: i32) -> bool {
        if lead_hours <= 0 || lead_hours > self.limits.forecast_horizon {
            return false;
        }
        if lead_hours == self.limits.extended_lead && !self.limits.use_extended_lead {
            return false;
        }
        self.is_threshold_editable(store, WindThreshold::Kt34, lead_hours)
    }

    /// Whether radii for `threshold` may be edited at `lead_hours`
    ///
    /// Independent of [`Self::is_lead_time_editable`].
    pub fn is_threshold_editable(&self, store: &RecordStore, threshold: WindThreshold, lead_hours: i32) -> bool {
        if lead_hours > self.threshold_horizon(threshold) {
            return false;
        }
        if !threshold.is_radii() {
            return false;
        }
        match store.lookup(lead_hours, WindThreshold::Kt34) {
            Some(base) => base.max_wind >= threshold.knots(),
            None => false,
        }
    }

    /// Flag every existing threshold record at a lead whose radii are degenerate
    pub fn validate_completeness(&self, store: &RecordStore, lead_hours: i32) -> CompletenessReport {
        let missing = WindThreshold::RADII
            .into_iter()
            .filter(|threshold| {
                store
                    .lookup(lead_hours, *threshold)
                    .is_some_and(|record| record.wind_radii.is_degenerate())
            })
            .collect();
        CompletenessReport { lead_hours, missing }
    }
}
