//! Test fixtures and data for forecaster tests
//!
//! Consistent storms, cycles and forecast records used across all test suites.

use std::collections::BTreeMap;

use shared::{
    CycleTime, Development, ForecastRecord, KeyedRecord, Position, Radii, RecordKey, StormId, WindThreshold,
    FORECAST_AID,
};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const STORM: &'static str = "AL092024";
    pub const DTG: &'static str = "2024091012";
    pub const PRIOR_DTG: &'static str = "2024091006";
    pub const STORM_NAME: &'static str = "FRANCINE";
    pub const FORECASTER: &'static str = "JW";

    pub fn storm() -> StormId {
        StormId::new(Self::STORM)
    }

    pub fn cycle() -> CycleTime {
        CycleTime::from_dtg(Self::DTG).unwrap()
    }

    pub fn key(lead: i32, threshold: WindThreshold) -> RecordKey {
        RecordKey::new(FORECAST_AID, Self::cycle(), lead, threshold)
    }

    pub fn aid_key(aid: &str, lead: i32, threshold: WindThreshold) -> RecordKey {
        RecordKey::new(aid, Self::cycle(), lead, threshold)
    }

    /// A record with context fields filled in, so untouched fields are easy to check
    pub fn record(wind: u16, radii: Radii) -> ForecastRecord {
        ForecastRecord {
            position: Position { lat: 24.3, lon: -92.1 },
            storm_speed: Some(8),
            storm_direction: Some(330),
            max_wind: wind,
            gust: wind + 10,
            development: if wind >= 64 { Development::HU } else { Development::TS },
            wind_radii: radii,
            wave_radii: Radii::circle(60),
            mslp: Some(990),
            storm_name: Self::STORM_NAME.to_string(),
            forecaster: Self::FORECASTER.to_string(),
        }
    }

    /// Forecast used by most scenarios:
    /// - TAU 12: 45 kt, 34kt radii only
    /// - TAU 24: 70 kt, 34/50/64kt radii
    /// - TAU 36: 55 kt, 34/50kt radii, the 50kt quadrants all zero
    /// - TAU 96: 40 kt, no radii
    pub fn forecast() -> BTreeMap<RecordKey, ForecastRecord> {
        BTreeMap::from([
            (Self::key(12, WindThreshold::Kt34), Self::record(45, Radii::quadrants(60, 50, 30, 40))),
            (Self::key(24, WindThreshold::Kt34), Self::record(70, Radii::quadrants(90, 80, 60, 70))),
            (Self::key(24, WindThreshold::Kt50), Self::record(70, Radii::quadrants(40, 40, 30, 30))),
            (Self::key(24, WindThreshold::Kt64), Self::record(70, Radii::circle(20))),
            (Self::key(36, WindThreshold::Kt34), Self::record(55, Radii::circle(70))),
            (Self::key(36, WindThreshold::Kt50), Self::record(55, Radii::quadrants(0, 0, 0, 0))),
            (Self::key(96, WindThreshold::None), Self::record(40, Radii::default())),
        ])
    }

    pub fn keyed(records: &BTreeMap<RecordKey, ForecastRecord>) -> Vec<KeyedRecord> {
        records
            .iter()
            .map(|(key, record)| KeyedRecord::new(key.clone(), record.clone()))
            .collect()
    }

    /// Best-track records at the current and prior cycles
    pub fn best_track() -> Vec<KeyedRecord> {
        let prior = CycleTime::from_dtg(Self::PRIOR_DTG).unwrap();
        vec![
            KeyedRecord::new(
                RecordKey::new("BEST", prior, 0, WindThreshold::Kt34),
                Self::record(40, Radii::circle(50)),
            ),
            KeyedRecord::new(
                RecordKey::new("BEST", Self::cycle(), 0, WindThreshold::Kt34),
                Self::record(50, Radii::circle(70)),
            ),
            KeyedRecord::new(
                RecordKey::new("BEST", Self::cycle(), 0, WindThreshold::Kt50),
                Self::record(50, Radii::circle(30)),
            ),
        ]
    }
}
