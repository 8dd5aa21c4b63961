//! Service-specific tests
//!
//! Each file-backed service has its own test file; all of them work in a
//! fresh temporary directory.

mod aid_store;
mod staging;

// Common test utilities for services
pub mod common {
    use shared::{CycleTime, ForecastRecord, KeyedRecord, Radii, RecordKey, WindThreshold};

    pub const TEST_DTG: &str = "2024091012";

    pub fn cycle() -> CycleTime {
        CycleTime::from_dtg(TEST_DTG).expect("Valid test DTG")
    }

    /// A keyed record with recognisable intensity and radii
    pub fn keyed(aid: &str, lead: i32, threshold: WindThreshold, wind: u16) -> KeyedRecord {
        KeyedRecord::new(
            RecordKey::new(aid, cycle(), lead, threshold),
            ForecastRecord {
                max_wind: wind,
                wind_radii: Radii::circle(wind),
                ..Default::default()
            },
        )
    }
}
