//! Initial forecast records for an edit session

use std::collections::BTreeMap;

use shared::{CycleTime, ForecastRecord, KeyedRecord, RecordKey};

/// Where a seeded forecast came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedSource {
    /// The forecast already saved for this cycle
    PriorForecast,
    /// Best-track records at this cycle, re-keyed to the primary aid
    BestTrack,
    Empty,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeededForecast {
    pub source: SeedSource,
    pub records: BTreeMap<RecordKey, ForecastRecord>,
}

/// Pick the starting records for `cycle`
///
/// A prior forecast is only reused when it was made for the same cycle;
/// otherwise the best track at that cycle becomes the new forecast.
pub fn seed_forecast(
    cycle: CycleTime,
    primary_aid: &str,
    prior_forecast: Vec<KeyedRecord>,
    best_track: &[KeyedRecord],
) -> SeededForecast {
    let prior: BTreeMap<RecordKey, ForecastRecord> = prior_forecast
        .into_iter()
        .filter(|r| r.key.cycle == cycle && r.key.aid == primary_aid)
        .map(|r| (r.key, r.record))
        .collect();
    if !prior.is_empty() {
        return SeededForecast {
            source: SeedSource::PriorForecast,
            records: prior,
        };
    }

    let from_best_track: BTreeMap<RecordKey, ForecastRecord> = best_track
        .iter()
        .filter(|r| r.key.cycle == cycle)
        .map(|r| (r.key.with_aid(primary_aid), r.record.clone()))
        .collect();
    let source = if from_best_track.is_empty() {
        SeedSource::Empty
    } else {
        SeedSource::BestTrack
    };
    SeededForecast {
        source,
        records: from_best_track,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Radii, WindThreshold, FORECAST_AID};

    fn keyed(aid: &str, dtg: &str, lead: i32, threshold: WindThreshold, wind: u16) -> KeyedRecord {
        KeyedRecord::new(
            RecordKey::new(aid, CycleTime::from_dtg(dtg).unwrap(), lead, threshold),
            ForecastRecord {
                max_wind: wind,
                wind_radii: Radii::circle(40),
                storm_name: "ALPHA".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_stale_prior_forecast_is_replaced_by_best_track() {
        let cycle = CycleTime::from_dtg("2024091012").unwrap();
        let prior = vec![keyed(FORECAST_AID, "2024091006", 12, WindThreshold::Kt34, 60)];
        let best_track = vec![
            keyed("BEST", "2024091012", 0, WindThreshold::Kt34, 55),
            keyed("BEST", "2024091012", 0, WindThreshold::Kt50, 55),
            keyed("BEST", "2024091006", 0, WindThreshold::Kt34, 50),
        ];

        let seeded = seed_forecast(cycle, FORECAST_AID, prior, &best_track);

        assert_eq!(seeded.source, SeedSource::BestTrack);
        assert_eq!(seeded.records.len(), 2);
        let (key, record) = seeded.records.iter().next().unwrap();
        assert_eq!(key.aid, FORECAST_AID);
        assert_eq!(record.storm_name, "ALPHA");
        assert_eq!(record.wind_radii, Radii::circle(40));
    }

    #[test]
    fn test_same_cycle_prior_forecast_is_kept() {
        let cycle = CycleTime::from_dtg("2024091012").unwrap();
        let prior = vec![keyed(FORECAST_AID, "2024091012", 12, WindThreshold::Kt34, 60)];

        let seeded = seed_forecast(cycle, FORECAST_AID, prior, &[]);
        assert_eq!(seeded.source, SeedSource::PriorForecast);

        let empty = seed_forecast(cycle, FORECAST_AID, Vec::new(), &[]);
        assert_eq!(empty.source, SeedSource::Empty);
        assert!(empty.records.is_empty());
    }
}
