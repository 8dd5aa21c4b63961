//! Cross-record invariant checks over a set of forecast records

use std::collections::BTreeMap;
use std::fmt;

use shared::{ForecastRecord, QuadrantMode, Radii, RecordKey, WindThreshold};

/// One broken cross-record rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// A radii record whose lead intensity is below its threshold, or has no base record
    UnsupportedThreshold { key: RecordKey, base_intensity: Option<u16> },
    /// A primary-aid radii record without the next lower threshold
    MissingLowerThreshold { key: RecordKey, missing: WindThreshold },
    /// Circle-mode radii whose quadrants disagree
    InconsistentCircle { key: RecordKey, field: &'static str },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnsupportedThreshold {
                key,
                base_intensity: Some(wind),
            } => write!(f, "{key}: intensity {wind} kt is below the threshold"),
            Violation::UnsupportedThreshold {
                key,
                base_intensity: None,
            } => write!(f, "{key}: no base record at this lead"),
            Violation::MissingLowerThreshold { key, missing } => write!(f, "{key}: no {missing} record"),
            Violation::InconsistentCircle { key, field } => write!(f, "{key}: {field} circle quadrants differ"),
        }
    }
}

fn circle_consistent(radii: &Radii) -> bool {
    radii.mode != QuadrantMode::Circle || radii.quadrants.iter().all(|q| *q == radii.quadrants[0])
}

/// Report every violation in a record set
///
/// The threshold chain (64 ⇒ 50 ⇒ 34) is only enforced for `primary_aid`.
pub fn audit<'r>(
    records: impl IntoIterator<Item = (&'r RecordKey, &'r ForecastRecord)>,
    primary_aid: &str,
) -> Vec<Violation> {
    let records: BTreeMap<&RecordKey, &ForecastRecord> = records.into_iter().collect();
    let mut violations = Vec::new();

    for (key, record) in &records {
        if key.threshold.is_radii() {
            let base = [WindThreshold::Kt34, WindThreshold::None]
                .into_iter()
                .find_map(|t| records.get(&key.with_threshold(t)));
            match base {
                Some(base) if base.max_wind >= key.threshold.knots() => {}
                Some(base) => violations.push(Violation::UnsupportedThreshold {
                    key: (*key).clone(),
                    base_intensity: Some(base.max_wind),
                }),
                None => violations.push(Violation::UnsupportedThreshold {
                    key: (*key).clone(),
                    base_intensity: None,
                }),
            }

            if key.aid == primary_aid {
                if let Some(lower) = key.threshold.next_lower() {
                    if !records.contains_key(&key.with_threshold(lower)) {
                        violations.push(Violation::MissingLowerThreshold {
                            key: (*key).clone(),
                            missing: lower,
                        });
                    }
                }
            }
        }

        if !circle_consistent(&record.wind_radii) {
            violations.push(Violation::InconsistentCircle {
                key: (*key).clone(),
                field: "wind radii",
            });
        }
        if !circle_consistent(&record.wave_radii) {
            violations.push(Violation::InconsistentCircle {
                key: (*key).clone(),
                field: "wave radii",
            });
        }
    }
    violations
}
