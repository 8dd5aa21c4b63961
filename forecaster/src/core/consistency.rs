//! Edit operations that keep a forecast's threshold records consistent
//!
//! Intensity edits update the lead's base record immediately and compute the
//! 50/64kt cascade into [`PendingChanges`]. The cascade reaches the records
//! only when the owning session applies its changes.

use std::collections::{BTreeMap, BTreeSet};

use shared::{
    round_to_five, Development, ForecastAspect, ForecastRecord, KeyedRecord, Position, QuadrantMode, Radii, RecordKey,
    WindThreshold, MAX_RADIUS_NM, MAX_WIND_KT,
};

use crate::core::policy::WindRadiiPolicy;
use crate::core::store::RecordStore;
use crate::error::{ForecastError, ForecastResult};

/// Intensity fields propagated from a lead's base record to its 50/64kt records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntensityFields {
    pub max_wind: u16,
    pub gust: u16,
    pub development: Development,
}

impl IntensityFields {
    pub fn of(record: &ForecastRecord) -> Self {
        Self {
            max_wind: record.max_wind,
            gust: record.gust,
            development: record.development,
        }
    }

    pub fn apply_to(&self, record: &mut ForecastRecord) {
        record.max_wind = self.max_wind;
        record.gust = self.gust;
        record.development = self.development;
    }
}

/// Cascade results waiting for the session to apply them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingChanges {
    additions: BTreeMap<RecordKey, ForecastRecord>,
    removals: BTreeSet<RecordKey>,
    intensity_syncs: BTreeMap<RecordKey, IntensityFields>,
}

impl PendingChanges {
    pub fn additions(&self) -> &BTreeMap<RecordKey, ForecastRecord> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeSet<RecordKey> {
        &self.removals
    }

    pub fn intensity_syncs(&self) -> &BTreeMap<RecordKey, IntensityFields> {
        &self.intensity_syncs
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.intensity_syncs.is_empty()
    }

    /// Take everything pending, leaving this empty
    pub fn take(&mut self) -> PendingChanges {
        std::mem::take(self)
    }

    fn clear_lead(&mut self, lead_hours: i32) {
        self.additions.retain(|key, _| key.lead_hours != lead_hours);
        self.removals.retain(|key| key.lead_hours != lead_hours);
        self.intensity_syncs.retain(|key, _| key.lead_hours != lead_hours);
    }
}

/// Parse a numeric text field, keeping the caller's value untouched on failure
fn parse_number(field: &str, text: &str) -> ForecastResult<i32> {
    text.trim().parse::<i32>().map_err(|_| ForecastError::MalformedInput {
        field: field.to_string(),
        input: text.to_string(),
    })
}

fn check_radius(field: &str, raw: i32) -> ForecastResult<u16> {
    if !(0..=i32::from(MAX_RADIUS_NM)).contains(&raw) {
        return Err(ForecastError::validation(
            field,
            format!("{raw} nm outside 0..={MAX_RADIUS_NM}"),
        ));
    }
    let rounded = round_to_five(f64::from(raw)).min(i64::from(MAX_RADIUS_NM));
    Ok(rounded as u16)
}

fn check_quadrant(quadrant: usize) -> ForecastResult<()> {
    if quadrant >= 4 {
        return Err(ForecastError::validation("quadrant", format!("{quadrant} is not a quadrant index")));
    }
    Ok(())
}

fn set_radius(radii: &mut Radii, quadrant: usize, value: u16) {
    match radii.mode {
        QuadrantMode::Circle => radii.quadrants = [value; 4],
        QuadrantMode::Quadrant => radii.quadrants[quadrant] = value,
    }
}

fn toggle_mode(radii: &mut Radii, to_circle: bool) {
    if to_circle {
        let q1 = round_to_five(f64::from(radii.quadrants[0])).min(i64::from(MAX_RADIUS_NM)) as u16;
        radii.quadrants = [q1; 4];
        radii.mode = QuadrantMode::Circle;
    } else {
        // Values carried over from circle mode stay as they are
        radii.mode = QuadrantMode::Quadrant;
    }
}

/// Mutation operations over a working store
///
/// Each operation belongs to one forecast aspect and is rejected when the
/// engine edits a different one.
pub struct ConsistencyEngine<'a> {
    store: &'a mut RecordStore,
    pending: &'a mut PendingChanges,
    policy: &'a WindRadiiPolicy,
    aspect: ForecastAspect,
}

impl<'a> ConsistencyEngine<'a> {
    pub fn new(
        store: &'a mut RecordStore,
        pending: &'a mut PendingChanges,
        policy: &'a WindRadiiPolicy,
        aspect: ForecastAspect,
    ) -> Self {
        Self {
            store,
            pending,
            policy,
            aspect,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &*self.store
    }

    pub fn pending(&self) -> &PendingChanges {
        &*self.pending
    }

    pub fn aspect(&self) -> ForecastAspect {
        self.aspect
    }

    // Intensity

    /// Set the maximum wind at a lead and recompute that lead's cascade
    pub fn set_intensity(&mut self, lead_hours: i32, value: i32) -> ForecastResult<()> {
        self.require(ForecastAspect::Intensity, "intensity")?;
        if !(0..=i32::from(MAX_WIND_KT)).contains(&value) {
            return Err(ForecastError::validation(
                "intensity",
                format!("{value} kt outside 0..={MAX_WIND_KT}"),
            ));
        }
        let wind = value as u16;
        let gust = self.policy.limits().gust_table.gust_for(wind);
        self.update_base(lead_hours, |record| {
            record.max_wind = wind;
            record.gust = gust;
        })
    }

    pub fn set_intensity_text(&mut self, lead_hours: i32, text: &str) -> ForecastResult<()> {
        self.require(ForecastAspect::Intensity, "intensity")?;
        let value = parse_number("intensity", text)?;
        self.set_intensity(lead_hours, value)
    }

    /// Override the gust derived from the intensity
    pub fn set_gust(&mut self, lead_hours: i32, value: i32) -> ForecastResult<()> {
        self.require(ForecastAspect::Intensity, "gust")?;
        let limit = i32::from(MAX_WIND_KT) * 2;
        if !(0..=limit).contains(&value) {
            return Err(ForecastError::validation("gust", format!("{value} kt outside 0..={limit}")));
        }
        self.update_base(lead_hours, |record| record.gust = value as u16)
    }

    pub fn set_development(&mut self, lead_hours: i32, development: Development) -> ForecastResult<()> {
        self.require(ForecastAspect::Intensity, "development")?;
        self.update_base(lead_hours, |record| record.development = development)
    }

    fn update_base(&mut self, lead_hours: i32, edit: impl FnOnce(&mut ForecastRecord)) -> ForecastResult<()> {
        let (key, base) = self
            .store
            .lookup_base(lead_hours)
            .ok_or(ForecastError::missing(lead_hours, WindThreshold::Kt34))?;
        let mut base = base.clone();
        edit(&mut base);
        let fields = IntensityFields::of(&base);
        self.store.put(key.clone(), base);
        if key.threshold == WindThreshold::Kt34 {
            self.cascade_intensity(&key, fields);
        }
        Ok(())
    }

    /// Compute 50/64kt creations, removals and syncs for a new base intensity
    fn cascade_intensity(&mut self, base_key: &RecordKey, fields: IntensityFields) {
        self.pending.clear_lead(base_key.lead_hours);

        let Some(mut source) = self.store.get(base_key).cloned() else {
            return;
        };
        for threshold in [WindThreshold::Kt50, WindThreshold::Kt64] {
            let key = base_key.with_threshold(threshold);
            let above = fields.max_wind >= threshold.knots();
            match (self.store.get(&key), above) {
                (Some(_), false) => {
                    self.pending.removals.insert(key);
                }
                (Some(existing), true) => {
                    let mut synced = existing.clone();
                    fields.apply_to(&mut synced);
                    self.pending.intensity_syncs.insert(key, fields);
                    source = synced;
                }
                (None, true) => {
                    let mut created = source.clone();
                    fields.apply_to(&mut created);
                    self.pending.additions.insert(key, created.clone());
                    source = created;
                }
                (None, false) => {}
            }
        }
    }

    // Wind radii

    /// Set one quadrant's radius (0 = NE, clockwise); circle mode sets all four
    pub fn set_quadrant_value(
        &mut self,
        lead_hours: i32,
        threshold: WindThreshold,
        quadrant: usize,
        raw: i32,
    ) -> ForecastResult<()> {
        self.require(ForecastAspect::WindRadii, "wind radii")?;
        check_quadrant(quadrant)?;
        let value = check_radius("wind radius", raw)?;
        let (key, mut record) = self.editable_slot(lead_hours, threshold)?;
        set_radius(&mut record.wind_radii, quadrant, value);
        self.store.put(key, record);
        Ok(())
    }

    pub fn set_quadrant_text(
        &mut self,
        lead_hours: i32,
        threshold: WindThreshold,
        quadrant: usize,
        text: &str,
    ) -> ForecastResult<()> {
        self.require(ForecastAspect::WindRadii, "wind radii")?;
        let raw = parse_number("wind radius", text)?;
        self.set_quadrant_value(lead_hours, threshold, quadrant, raw)
    }

    pub fn toggle_quadrant_mode(&mut self, lead_hours: i32, threshold: WindThreshold, to_circle: bool) -> ForecastResult<()> {
        self.require(ForecastAspect::WindRadii, "wind radii")?;
        let (key, mut record) = self.editable_slot(lead_hours, threshold)?;
        toggle_mode(&mut record.wind_radii, to_circle);
        self.store.put(key, record);
        Ok(())
    }

    /// Zero the radii of one threshold; absent records are skipped
    pub fn delete_threshold(&mut self, lead_hours: i32, threshold: WindThreshold) -> ForecastResult<usize> {
        self.require(ForecastAspect::WindRadii, "wind radii")?;
        if self.store.lookup(lead_hours, threshold).is_none() {
            return Ok(0);
        }
        let (key, mut record) = self.editable_slot(lead_hours, threshold)?;
        record.wind_radii.clear();
        self.store.put(key, record);
        Ok(1)
    }

    /// Zero the radii of `threshold` and every higher threshold at the lead
    ///
    /// Slots are checked before any is cleared, so a forbidden slot leaves
    /// the lead untouched.
    pub fn delete_all_from(&mut self, lead_hours: i32, threshold: WindThreshold) -> ForecastResult<usize> {
        self.require(ForecastAspect::WindRadii, "wind radii")?;
        let thresholds: Vec<WindThreshold> = WindThreshold::RADII
            .into_iter()
            .filter(|t| *t >= threshold && self.store.lookup(lead_hours, *t).is_some())
            .collect();
        for t in &thresholds {
            self.editable_slot(lead_hours, *t)?;
        }
        let mut cleared = 0;
        for t in thresholds {
            cleared += self.delete_threshold(lead_hours, t)?;
        }
        Ok(cleared)
    }

    /// Copy 34/50/64kt radii from one lead to another
    ///
    /// Stops at the first threshold missing at either lead or not editable
    /// at the target lead.
    pub fn copy_radii_from_lead(&mut self, from_lead: i32, to_lead: i32) -> ForecastResult<usize> {
        self.require(ForecastAspect::WindRadii, "wind radii")?;
        if self.store.lookup(from_lead, WindThreshold::Kt34).is_none() {
            return Err(ForecastError::missing(from_lead, WindThreshold::Kt34));
        }
        let mut copied = 0;
        for threshold in WindThreshold::RADII {
            let Some(source) = self.store.lookup(from_lead, threshold).map(|r| r.wind_radii) else {
                break;
            };
            let Some((key, mut target)) = self.copy_target(to_lead, threshold) else {
                break;
            };
            target.wind_radii = source;
            self.store.put(key, target);
            copied += 1;
        }
        Ok(copied)
    }

    /// Copy wind radii from another aid's records into one lead, or every editable lead
    ///
    /// A single requested lead the aid has no record for is a `MissingRecord`.
    pub fn apply_aid_radii(&mut self, aid_records: &[KeyedRecord], lead_hours: Option<i32>) -> ForecastResult<usize> {
        self.require(ForecastAspect::WindRadii, "wind radii")?;
        let leads: Vec<i32> = match lead_hours {
            Some(lead) => {
                if !aid_records.iter().any(|r| r.key.lead_hours == lead) {
                    return Err(ForecastError::missing(lead, WindThreshold::Kt34));
                }
                vec![lead]
            }
            None => self
                .store
                .leads()
                .into_iter()
                .filter(|lead| self.policy.is_lead_time_editable(&*self.store, *lead))
                .collect(),
        };

        let mut copied = 0;
        for lead in leads {
            for threshold in WindThreshold::RADII {
                let Some(source) = aid_records
                    .iter()
                    .find(|r| r.key.lead_hours == lead && r.key.threshold == threshold)
                else {
                    break;
                };
                let Some((key, mut target)) = self.copy_target(lead, threshold) else {
                    break;
                };
                target.wind_radii = source.record.wind_radii;
                self.store.put(key, target);
                copied += 1;
            }
        }
        Ok(copied)
    }

    // Track

    /// Move the storm center at a lead; every threshold record follows
    pub fn set_position(&mut self, lead_hours: i32, lat: f64, lon: f64) -> ForecastResult<()> {
        self.require(ForecastAspect::Track, "position")?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ForecastError::validation("position", format!("({lat}, {lon}) is not on the globe")));
        }
        self.update_lead(lead_hours, |record| record.position = Position { lat, lon })
    }

    pub fn set_motion(&mut self, lead_hours: i32, speed: u16, direction: u16) -> ForecastResult<()> {
        self.require(ForecastAspect::Track, "motion")?;
        if direction >= 360 {
            return Err(ForecastError::validation("direction", format!("{direction} is not a bearing")));
        }
        self.update_lead(lead_hours, |record| {
            record.storm_speed = Some(speed);
            record.storm_direction = Some(direction);
        })
    }

    fn update_lead(&mut self, lead_hours: i32, edit: impl Fn(&mut ForecastRecord)) -> ForecastResult<()> {
        let keys = self.store.keys_at(lead_hours);
        if keys.is_empty() {
            return Err(ForecastError::missing(lead_hours, WindThreshold::None));
        }
        for key in keys {
            if let Some(record) = self.store.get(&key) {
                let mut record = record.clone();
                edit(&mut record);
                self.store.put(key, record);
            }
        }
        Ok(())
    }

    // Seas

    /// Set one quadrant of the 12 ft seas radii on the lead's base record
    pub fn set_wave_radius(&mut self, lead_hours: i32, quadrant: usize, raw: i32) -> ForecastResult<()> {
        self.require(ForecastAspect::Seas, "seas")?;
        check_quadrant(quadrant)?;
        let value = check_radius("wave radius", raw)?;
        let (key, mut record) = self.base(lead_hours)?;
        set_radius(&mut record.wave_radii, quadrant, value);
        self.store.put(key, record);
        Ok(())
    }

    pub fn toggle_wave_mode(&mut self, lead_hours: i32, to_circle: bool) -> ForecastResult<()> {
        self.require(ForecastAspect::Seas, "seas")?;
        let (key, mut record) = self.base(lead_hours)?;
        toggle_mode(&mut record.wave_radii, to_circle);
        self.store.put(key, record);
        Ok(())
    }

    fn require(&self, aspect: ForecastAspect, field: &str) -> ForecastResult<()> {
        if self.aspect != aspect {
            return Err(ForecastError::validation(
                field,
                format!("{aspect} edits are not allowed in a {} session", self.aspect),
            ));
        }
        Ok(())
    }

    fn base(&self, lead_hours: i32) -> ForecastResult<(RecordKey, ForecastRecord)> {
        self.store
            .lookup_base(lead_hours)
            .map(|(key, record)| (key, record.clone()))
            .ok_or(ForecastError::missing(lead_hours, WindThreshold::Kt34))
    }

    fn existing(&self, lead_hours: i32, threshold: WindThreshold) -> ForecastResult<(RecordKey, ForecastRecord)> {
        self.store
            .key_for(lead_hours, threshold)
            .and_then(|key| self.store.get(&key).cloned().map(|record| (key, record)))
            .ok_or(ForecastError::missing(lead_hours, threshold))
    }

    fn copy_target(&self, lead_hours: i32, threshold: WindThreshold) -> Option<(RecordKey, ForecastRecord)> {
        self.editable_slot(lead_hours, threshold).ok()
    }

    fn editable_slot(&self, lead_hours: i32, threshold: WindThreshold) -> ForecastResult<(RecordKey, ForecastRecord)> {
        if !self.policy.is_lead_time_editable(&*self.store, lead_hours)
            || !self.policy.is_threshold_editable(&*self.store, threshold, lead_hours)
        {
            return Err(ForecastError::validation(
                "wind radii",
                format!("{threshold} radii are not editable at TAU {lead_hours}"),
            ));
        }
        self.existing(lead_hours, threshold)
    }
}
