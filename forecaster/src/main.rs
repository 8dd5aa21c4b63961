//! Command-line entry point for editing a storm's forecast
//!
//! Loads (or seeds) the forecast, applies intensity edits given on the
//! command line, then saves or submits through the file-backed stores.

use anyhow::{bail, Context};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;

use forecaster::services::{EnvSiteConfig, FileAidStore, FileStagingStore};
use forecaster::{
    seed_forecast, EditSession, ExternalAidReconciler, Forecaster, SiteConfigSource, WindRadiiPolicy,
};
use shared::{
    logging, storm_debug, storm_info, CycleTime, ForecastAspect, ForecastRecord, KeyedRecord, RecordKey, StormId,
    FORECAST_AID,
};

/// Parse a `LEAD=KT` intensity edit
fn parse_intensity_edit(value: &str) -> Result<(i32, String), String> {
    let (lead, wind) = value
        .split_once('=')
        .ok_or_else(|| format!("expected LEAD=KT, got {value:?}"))?;
    let lead = lead
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid lead time {lead:?}"))?;
    Ok((lead, wind.to_string()))
}

/// Tropical cyclone forecast editor
#[derive(Parser)]
#[command(name = "forecaster")]
#[command(about = "Edits a storm forecast and keeps its wind-radii records consistent")]
pub struct Args {
    /// Storm identifier, e.g. AL092024
    #[arg(long)]
    pub storm: String,

    /// JSON file of keyed records to edit instead of the stored forecast
    #[arg(long)]
    pub records: Option<PathBuf>,

    /// Forecast cycle (YYYYMMDDHH); defaults to the latest best-track cycle
    #[arg(long)]
    pub cycle: Option<String>,

    /// Forecast aspect being edited (track, intensity, wind-radii, seas)
    #[arg(long, default_value = "intensity")]
    pub aspect: ForecastAspect,

    /// Directory of the staging store
    #[arg(long, default_value = "./staging")]
    pub staging_dir: PathBuf,

    /// Directory of the aid deck store
    #[arg(long, default_value = "./decks")]
    pub aid_dir: PathBuf,

    /// Intensity edit as LEAD=KT; may be repeated
    #[arg(long = "set-intensity", value_parser = parse_intensity_edit)]
    pub set_intensity: Vec<(i32, String)>,

    /// Check in the forecast after saving
    #[arg(long)]
    pub submit: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

async fn load_originals(
    args: &Args,
    storm: &StormId,
    staging: &FileStagingStore,
    aids: &FileAidStore,
) -> anyhow::Result<BTreeMap<RecordKey, ForecastRecord>> {
    if let Some(path) = &args.records {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let records: Vec<KeyedRecord> = serde_json::from_str(&content)?;
        return Ok(records.into_iter().map(|r| (r.key, r.record)).collect());
    }

    let best_track = aids.best_track(storm).await?;
    let cycle = match &args.cycle {
        Some(dtg) => CycleTime::from_dtg(dtg)?,
        None => match best_track.iter().map(|r| r.key.cycle).max() {
            Some(cycle) => cycle,
            None => bail!("no best track for {storm}; pass --records or --cycle"),
        },
    };

    let prior = staging.load_forecast(storm).await?;
    let seeded = seed_forecast(cycle, FORECAST_AID, prior, &best_track);
    storm_debug!(storm, "Seeded {} records from {:?}", seeded.records.len(), seeded.source);
    Ok(seeded.records)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let storm = StormId::new(&args.storm);
    logging::log_startup(&storm, &format!("{} forecast edit", args.aspect));

    let limits = EnvSiteConfig::new().site_limits()?;
    let staging = FileStagingStore::new(&args.staging_dir);
    let aids = FileAidStore::new(&args.aid_dir);

    let originals = load_originals(&args, &storm, &staging, &aids).await?;
    if originals.is_empty() {
        bail!("no forecast records for {storm}");
    }

    let session = EditSession::begin(
        storm.clone(),
        args.aspect,
        FORECAST_AID,
        originals,
        staging,
        WindRadiiPolicy::new(limits),
    );
    let reconciler = ExternalAidReconciler::new(aids, storm.clone());
    let mut forecaster = Forecaster::new(session, reconciler);

    for (lead, wind) in &args.set_intensity {
        if let Err(e) = forecaster.engine().set_intensity_text(*lead, wind) {
            logging::log_error(&storm, &format!("Intensity edit at TAU {lead}"), &e);
            return Err(e.into());
        }
        storm_info!(storm, "TAU {} intensity set to {} kt", lead, wind.trim());
    }

    if args.submit {
        forecaster.submit().await?;
    } else {
        let outcome = forecaster.save().await?;
        logging::log_success(
            &storm,
            &format!(
                "Saved to {} ({} official aid records updated)",
                outcome.sandbox, outcome.reconciled
            ),
        );
    }
    Ok(())
}
