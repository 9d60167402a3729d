//! CSV-based assumption loader
//!
//! Loads calibration tables from CSV files in data/assumptions/

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{AssetCategory, RiskCurve};
use crate::error::{CoreResult, ProjectionError};
use crate::plan::RiskProfile;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

const RISK_CURVES_FILE: &str = "risk_curves.csv";
const ALLOCATIONS_FILE: &str = "allocations.csv";
const INSTRUMENTS_FILE: &str = "instruments.csv";

#[derive(Debug, serde::Deserialize)]
struct CurveRow {
    profile: String,
    min: f64,
    avg: f64,
    max: f64,
}

#[derive(Debug, serde::Deserialize)]
struct AllocationRow {
    profile: String,
    category: String,
    percent: u8,
}

#[derive(Debug, serde::Deserialize)]
struct InstrumentRow {
    category: String,
    name: String,
}

fn parse_profile(raw: &str) -> CoreResult<RiskProfile> {
    raw.parse()
        .map_err(|_| ProjectionError::InvalidAssumption(format!("unknown risk profile {:?}", raw)))
}

fn parse_category(raw: &str) -> CoreResult<AssetCategory> {
    raw.parse()
        .map_err(|_| ProjectionError::InvalidAssumption(format!("unknown asset category {:?}", raw)))
}

/// Load risk curves: `profile,min,avg,max`
pub fn load_risk_curves<R: Read>(reader: R) -> CoreResult<Vec<(RiskProfile, RiskCurve)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut curves = Vec::new();

    for result in reader.deserialize() {
        let row: CurveRow = result?;
        curves.push((parse_profile(&row.profile)?, RiskCurve::new(row.min, row.avg, row.max)));
    }

    Ok(curves)
}

/// Load allocation templates: `profile,category,percent`, row order is template order
pub fn load_allocations<R: Read>(reader: R) -> CoreResult<Vec<(RiskProfile, AssetCategory, u8)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let row: AllocationRow = result?;
        rows.push((
            parse_profile(&row.profile)?,
            parse_category(&row.category)?,
            row.percent,
        ));
    }

    Ok(rows)
}

/// Load instrument candidates: `category,name`
pub fn load_instruments<R: Read>(reader: R) -> CoreResult<Vec<(AssetCategory, String)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let row: InstrumentRow = result?;
        rows.push((parse_category(&row.category)?, row.name.trim().to_string()));
    }

    Ok(rows)
}

/// Raw tables read from an assumptions directory
pub struct LoadedAssumptions {
    pub risk_curves: Vec<(RiskProfile, RiskCurve)>,
    pub allocations: Vec<(RiskProfile, AssetCategory, u8)>,
    /// `None` when the directory has no instruments.csv
    pub instruments: Option<Vec<(AssetCategory, String)>>,
}

impl LoadedAssumptions {
    /// Load all tables from the default path
    pub fn load_default() -> CoreResult<Self> {
        Self::load_from(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all tables from a specific path
    pub fn load_from(path: &Path) -> CoreResult<Self> {
        log::info!("Loading assumptions from {}", path.display());

        let instruments_path = path.join(INSTRUMENTS_FILE);
        let instruments = if instruments_path.exists() {
            Some(load_instruments(File::open(instruments_path)?)?)
        } else {
            None
        };

        Ok(Self {
            risk_curves: load_risk_curves(File::open(path.join(RISK_CURVES_FILE))?)?,
            allocations: load_allocations(File::open(path.join(ALLOCATIONS_FILE))?)?,
            instruments,
        })
    }
}
