//! Calibration tables: risk curves, allocation templates and instrument candidates

mod allocation;
mod curves;
mod instruments;
pub mod loader;

pub use allocation::{AllocationEntry, AllocationTable, AllocationTemplate, AssetCategory};
pub use curves::{RiskCurve, RiskCurveTable, Scenario};
pub use instruments::{InstrumentCatalog, UNAVAILABLE_INSTRUMENT};
pub use loader::LoadedAssumptions;

use std::path::Path;

use crate::error::CoreResult;

/// Container for all projection assumptions
#[derive(Debug, Clone, Default)]
pub struct Assumptions {
    pub curves: RiskCurveTable,
    pub allocations: AllocationTable,
    pub instruments: InstrumentCatalog,
}

impl Assumptions {
    /// Canonical tables used by the Mini App
    pub fn reference() -> Self {
        Self {
            curves: RiskCurveTable::reference(),
            allocations: AllocationTable::reference(),
            instruments: InstrumentCatalog::reference(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> CoreResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory.
    /// The instrument catalog falls back to the reference list when the file is absent.
    pub fn from_csv_path(path: &Path) -> CoreResult<Self> {
        let loaded = LoadedAssumptions::load_from(path)?;
        Self::from_loaded(&loaded)
    }

    /// Validate and assemble loaded tables
    pub fn from_loaded(loaded: &LoadedAssumptions) -> CoreResult<Self> {
        Ok(Self {
            curves: RiskCurveTable::from_loaded(&loaded.risk_curves)?,
            allocations: AllocationTable::from_loaded(&loaded.allocations)?,
            instruments: loaded
                .instruments
                .as_deref()
                .map(InstrumentCatalog::from_loaded)
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::RiskProfile;

    #[test]
    fn test_from_loaded_validates_tables() {
        let loaded = LoadedAssumptions {
            risk_curves: vec![
                (RiskProfile::Conservative, RiskCurve::new(1.04, 1.06, 1.09)),
                (RiskProfile::Moderate, RiskCurve::new(1.07, 1.15, 1.22)),
                (RiskProfile::Aggressive, RiskCurve::new(1.10, 1.25, 1.40)),
            ],
            allocations: vec![
                (RiskProfile::Conservative, AssetCategory::BondsRf, 100),
                (RiskProfile::Moderate, AssetCategory::StocksRf, 50),
                (RiskProfile::Moderate, AssetCategory::BondsRf, 50),
                (RiskProfile::Aggressive, AssetCategory::Crypto, 100),
            ],
            instruments: None,
        };

        let assumptions = Assumptions::from_loaded(&loaded).unwrap();
        assert_eq!(assumptions.curves.get(RiskProfile::Conservative).min, 1.04);
        assert_eq!(assumptions.allocations.get(RiskProfile::Moderate).len(), 2);
        assert_eq!(assumptions.instruments.default_for(AssetCategory::Gold), "Gold fund");
    }

    #[test]
    fn test_from_loaded_rejects_bad_allocation() {
        let loaded = LoadedAssumptions {
            risk_curves: vec![
                (RiskProfile::Conservative, RiskCurve::new(1.05, 1.08, 1.12)),
                (RiskProfile::Moderate, RiskCurve::new(1.07, 1.15, 1.22)),
                (RiskProfile::Aggressive, RiskCurve::new(1.10, 1.25, 1.40)),
            ],
            allocations: vec![
                (RiskProfile::Conservative, AssetCategory::BondsRf, 90),
                (RiskProfile::Moderate, AssetCategory::StocksRf, 100),
                (RiskProfile::Aggressive, AssetCategory::Crypto, 100),
            ],
            instruments: None,
        };
        assert!(Assumptions::from_loaded(&loaded).is_err());
    }

    #[test]
    fn test_shipped_csv_matches_reference() {
        let loaded = Assumptions::from_csv().unwrap();
        let reference = Assumptions::reference();

        for profile in RiskProfile::ALL {
            assert_eq!(loaded.curves.get(profile), reference.curves.get(profile));
            assert_eq!(loaded.allocations.get(profile), reference.allocations.get(profile));
        }
        for category in AssetCategory::ALL {
            assert_eq!(
                loaded.instruments.candidates(category),
                reference.instruments.candidates(category)
            );
        }
    }
}
