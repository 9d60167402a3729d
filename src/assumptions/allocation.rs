//! Asset categories and per-profile allocation templates

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ProjectionError};
use crate::plan::RiskProfile;

/// Asset class a template slot refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetCategory {
    /// Russian government and corporate bonds
    #[serde(rename = "BondsRF")]
    BondsRf,
    /// Russian equities
    #[serde(rename = "StocksRF")]
    StocksRf,
    /// US equities
    #[serde(rename = "StocksUS")]
    StocksUs,
    Gold,
    Cash,
    Crypto,
    VentureFunds,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 7] = [
        AssetCategory::BondsRf,
        AssetCategory::StocksRf,
        AssetCategory::StocksUs,
        AssetCategory::Gold,
        AssetCategory::Cash,
        AssetCategory::Crypto,
        AssetCategory::VentureFunds,
    ];

    /// Stable code used in CSV files and host messages
    pub fn code(&self) -> &'static str {
        match self {
            AssetCategory::BondsRf => "BondsRF",
            AssetCategory::StocksRf => "StocksRF",
            AssetCategory::StocksUs => "StocksUS",
            AssetCategory::Gold => "Gold",
            AssetCategory::Cash => "Cash",
            AssetCategory::Crypto => "Crypto",
            AssetCategory::VentureFunds => "VentureFunds",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AssetCategory::BondsRf => "Russian bonds",
            AssetCategory::StocksRf => "Russian stocks",
            AssetCategory::StocksUs => "US stocks",
            AssetCategory::Gold => "Gold",
            AssetCategory::Cash => "Cash",
            AssetCategory::Crypto => "Cryptocurrency",
            AssetCategory::VentureFunds => "Venture funds",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AssetCategory {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AssetCategory::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ProjectionError::invalid_input("category", format!("unknown asset category {:?}", s))
            })
    }
}

/// One slot of an allocation template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub category: AssetCategory,
    pub percent: u8,
}

/// Ordered category/percent breakdown for one risk profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTemplate {
    pub profile: RiskProfile,
    pub entries: Vec<AllocationEntry>,
}

impl AllocationTemplate {
    /// Build a template, checking percentages sum to 100 and categories are unique
    pub fn new(profile: RiskProfile, entries: &[(AssetCategory, u8)]) -> CoreResult<Self> {
        let template = Self {
            profile,
            entries: entries
                .iter()
                .map(|&(category, percent)| AllocationEntry { category, percent })
                .collect(),
        };
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let total = self.total_percent();
        if total != 100 {
            return Err(ProjectionError::InvalidAssumption(format!(
                "allocation for {} sums to {}%, expected 100%",
                self.profile, total
            )));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.category == entry.category) {
                return Err(ProjectionError::InvalidAssumption(format!(
                    "allocation for {} lists {} twice",
                    self.profile, entry.category
                )));
            }
        }
        Ok(())
    }

    pub fn total_percent(&self) -> u32 {
        self.entries.iter().map(|e| e.percent as u32).sum()
    }

    pub fn percent_of(&self, category: AssetCategory) -> Option<u8> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.percent)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Allocation template lookup by profile
#[derive(Debug, Clone)]
pub struct AllocationTable {
    templates: BTreeMap<RiskProfile, AllocationTemplate>,
}

impl AllocationTable {
    /// Templates used by the Mini App
    pub fn reference() -> Self {
        use AssetCategory::*;

        // Hardcoded percentages sum to 100, so construction cannot fail
        let template = |profile, entries: &[(AssetCategory, u8)]| AllocationTemplate {
            profile,
            entries: entries
                .iter()
                .map(|&(category, percent)| AllocationEntry { category, percent })
                .collect(),
        };

        let mut templates = BTreeMap::new();
        templates.insert(
            RiskProfile::Conservative,
            template(
                RiskProfile::Conservative,
                &[(BondsRf, 60), (StocksRf, 20), (Gold, 15), (Cash, 5)],
            ),
        );
        templates.insert(
            RiskProfile::Moderate,
            template(
                RiskProfile::Moderate,
                &[(StocksRf, 40), (BondsRf, 35), (StocksUs, 20), (Gold, 5)],
            ),
        );
        templates.insert(
            RiskProfile::Aggressive,
            template(
                RiskProfile::Aggressive,
                &[(StocksRf, 50), (StocksUs, 30), (Crypto, 15), (VentureFunds, 5)],
            ),
        );
        Self { templates }
    }

    /// Build from loaded rows (profile, category, percent) in template order
    pub fn from_loaded(rows: &[(RiskProfile, AssetCategory, u8)]) -> CoreResult<Self> {
        let mut templates = BTreeMap::new();
        for profile in RiskProfile::ALL {
            let entries: Vec<(AssetCategory, u8)> = rows
                .iter()
                .filter(|(p, _, _)| *p == profile)
                .map(|&(_, category, percent)| (category, percent))
                .collect();
            if entries.is_empty() {
                return Err(ProjectionError::InvalidAssumption(format!(
                    "missing allocation template for {}",
                    profile
                )));
            }
            templates.insert(profile, AllocationTemplate::new(profile, &entries)?);
        }
        Ok(Self { templates })
    }

    pub fn get(&self, profile: RiskProfile) -> &AllocationTemplate {
        &self.templates[&profile]
    }
}

impl Default for AllocationTable {
    fn default() -> Self {
        Self::reference()
    }
}
