//! Allocation instances: a template with a concrete instrument bound to each slot

use serde::{Deserialize, Serialize};

use crate::assumptions::{AllocationTemplate, AssetCategory, InstrumentCatalog};
use crate::error::{CoreResult, ProjectionError};

/// One slot of a user's portfolio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub category: AssetCategory,
    pub name: String,
    pub percent: u8,
}

/// Allocation template with instrument names chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationInstance {
    pub holdings: Vec<Holding>,
}

impl AllocationInstance {
    /// Bind instruments to `template`.
    ///
    /// A category already present in `previous` keeps its chosen name; new
    /// categories get the catalog's first candidate.
    pub fn from_template(
        template: &AllocationTemplate,
        catalog: &InstrumentCatalog,
        previous: Option<&AllocationInstance>,
    ) -> Self {
        let holdings = template
            .entries
            .iter()
            .map(|entry| {
                let name = previous
                    .and_then(|p| p.holding(entry.category))
                    .map(|h| h.name.clone())
                    .unwrap_or_else(|| catalog.default_for(entry.category).to_string());
                Holding {
                    category: entry.category,
                    name,
                    percent: entry.percent,
                }
            })
            .collect();

        Self { holdings }
    }

    pub fn holding(&self, category: AssetCategory) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.category == category)
    }

    /// Swap the instrument at `index` for another candidate of the same category
    pub fn replace(&mut self, index: usize, name: &str, catalog: &InstrumentCatalog) -> CoreResult<()> {
        let holding = self.holdings.get_mut(index).ok_or_else(|| {
            ProjectionError::invalid_input("index", format!("no holding at position {}", index))
        })?;

        if holding.name == name {
            return Err(ProjectionError::invalid_input(
                "name",
                format!("{} is already selected", name),
            ));
        }
        if !catalog.contains(holding.category, name) {
            return Err(ProjectionError::invalid_input(
                "name",
                format!("{} is not available for {}", name, holding.category),
            ));
        }

        log::debug!("Replacing {} with {} in {}", holding.name, name, holding.category);
        holding.name = name.to_string();
        Ok(())
    }

    pub fn total_percent(&self) -> u32 {
        self.holdings.iter().map(|h| h.percent as u32).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::AllocationTable;
    use crate::plan::RiskProfile;

    #[test]
    fn test_defaults_from_catalog() {
        let table = AllocationTable::reference();
        let catalog = InstrumentCatalog::reference();
        let instance = AllocationInstance::from_template(table.get(RiskProfile::Moderate), &catalog, None);

        let names: Vec<&str> = instance.holdings.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Sberbank", "OFZ 26238", "Apple", "Gold fund"]);
        assert_eq!(instance.total_percent(), 100);
    }

    #[test]
    fn test_regeneration_keeps_chosen_names() {
        let table = AllocationTable::reference();
        let catalog = InstrumentCatalog::reference();
        let mut moderate = AllocationInstance::from_template(table.get(RiskProfile::Moderate), &catalog, None);
        moderate.replace(0, "Yandex", &catalog).unwrap();
        moderate.replace(2, "NVIDIA", &catalog).unwrap();

        let aggressive =
            AllocationInstance::from_template(table.get(RiskProfile::Aggressive), &catalog, Some(&moderate));

        assert_eq!(aggressive.holding(AssetCategory::StocksRf).unwrap().name, "Yandex");
        assert_eq!(aggressive.holding(AssetCategory::StocksRf).unwrap().percent, 50);
        assert_eq!(aggressive.holding(AssetCategory::StocksUs).unwrap().name, "NVIDIA");
        assert_eq!(aggressive.holding(AssetCategory::Crypto).unwrap().name, "Bitcoin");
        assert!(aggressive.holding(AssetCategory::Gold).is_none());
    }

    #[test]
    fn test_replace_validation() {
        let table = AllocationTable::reference();
        let catalog = InstrumentCatalog::reference();
        let mut instance =
            AllocationInstance::from_template(table.get(RiskProfile::Conservative), &catalog, None);

        assert!(instance.replace(0, "OFZ 26238", &catalog).unwrap_err().is_invalid_input());
        assert!(instance.replace(0, "Bitcoin", &catalog).unwrap_err().is_invalid_input());
        assert!(instance.replace(9, "Rubles", &catalog).unwrap_err().is_invalid_input());

        instance.replace(3, "Dollars", &catalog).unwrap();
        assert_eq!(instance.holdings[3].name, "Dollars");
    }
}
