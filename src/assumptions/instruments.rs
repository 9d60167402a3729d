//! Candidate instruments a user may pick within each asset category

use std::collections::BTreeMap;

use super::AssetCategory;

/// Placeholder name for a category without candidates
pub const UNAVAILABLE_INSTRUMENT: &str = "N/A";

/// Ordered candidate list per category; the first entry is the default pick
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    candidates: BTreeMap<AssetCategory, Vec<String>>,
}

impl InstrumentCatalog {
    /// Catalog offered by the portfolio editor
    pub fn reference() -> Self {
        let table: [(AssetCategory, &[&str]); 7] = [
            (
                AssetCategory::StocksRf,
                &["Sberbank", "Gazprom", "Lukoil", "Yandex", "Rosneft"],
            ),
            (
                AssetCategory::BondsRf,
                &["OFZ 26238", "OFZ 26240", "OFZ 26242", "OFZ 26243"],
            ),
            (
                AssetCategory::StocksUs,
                &["Apple", "Microsoft", "Amazon", "Google", "NVIDIA"],
            ),
            (AssetCategory::Gold, &["Gold fund", "Physical gold"]),
            (AssetCategory::Cash, &["Rubles", "Dollars"]),
            (AssetCategory::Crypto, &["Bitcoin", "Ethereum", "Solana"]),
            (AssetCategory::VentureFunds, &["Fund A", "Fund B"]),
        ];

        let candidates = table
            .iter()
            .map(|(category, names)| (*category, names.iter().map(|n| n.to_string()).collect()))
            .collect();
        Self { candidates }
    }

    /// Build from loaded (category, name) rows, preserving row order per category
    pub fn from_loaded(rows: &[(AssetCategory, String)]) -> Self {
        let mut candidates: BTreeMap<AssetCategory, Vec<String>> = BTreeMap::new();
        for (category, name) in rows {
            let names = candidates.entry(*category).or_default();
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Self { candidates }
    }

    /// Candidates for a category (empty if none are configured)
    pub fn candidates(&self, category: AssetCategory) -> &[String] {
        self.candidates
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Default instrument for a category
    pub fn default_for(&self, category: AssetCategory) -> &str {
        self.candidates(category)
            .first()
            .map(|s| s.as_str())
            .unwrap_or(UNAVAILABLE_INSTRUMENT)
    }

    pub fn contains(&self, category: AssetCategory, name: &str) -> bool {
        self.candidates(category).iter().any(|n| n == name)
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_catalog_covers_every_category() {
        let catalog = InstrumentCatalog::reference();
        for category in AssetCategory::ALL {
            assert!(!catalog.candidates(category).is_empty(), "{}", category);
        }
        assert_eq!(catalog.default_for(AssetCategory::StocksRf), "Sberbank");
        assert_eq!(catalog.default_for(AssetCategory::BondsRf), "OFZ 26238");
        assert!(catalog.contains(AssetCategory::Crypto, "Solana"));
        assert!(!catalog.contains(AssetCategory::Crypto, "Apple"));
    }

    #[test]
    fn test_loaded_catalog_falls_back_to_placeholder() {
        let catalog = InstrumentCatalog::from_loaded(&[
            (AssetCategory::Gold, "Bullion".to_string()),
            (AssetCategory::Gold, "Bullion".to_string()),
            (AssetCategory::Gold, "ETF".to_string()),
        ]);
        assert_eq!(catalog.candidates(AssetCategory::Gold), ["Bullion", "ETF"]);
        assert_eq!(catalog.default_for(AssetCategory::Cash), UNAVAILABLE_INSTRUMENT);
    }
}
