//! CSV import for square-footage rate cards.
//!
//! Estimating maintains the rate card in a spreadsheet; this reader accepts
//! its CSV export and validates the coverage invariants before the table is
//! allowed anywhere near the engine.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::tables::{PricingConfigError, PricingTier, PricingTierTable};

#[derive(Debug, thiserror::Error)]
pub enum TierImportError {
    #[error("failed to read tier table csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to open tier table file: {0}")]
    Io(#[from] std::io::Error),
    #[error("imported tier table is invalid: {0}")]
    Validation(#[from] PricingConfigError),
}

/// Parse and validate a tier table from a CSV export.
pub fn tier_table_from_reader<R: Read>(reader: R) -> Result<PricingTierTable, TierImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut tiers = Vec::new();
    for record in csv_reader.deserialize::<TierRow>() {
        let row = record?;
        tiers.push(PricingTier {
            min: row.min_sq_ft,
            max: row.max_sq_ft,
            base_time_hours: row.base_hours,
            base_price: row.base_price,
            size_time_hours: row.size_hours,
            size_price: row.size_price,
        });
    }

    Ok(PricingTierTable::new(tiers)?)
}

pub fn tier_table_from_path<P: AsRef<Path>>(path: P) -> Result<PricingTierTable, TierImportError> {
    let file = File::open(path)?;
    tier_table_from_reader(file)
}

#[derive(Debug, Deserialize)]
struct TierRow {
    #[serde(rename = "Min Sq Ft")]
    min_sq_ft: u32,
    #[serde(rename = "Max Sq Ft", default, deserialize_with = "empty_as_none")]
    max_sq_ft: Option<u32>,
    #[serde(rename = "Base Hours")]
    base_hours: f64,
    #[serde(rename = "Base Price")]
    base_price: f64,
    #[serde(rename = "Size Hours")]
    size_hours: f64,
    #[serde(rename = "Size Price")]
    size_price: f64,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Min Sq Ft,Max Sq Ft,Base Hours,Base Price,Size Hours,Size Price
0,1499,1.0,95.00,0.5,30.00
1500,2999,2.0,120.00,1.0,55.00
3000,,3.0,150.00,2.0,90.00
";

    #[test]
    fn parses_and_validates_sample_export() {
        let table = tier_table_from_reader(SAMPLE.as_bytes()).expect("sample imports");
        assert_eq!(table.tiers().len(), 3);
        assert!(table.tiers()[2].max.is_none());
        let band = table.tier_for(1800).expect("band matches");
        assert_eq!(band.min, 1500);
    }

    #[test]
    fn rejects_export_with_gap() {
        let csv = "\
Min Sq Ft,Max Sq Ft,Base Hours,Base Price,Size Hours,Size Price
0,999,1.0,95.00,0.5,30.00
2000,,3.0,150.00,2.0,90.00
";
        match tier_table_from_reader(csv.as_bytes()) {
            Err(TierImportError::Validation(PricingConfigError::TierCoverageGap { from })) => {
                assert_eq!(from, 1000);
            }
            other => panic!("expected coverage gap, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_number() {
        let csv = "\
Min Sq Ft,Max Sq Ft,Base Hours,Base Price,Size Hours,Size Price
0,,abc,95.00,0.5,30.00
";
        assert!(matches!(
            tier_table_from_reader(csv.as_bytes()),
            Err(TierImportError::Csv(_))
        ));
    }
}
