use std::path::Path;

use anyhow::Result;

/// Placeholder written for any field whose markup element is absent.
pub const NOT_AVAILABLE: &str = "Not available";

pub const CSV_HEADER: [&str; 8] = [
    "URL",
    "Title",
    "Type",
    "Reference",
    "Price",
    "Size",
    "Description",
    "Composition",
];

/// One extracted product. Fields that could not be located hold the
/// [`NOT_AVAILABLE`] sentinel; the record itself is never partial.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub url: String,
    pub title: String,
    pub product_type: String,
    pub reference: String,
    pub price: String,
    pub size: String,
    pub description: String,
    pub composition: String,
}

impl ProductRecord {
    fn to_csv_record(&self) -> [&str; 8] {
        [
            &self.url,
            &self.title,
            &self.product_type,
            &self.reference,
            &self.price,
            &self.size,
            &self.description,
            &self.composition,
        ]
    }
}

/// Result of one product-page visit. A fetch failure stays distinguishable
/// from a page that simply lacked every field.
#[derive(Debug, Clone)]
pub enum ProductOutcome {
    Extracted(ProductRecord),
    Failed { url: String, error: String },
}

/// Write all outcomes to `path`, one row per outcome in input order.
/// The file is created or truncated, never appended to. A failed fetch
/// keeps its row (URL plus sentinels) so row count matches discovery count.
/// Returns the number of data rows written.
pub fn write_csv(path: &Path, outcomes: &[ProductOutcome]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(CSV_HEADER)?;

    for outcome in outcomes {
        match outcome {
            ProductOutcome::Extracted(record) => wtr.write_record(record.to_csv_record())?,
            ProductOutcome::Failed { url, .. } => {
                let mut row = [NOT_AVAILABLE; 8];
                row[0] = url;
                wtr.write_record(row)?;
            }
        }
    }

    wtr.flush()?;
    Ok(outcomes.len())
}

// ── Tests ──
