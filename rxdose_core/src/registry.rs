//! Drug registry loaded from a tabular (CSV) source.
//!
//! The registry is built once and never mutated, so shared references can be
//! read from any number of threads without locking.

use crate::{DrugRecord, Error, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

/// Column holding the registry key
pub const GENERIC_NAME_COLUMN: &str = "Generic Name";

const SAMPLE_CSV: &str = include_str!("../data/sample_drugs.csv");

/// Bundled sample registry - parsed on first use and reused afterwards
static SAMPLE_REGISTRY: Lazy<DrugRegistry> = Lazy::new(|| {
    DrugRegistry::from_reader(SAMPLE_CSV.as_bytes(), "bundled sample")
        .expect("bundled sample drug database is well-formed")
});

/// Get a reference to the bundled sample registry
pub fn sample_registry() -> &'static DrugRegistry {
    &SAMPLE_REGISTRY
}

/// A row in the source CSV, after header trimming
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Generic Name")]
    generic_name: Option<String>,
    #[serde(rename = "Drug Class")]
    drug_class: Option<String>,
    #[serde(rename = "Common Uses")]
    common_uses: Option<String>,
    #[serde(rename = "Side Effects")]
    side_effects: Option<String>,
    #[serde(rename = "Contraindications")]
    contraindications: Option<String>,
    #[serde(rename = "Adult Dose")]
    adult_dose: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> Option<DrugRecord> {
        let generic_name = self.generic_name.filter(|n| !n.trim().is_empty())?;
        Some(DrugRecord {
            generic_name,
            drug_class: self.drug_class,
            common_uses: self.common_uses,
            side_effects: self.side_effects,
            contraindications: self.contraindications,
            adult_dose: self.adult_dose,
        })
    }
}

/// Immutable, indexed collection of drug records
#[derive(Clone, Debug, Default)]
pub struct DrugRegistry {
    /// Records in source order
    records: Vec<DrugRecord>,
    /// Lower-cased generic name -> index of its first record
    index: HashMap<String, usize>,
}

impl DrugRegistry {
    /// Load the registry from a CSV file
    ///
    /// Fails with [`Error::DataSource`] if the file is missing, unreadable or
    /// malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DataSource(format!(
                "drug database not found at {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path).map_err(|e| {
            Error::DataSource(format!("unable to open {}: {}", path.display(), e))
        })?;

        Self::from_reader(file, &path.display().to_string())
    }

    /// Load the registry from any CSV reader
    ///
    /// Column names are trimmed of surrounding whitespace. Rows with a blank
    /// generic name are skipped.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::DataSource(format!("{}: unreadable header: {}", source, e)))?;
        if !headers.iter().any(|h| h == GENERIC_NAME_COLUMN) {
            return Err(Error::DataSource(format!(
                "{}: missing required column '{}'",
                source, GENERIC_NAME_COLUMN
            )));
        }

        let mut records = Vec::new();
        for (line, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
            let row = row
                .map_err(|e| Error::DataSource(format!("{}: malformed row: {}", source, e)))?;
            match row.into_record() {
                Some(record) => records.push(record),
                None => tracing::warn!("{}: skipping row {} with blank generic name", source, line + 1),
            }
        }

        let registry = Self::from_records(records);
        tracing::info!("Loaded {} drugs from {}", registry.len(), source);
        Ok(registry)
    }

    /// Build a registry from already-parsed records
    ///
    /// Records with a blank generic name are dropped. Duplicate names (after
    /// case folding) are kept; lookups resolve to the first one.
    pub fn from_records(records: Vec<DrugRecord>) -> Self {
        let records: Vec<DrugRecord> = records
            .into_iter()
            .filter(|record| {
                let blank = record.generic_name.trim().is_empty();
                if blank {
                    tracing::warn!("Skipping drug record with blank generic name");
                }
                !blank
            })
            .collect();

        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let key = record.generic_name.to_lowercase();
            if index.contains_key(&key) {
                tracing::warn!(
                    "Duplicate generic name '{}' in registry; first entry wins",
                    record.generic_name
                );
                continue;
            }
            index.insert(key, i);
        }

        Self { records, index }
    }

    /// Case-insensitive exact match on generic name
    pub fn lookup(&self, name: &str) -> Option<&DrugRecord> {
        let found = self
            .index
            .get(&name.to_lowercase())
            .map(|&i| &self.records[i]);
        if found.is_none() {
            tracing::debug!("No registry entry for '{}'", name);
        }
        found
    }

    /// All generic names, deduplicated and sorted
    pub fn all_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.generic_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records in source order
    pub fn records(&self) -> &[DrugRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
