//! In-memory tabular dataset, read once at startup.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::encoding::{Attribute, RECOMMENDATION_COLUMN};
use crate::errors::DatasetError;

/// Column-major view of a headered CSV file. Read-only after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: HashMap<String, Vec<String>>,
    rows: usize,
}

impl Dataset {
    /// Read the dataset and check that every attribute column and the
    /// recommendation column are present.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let reader = csv::Reader::from_path(path.as_ref())?;
        let dataset = Self::from_reader(reader)?;
        debug!(
            "Read {} rows from {}",
            dataset.len(),
            path.as_ref().display()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        let mut rows = 0;
        for record in reader.records() {
            let record = record?;
            for (column, value) in columns.iter_mut().zip(record.iter()) {
                column.push(value.to_string());
            }
            rows += 1;
        }

        let dataset = Self {
            columns: headers.into_iter().zip(columns).collect(),
            rows,
        };

        let required = Attribute::ALL
            .iter()
            .map(|a| a.column())
            .chain(std::iter::once(RECOMMENDATION_COLUMN));
        for column in required {
            if !dataset.columns.contains_key(column) {
                return Err(DatasetError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }

        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Deduplicated values of a column. Order is unspecified; empty cells are
    /// skipped.
    pub fn distinct(&self, name: &str) -> Result<Vec<String>, DatasetError> {
        let column = self.column(name).ok_or_else(|| DatasetError::MissingColumn {
            column: name.to_string(),
        })?;

        let unique: HashSet<&str> = column
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        Ok(unique.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Gender Haircut,Hair Length,Face Shape,Hair Type,Hair Density,Recommended Haircut
Male,Short,Oval,Straight,Thick,Crew Cut
Female,Long,Heart,Wavy,Medium,Long Layers
Male,Short,Round,Curly,Thick,Crew Cut
Female,Medium,Oval,,Thin,Bob
";

    fn load(csv: &str) -> Result<Dataset, DatasetError> {
        Dataset::from_reader(csv::Reader::from_reader(csv.as_bytes()))
    }

    #[test]
    fn loads_columns_by_header() {
        let dataset = load(CSV).unwrap();
        assert_eq!(dataset.len(), 4);
        assert_eq!(
            dataset.column("Face Shape").unwrap(),
            &["Oval", "Heart", "Round", "Oval"]
        );
        assert!(dataset.column("Hair Colour").is_none());
    }

    #[test]
    fn distinct_deduplicates_and_skips_empty_cells() {
        let dataset = load(CSV).unwrap();

        let mut genders = dataset.distinct("Gender Haircut").unwrap();
        genders.sort();
        assert_eq!(genders, vec!["Female", "Male"]);

        let mut types = dataset.distinct("Hair Type").unwrap();
        types.sort();
        assert_eq!(types, vec!["Curly", "Straight", "Wavy"]);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "Gender Haircut,Hair Length,Face Shape,Hair Type,Recommended Haircut\n\
                   Male,Short,Oval,Straight,Crew Cut\n";
        match load(csv) {
            Err(DatasetError::MissingColumn { column }) => assert_eq!(column, "Hair Density"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Dataset::load(dir.path().join("nope.csv")),
            Err(DatasetError::Csv(_))
        ));
    }
}
