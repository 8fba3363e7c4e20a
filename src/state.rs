//! Process-wide state, built once at startup and read by every handler.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::classifier::{load_classifier, Classifier};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::encoding::{check_consistency, Attribute, RECOMMENDATION_COLUMN};
use crate::errors::AppError;

/// The distinct values observed for each attribute.
#[derive(Debug, Clone, Default)]
pub struct CategoryLists {
    lists: HashMap<Attribute, Vec<String>>,
}

impl CategoryLists {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, AppError> {
        let mut lists = Self::default();
        for attribute in Attribute::ALL {
            lists.insert(attribute, dataset.distinct(attribute.column())?);
        }
        Ok(lists)
    }

    pub fn insert(&mut self, attribute: Attribute, values: Vec<String>) {
        self.lists.insert(attribute, values);
    }

    pub fn get(&self, attribute: Attribute) -> &[String] {
        self.lists.get(&attribute).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub struct AppState {
    categories: CategoryLists,
    classifier: Option<Arc<dyn Classifier>>,
}

impl AppState {
    pub fn new(categories: CategoryLists, classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            categories,
            classifier,
        }
    }

    /// Load the dataset and the model named by `config`.
    ///
    /// A dataset failure is returned as an error. A model failure leaves the
    /// state without a classifier.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let dataset = Dataset::load(&config.data.dataset_path)?;
        if dataset.is_empty() {
            warn!(
                "Dataset {} has no rows; category lists will be empty",
                config.data.dataset_path.display()
            );
        } else {
            info!(
                "Dataset loaded from {} ({} rows)",
                config.data.dataset_path.display(),
                dataset.len()
            );
        }

        let categories = CategoryLists::from_dataset(&dataset)?;
        for attribute in Attribute::ALL {
            info!(
                "{}: {} categories",
                attribute.column(),
                categories.get(attribute).len()
            );
        }

        let report = check_consistency(&categories);
        if !report.is_consistent() {
            for (attribute, label) in &report.unencoded {
                warn!(
                    "Dataset value '{}' in column '{}' has no encoding; predictions using it will fail",
                    label,
                    attribute.column()
                );
            }
            for (attribute, label) in &report.unobserved {
                warn!(
                    "Encoded value '{}' for '{}' never appears in the dataset",
                    label,
                    attribute.column()
                );
            }
        }
        if config.validation.strict_categories && !report.unencoded.is_empty() {
            return Err(AppError::InconsistentCategories {
                mismatches: report.describe_unencoded(),
            });
        }

        let labels = match &config.model.labels {
            Some(labels) => labels.clone(),
            None => {
                let mut labels = dataset.distinct(RECOMMENDATION_COLUMN)?;
                labels.sort();
                labels
            }
        };
        let classifier = load_classifier(&config.model, labels);

        Ok(Self::new(categories, classifier))
    }

    pub fn categories(&self, attribute: Attribute) -> &[String] {
        self.categories.get(attribute)
    }

    pub fn classifier(&self) -> Option<Arc<dyn Classifier>> {
        self.classifier.clone()
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_test::traced_test;

    const CSV: &str = "\
Gender Haircut,Hair Length,Face Shape,Hair Type,Hair Density,Recommended Haircut
Male,Short,Oval,Straight,Thick,Crew Cut
Female,Long,Oblong,Wavy,Medium,Long Layers
";

    fn config_for(csv: &str, dir: &tempfile::TempDir) -> Config {
        let path = dir.path().join("dataset.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let mut config = Config::default();
        config.data.dataset_path = path;
        config.model.path = dir.path().join("missing.onnx");
        config
    }

    #[test]
    #[traced_test]
    fn lenient_start_keeps_unencoded_categories() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::from_config(&config_for(CSV, &dir)).unwrap();

        let mut shapes = state.categories(Attribute::FaceShape).to_vec();
        shapes.sort();
        assert_eq!(shapes, vec!["Oblong", "Oval"]);
        assert!(!state.model_loaded());
        assert!(logs_contain("'Oblong' in column 'Face Shape' has no encoding"));
        assert!(logs_contain("Encoded value 'Diamond' for 'Face Shape' never appears"));
    }

    #[test]
    #[traced_test]
    fn consistent_dataset_logs_no_mismatches() {
        let mut csv = String::from(
            "Gender Haircut,Hair Length,Face Shape,Hair Type,Hair Density,Recommended Haircut\n",
        );
        for row in [
            "Male,Short,Oval,Straight,Thin,Crew Cut",
            "Female,Medium,Round,Wavy,Medium,Bob",
            "Male,Long,Square,Curly,Thick,Man Bun",
            "Female,Short,Heart,Straight,Thin,Pixie Cut",
            "Female,Long,Diamond,Wavy,Medium,Long Layers",
        ] {
            csv.push_str(row);
            csv.push('\n');
        }

        let dir = tempfile::tempdir().unwrap();
        AppState::from_config(&config_for(&csv, &dir)).unwrap();
        assert!(logs_contain("Dataset loaded from"));
        assert!(!logs_contain("has no encoding"));
        assert!(!logs_contain("never appears in the dataset"));
    }

    #[test]
    #[traced_test]
    fn header_only_dataset_starts_with_empty_lists() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::from_config(&config_for(
            "Gender Haircut,Hair Length,Face Shape,Hair Type,Hair Density,Recommended Haircut\n",
            &dir,
        ))
        .unwrap();

        assert!(state.categories(Attribute::HairType).is_empty());
        assert!(logs_contain("has no rows"));
    }

    #[test]
    fn strict_start_rejects_unencoded_categories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(CSV, &dir);
        config.validation.strict_categories = true;

        match AppState::from_config(&config) {
            Err(AppError::InconsistentCategories { mismatches }) => {
                assert_eq!(mismatches, vec!["'Oblong' in column 'Face Shape'"]);
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("strict validation should fail"),
        }
    }

    #[test]
    fn missing_dataset_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data.dataset_path = dir.path().join("absent.csv");
        assert!(matches!(
            AppState::from_config(&config),
            Err(AppError::Dataset(_))
        ));
    }
}
