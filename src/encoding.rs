//! Categorical attributes and their fixed integer encodings.

use serde_json::{Map, Value};

use crate::errors::PredictError;
use crate::state::CategoryLists;

/// Dataset column holding the recommended haircut for each row.
pub const RECOMMENDATION_COLUMN: &str = "Recommended Haircut";

const GENDER: &[(&str, i64)] = &[("Male", 0), ("Female", 1)];
const HAIR_LENGTH: &[(&str, i64)] = &[("Short", 0), ("Medium", 1), ("Long", 2)];
const FACE_SHAPE: &[(&str, i64)] = &[
    ("Oval", 0),
    ("Round", 1),
    ("Square", 2),
    ("Heart", 3),
    ("Diamond", 4),
];
const HAIR_TYPE: &[(&str, i64)] = &[("Straight", 0), ("Wavy", 1), ("Curly", 2)];
const HAIR_DENSITY: &[(&str, i64)] = &[("Thin", 0), ("Medium", 1), ("Thick", 2)];

/// One of the five categorical inputs of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    GenderHaircut,
    HairLength,
    FaceShape,
    HairType,
    HairDensity,
}

impl Attribute {
    /// All attributes, in feature vector order.
    pub const ALL: [Attribute; 5] = [
        Attribute::GenderHaircut,
        Attribute::HairLength,
        Attribute::FaceShape,
        Attribute::HairType,
        Attribute::HairDensity,
    ];

    /// Column label in the dataset, also the field name in prediction requests.
    pub fn column(self) -> &'static str {
        match self {
            Attribute::GenderHaircut => "Gender Haircut",
            Attribute::HairLength => "Hair Length",
            Attribute::FaceShape => "Face Shape",
            Attribute::HairType => "Hair Type",
            Attribute::HairDensity => "Hair Density",
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            Attribute::GenderHaircut => "/genderHaircut",
            Attribute::HairLength => "/hairLength",
            Attribute::FaceShape => "/faceShape",
            Attribute::HairType => "/hairType",
            Attribute::HairDensity => "/hairDensity",
        }
    }

    /// Key of the category list in the listing response.
    pub fn list_key(self) -> &'static str {
        match self {
            Attribute::GenderHaircut => "genderHaircutList",
            Attribute::HairLength => "hairLengthList",
            Attribute::FaceShape => "faceShapeList",
            Attribute::HairType => "hairTypeList",
            Attribute::HairDensity => "hairDensityList",
        }
    }

    pub fn encoding(self) -> &'static [(&'static str, i64)] {
        match self {
            Attribute::GenderHaircut => GENDER,
            Attribute::HairLength => HAIR_LENGTH,
            Attribute::FaceShape => FACE_SHAPE,
            Attribute::HairType => HAIR_TYPE,
            Attribute::HairDensity => HAIR_DENSITY,
        }
    }

    pub fn encode(self, label: &str) -> Option<i64> {
        self.encoding()
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, code)| *code)
    }
}

/// Encode the `features` object of a prediction request into a feature vector.
pub fn encode_features(features: &Map<String, Value>) -> Result<[i64; 5], PredictError> {
    let mut encoded = [0; 5];
    for (slot, attribute) in encoded.iter_mut().zip(Attribute::ALL) {
        let field = attribute.column();
        let value = features
            .get(field)
            .ok_or(PredictError::MissingField { field })?
            .as_str()
            .ok_or(PredictError::NotAString { field })?;

        *slot = attribute
            .encode(value)
            .ok_or_else(|| PredictError::UnknownCategory {
                field,
                value: value.to_string(),
            })?;
    }
    Ok(encoded)
}

/// Differences between the observed dataset categories and the encoding tables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Observed in the dataset but absent from the encoding table. Requests
    /// using these labels will always fail.
    pub unencoded: Vec<(Attribute, String)>,
    /// Present in the encoding table but never observed in the dataset.
    pub unobserved: Vec<(Attribute, &'static str)>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.unencoded.is_empty() && self.unobserved.is_empty()
    }

    pub fn describe_unencoded(&self) -> Vec<String> {
        self.unencoded
            .iter()
            .map(|(attribute, label)| format!("'{}' in column '{}'", label, attribute.column()))
            .collect()
    }
}

pub fn check_consistency(categories: &CategoryLists) -> ConsistencyReport {
    let mut report = ConsistencyReport::default();
    for attribute in Attribute::ALL {
        let observed = categories.get(attribute);

        let mut unencoded: Vec<&String> = observed
            .iter()
            .filter(|label| attribute.encode(label).is_none())
            .collect();
        unencoded.sort();
        report
            .unencoded
            .extend(unencoded.into_iter().map(|label| (attribute, label.clone())));

        report.unobserved.extend(
            attribute
                .encoding()
                .iter()
                .filter(|(known, _)| !observed.iter().any(|label| label == known))
                .map(|(known, _)| (attribute, *known)),
        );
    }
    report
}
