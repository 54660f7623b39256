use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use tracing::warn;

use super::artifacts::{ArtifactKind, ArtifactLoadError};
use super::schema::Feature;

/// Fitted label-to-code bijection for one categorical feature.
///
/// The code of a label is its position in the fitted class list.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderTable {
    feature: Feature,
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl EncoderTable {
    pub fn new(feature: Feature, classes: Vec<String>) -> Result<Self, ArtifactLoadError> {
        if classes.is_empty() {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Encoders,
                format!("encoder for {feature} has no classes"),
            ));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if codes.insert(label.clone(), code as u32).is_some() {
                return Err(ArtifactLoadError::invalid(
                    ArtifactKind::Encoders,
                    format!("encoder for {feature} lists '{label}' more than once"),
                ));
            }
        }

        Ok(Self {
            feature,
            classes,
            codes,
        })
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn label(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// One encoder table per categorical feature.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSet {
    tables: BTreeMap<Feature, EncoderTable>,
}

impl EncoderSet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactLoadError> {
        let file = ArtifactLoadError::open(ArtifactKind::Encoders, path.as_ref())?;
        Self::from_reader(file)
    }

    /// Reads a JSON object mapping each column name to its fitted class list.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactLoadError> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_reader(reader).map_err(|source| ArtifactLoadError::Json {
                artifact: ArtifactKind::Encoders,
                source,
            })?;

        let mut tables = BTreeMap::new();
        for (column, classes) in raw {
            match Feature::from_name(&column) {
                Some(feature) if feature.is_categorical() => {
                    tables.insert(feature, EncoderTable::new(feature, classes)?);
                }
                Some(feature) => {
                    return Err(ArtifactLoadError::invalid(
                        ArtifactKind::Encoders,
                        format!("{feature} is numeric and cannot carry an encoder"),
                    ));
                }
                None => warn!(%column, "ignoring encoder for a column outside the schema"),
            }
        }

        Self::from_tables(tables.into_values())
    }

    pub fn from_tables<I>(tables: I) -> Result<Self, ArtifactLoadError>
    where
        I: IntoIterator<Item = EncoderTable>,
    {
        let tables: BTreeMap<_, _> = tables
            .into_iter()
            .map(|table| (table.feature(), table))
            .collect();

        let missing: Vec<_> = Feature::CATEGORICAL
            .into_iter()
            .filter(|feature| !tables.contains_key(feature))
            .map(Feature::name)
            .collect();
        if !missing.is_empty() {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Encoders,
                format!("no encoder for {}", missing.join(", ")),
            ));
        }

        Ok(Self { tables })
    }

    pub fn table(&self, feature: Feature) -> Option<&EncoderTable> {
        self.tables.get(&feature)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ENCODERS: &str = r#"{
        "person_gender": ["female", "male"],
        "person_education": ["Associate", "Bachelor", "Doctorate", "High School", "Master"],
        "person_home_ownership": ["MORTGAGE", "OTHER", "OWN", "RENT"],
        "previous_loan_defaults_on_file": ["No", "Yes"],
        "loan_intent": ["DEBTCONSOLIDATION", "EDUCATION", "HOMEIMPROVEMENT", "MEDICAL", "PERSONAL", "VENTURE"],
        "legacy_segment": ["a", "b"]
    }"#;

    #[test]
    fn codes_follow_fitted_class_order() {
        let encoders = EncoderSet::from_reader(Cursor::new(ENCODERS)).expect("encoders load");
        assert_eq!(encoders.len(), 5);

        let education = encoders
            .table(Feature::PersonEducation)
            .expect("education table");
        assert_eq!(education.code("Bachelor"), Some(1));
        assert_eq!(education.code("High School"), Some(3));
        assert_eq!(education.label(4), Some("Master"));
        assert_eq!(education.code("bachelor"), None);
    }

    #[test]
    fn rejects_duplicate_classes() {
        let error = EncoderTable::new(
            Feature::PersonGender,
            vec!["male".to_string(), "male".to_string()],
        )
        .expect_err("duplicates break the bijection");
        assert!(error.to_string().contains("more than once"));
    }

    #[test]
    fn requires_every_categorical_feature() {
        let error = EncoderSet::from_reader(Cursor::new(r#"{"person_gender": ["female", "male"]}"#))
            .expect_err("incomplete encoders");
        let message = error.to_string();
        assert!(message.contains("person_education"));
        assert!(message.contains("loan_intent"));
    }

    #[test]
    fn rejects_encoder_for_numeric_feature() {
        let error = EncoderSet::from_reader(Cursor::new(r#"{"credit_score": ["low", "high"]}"#))
            .expect_err("numeric encoder");
        assert_eq!(error.artifact(), ArtifactKind::Encoders);
    }

    #[test]
    fn malformed_json_is_reported() {
        match EncoderSet::from_reader(Cursor::new("not json")) {
            Err(ArtifactLoadError::Json { artifact, .. }) => {
                assert_eq!(artifact, ArtifactKind::Encoders)
            }
            other => panic!("expected json error, got {other:?}"),
        }
    }
}
