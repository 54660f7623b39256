use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::SchemaMismatch;
use super::schema::{Feature, FeatureKind};

/// One loan application as collected by the intake form or a CSV row.
///
/// Categorical fields hold the raw labels; numeric fields are accepted as given
/// even when they fall outside the form's suggested ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    #[serde(deserialize_with = "whole_number")]
    pub person_age: i64,
    pub person_gender: String,
    pub person_education: String,
    pub person_income: f64,
    pub person_home_ownership: String,
    pub previous_loan_defaults_on_file: String,
    pub loan_amnt: f64,
    pub loan_int_rate: f64,
    pub loan_percent_income: f64,
    #[serde(deserialize_with = "whole_number")]
    pub credit_score: i64,
    pub loan_intent: String,
}

impl ApplicantRecord {
    /// Builds a record from a submitted JSON object, naming the first field in
    /// form order that is absent, null or of the wrong type.
    pub fn from_json(value: Value) -> Result<Self, SchemaMismatch> {
        let fields = value.as_object().ok_or_else(|| {
            SchemaMismatch::InvalidRecord("expected a JSON object of applicant fields".to_string())
        })?;

        for feature in Feature::ALL {
            let field = fields
                .get(feature.name())
                .filter(|field| !field.is_null())
                .ok_or_else(|| SchemaMismatch::MissingFeature(feature.name().to_string()))?;
            let accepted = match feature.kind() {
                FeatureKind::Categorical => field.is_string(),
                FeatureKind::Numeric => field.is_number(),
                FeatureKind::Integer => field.as_f64().is_some_and(|value| value.fract() == 0.0),
            };
            if !accepted {
                return Err(SchemaMismatch::UnparseableValue {
                    column: feature.name().to_string(),
                    value: field.to_string(),
                });
            }
        }

        serde_json::from_value(value)
            .map_err(|error| SchemaMismatch::InvalidRecord(error.to_string()))
    }

    /// Raw label for a categorical feature, `None` for numeric ones.
    pub fn label(&self, feature: Feature) -> Option<&str> {
        match feature {
            Feature::PersonGender => Some(&self.person_gender),
            Feature::PersonEducation => Some(&self.person_education),
            Feature::PersonHomeOwnership => Some(&self.person_home_ownership),
            Feature::PreviousLoanDefaultsOnFile => Some(&self.previous_loan_defaults_on_file),
            Feature::LoanIntent => Some(&self.loan_intent),
            _ => None,
        }
    }

    /// Value of a numeric feature, `None` for categorical ones.
    pub fn numeric(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::PersonAge => Some(self.person_age as f64),
            Feature::PersonIncome => Some(self.person_income),
            Feature::LoanAmnt => Some(self.loan_amnt),
            Feature::LoanIntRate => Some(self.loan_int_rate),
            Feature::LoanPercentIncome => Some(self.loan_percent_income),
            Feature::CreditScore => Some(self.credit_score as f64),
            _ => None,
        }
    }
}

/// Accepts `30` and `30.0` alike, matching the CSV intake.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Float(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Integer(value) => Ok(value),
        Raw::Float(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Ok(value as i64)
        }
        Raw::Float(value) => Err(D::Error::custom(format!(
            "expected a whole number, got {value}"
        ))),
    }
}

/// Applicant record after categorical labels were replaced by encoder codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodedRecord {
    values: BTreeMap<Feature, f64>,
}

impl EncodedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: Feature, value: f64) -> Option<f64> {
        self.values.insert(feature, value)
    }

    pub fn remove(&mut self, feature: Feature) -> Option<f64> {
        self.values.remove(&feature)
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values.get(&feature).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Scaled values in the classifier's declared column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDecision {
    Approved,
    Rejected,
}

impl LoanDecision {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            LoanDecision::Approved
        } else {
            LoanDecision::Rejected
        }
    }

    pub fn class(self) -> u8 {
        match self {
            LoanDecision::Approved => 1,
            LoanDecision::Rejected => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanDecision::Approved => "approved",
            LoanDecision::Rejected => "rejected",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            LoanDecision::Approved => "Loan is likely to be approved.",
            LoanDecision::Rejected => "Loan is likely to be rejected.",
        }
    }
}

/// Classifier output for one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: LoanDecision,
    /// Positive-class (approval) probability in `[0, 1]`.
    pub probability: f32,
}

impl PredictionResult {
    pub fn is_approved(&self) -> bool {
        self.label == LoanDecision::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submitted() -> Value {
        json!({
            "person_age": 30,
            "person_gender": "male",
            "person_education": "Bachelor",
            "person_income": 50000,
            "person_home_ownership": "RENT",
            "loan_amnt": 10000.0,
            "loan_intent": "PERSONAL",
            "loan_int_rate": 15.0,
            "loan_percent_income": 0.2,
            "credit_score": 650,
            "previous_loan_defaults_on_file": "No"
        })
    }

    #[test]
    fn whole_number_floats_are_accepted_for_integer_fields() {
        let mut value = submitted();
        value["person_age"] = json!(30.0);
        value["credit_score"] = json!(650.0);

        let record = ApplicantRecord::from_json(value.clone()).expect("record builds");
        assert_eq!(record.person_age, 30);
        assert_eq!(record.credit_score, 650);

        let direct: ApplicantRecord = serde_json::from_value(value).expect("record deserializes");
        assert_eq!(direct, record);
    }

    #[test]
    fn fractional_age_names_the_field() {
        let mut value = submitted();
        value["person_age"] = json!(30.5);

        assert_eq!(
            ApplicantRecord::from_json(value.clone()),
            Err(SchemaMismatch::UnparseableValue {
                column: "person_age".to_string(),
                value: "30.5".to_string(),
            })
        );
        assert!(serde_json::from_value::<ApplicantRecord>(value).is_err());
    }

    #[test]
    fn absent_or_null_field_is_missing_feature() {
        let mut value = submitted();
        value
            .as_object_mut()
            .expect("object")
            .remove("credit_score");
        assert_eq!(
            ApplicantRecord::from_json(value),
            Err(SchemaMismatch::MissingFeature("credit_score".to_string()))
        );

        let mut value = submitted();
        value["loan_intent"] = Value::Null;
        assert_eq!(
            ApplicantRecord::from_json(value),
            Err(SchemaMismatch::MissingFeature("loan_intent".to_string()))
        );
    }

    #[test]
    fn label_sent_as_number_is_unparseable() {
        let mut value = submitted();
        value["person_gender"] = json!(1);

        let error = ApplicantRecord::from_json(value).expect_err("number is not a label");
        assert_eq!(error.column(), Some("person_gender"));
    }

    #[test]
    fn non_object_body_is_invalid() {
        assert!(matches!(
            ApplicantRecord::from_json(json!([1, 2, 3])),
            Err(SchemaMismatch::InvalidRecord(_))
        ));
    }
}
