//! Fixed applicant feature schema shared by the encode, scale and predict stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One column of an applicant record, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    PersonAge,
    PersonGender,
    PersonEducation,
    PersonIncome,
    PersonHomeOwnership,
    PreviousLoanDefaultsOnFile,
    LoanAmnt,
    LoanIntRate,
    LoanPercentIncome,
    CreditScore,
    LoanIntent,
}

impl Feature {
    pub const COUNT: usize = 11;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::PersonAge,
        Feature::PersonGender,
        Feature::PersonEducation,
        Feature::PersonIncome,
        Feature::PersonHomeOwnership,
        Feature::PreviousLoanDefaultsOnFile,
        Feature::LoanAmnt,
        Feature::LoanIntRate,
        Feature::LoanPercentIncome,
        Feature::CreditScore,
        Feature::LoanIntent,
    ];

    pub const CATEGORICAL: [Feature; 5] = [
        Feature::PersonGender,
        Feature::PersonEducation,
        Feature::PersonHomeOwnership,
        Feature::PreviousLoanDefaultsOnFile,
        Feature::LoanIntent,
    ];

    /// Column name used by the artifacts and uploaded CSV files.
    pub fn name(self) -> &'static str {
        match self {
            Feature::PersonAge => "person_age",
            Feature::PersonGender => "person_gender",
            Feature::PersonEducation => "person_education",
            Feature::PersonIncome => "person_income",
            Feature::PersonHomeOwnership => "person_home_ownership",
            Feature::PreviousLoanDefaultsOnFile => "previous_loan_defaults_on_file",
            Feature::LoanAmnt => "loan_amnt",
            Feature::LoanIntRate => "loan_int_rate",
            Feature::LoanPercentIncome => "loan_percent_income",
            Feature::CreditScore => "credit_score",
            Feature::LoanIntent => "loan_intent",
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == name.trim())
    }

    pub fn kind(self) -> FeatureKind {
        match self {
            Feature::PersonAge | Feature::CreditScore => FeatureKind::Integer,
            Feature::PersonIncome
            | Feature::LoanAmnt
            | Feature::LoanIntRate
            | Feature::LoanPercentIncome => FeatureKind::Numeric,
            Feature::PersonGender
            | Feature::PersonEducation
            | Feature::PersonHomeOwnership
            | Feature::PreviousLoanDefaultsOnFile
            | Feature::LoanIntent => FeatureKind::Categorical,
        }
    }

    pub fn is_categorical(self) -> bool {
        self.kind() == FeatureKind::Categorical
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Integer,
    Numeric,
    Categorical,
}

/// Inclusive range the intake form suggests for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuggestedRange {
    pub min: f64,
    pub max: f64,
}

impl SuggestedRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Name, type and form domain of one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub feature: Feature,
    pub kind: FeatureKind,
    #[serde(skip_serializing_if = "no_values")]
    pub suggested_values: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_range: Option<SuggestedRange>,
    pub description: &'static str,
}

/// Ordered list of every feature the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    fields: Vec<FeatureSpec>,
}

impl FeatureSchema {
    pub fn standard() -> Self {
        let fields = Feature::ALL
            .into_iter()
            .map(|feature| FeatureSpec {
                feature,
                kind: feature.kind(),
                suggested_values: suggested_values(feature),
                suggested_range: suggested_range(feature),
                description: description(feature),
            })
            .collect();

        Self { fields }
    }

    pub fn fields(&self) -> &[FeatureSpec] {
        &self.fields
    }

    pub fn spec(&self, feature: Feature) -> &FeatureSpec {
        &self.fields[feature.index()]
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.feature.name())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}

fn no_values(values: &&'static [&'static str]) -> bool {
    values.is_empty()
}

fn suggested_values(feature: Feature) -> &'static [&'static str] {
    match feature {
        Feature::PersonGender => &["male", "female"],
        Feature::PersonEducation => &["High School", "Bachelor", "Master", "Associate"],
        Feature::PersonHomeOwnership => &["RENT", "MORTGAGE", "OWN"],
        Feature::PreviousLoanDefaultsOnFile => &["Yes", "No"],
        Feature::LoanIntent => &[
            "EDUCATION",
            "MEDICAL",
            "VENTURE",
            "PERSONAL",
            "DEBTCONSOLIDATION",
        ],
        _ => &[],
    }
}

fn suggested_range(feature: Feature) -> Option<SuggestedRange> {
    match feature {
        Feature::PersonAge => Some(SuggestedRange::new(18.0, 100.0)),
        Feature::PersonIncome => Some(SuggestedRange::new(1_000.0, 1_000_000.0)),
        Feature::LoanAmnt => Some(SuggestedRange::new(500.0, 50_000.0)),
        Feature::LoanIntRate => Some(SuggestedRange::new(5.0, 30.0)),
        Feature::LoanPercentIncome => Some(SuggestedRange::new(0.0, 1.0)),
        Feature::CreditScore => Some(SuggestedRange::new(300.0, 850.0)),
        _ => None,
    }
}

fn description(feature: Feature) -> &'static str {
    match feature {
        Feature::PersonAge => "Age of the applicant in years",
        Feature::PersonGender => "Applicant gender",
        Feature::PersonEducation => "Highest level of education",
        Feature::PersonIncome => "Total yearly income of the applicant",
        Feature::PersonHomeOwnership => {
            "RENT, MORTGAGE (paying installments) or OWN (fully owned)"
        }
        Feature::PreviousLoanDefaultsOnFile => "Whether the applicant has defaulted on a loan before",
        Feature::LoanAmnt => "Amount the applicant wants to borrow",
        Feature::LoanIntRate => "Annual interest rate on the loan, in percent",
        Feature::LoanPercentIncome => "Loan amount divided by annual income",
        Feature::CreditScore => "Credit score between 300 and 850",
        Feature::LoanIntent => "Purpose of the loan",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_lookup() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("person_emp_exp"), None);
    }

    #[test]
    fn standard_schema_keeps_form_order() {
        let schema = FeatureSchema::standard();
        let names: Vec<_> = schema.column_names().collect();
        assert_eq!(names.len(), Feature::COUNT);
        assert_eq!(names[0], "person_age");
        assert_eq!(names[5], "previous_loan_defaults_on_file");
        assert_eq!(names[10], "loan_intent");
        assert_eq!(
            schema.spec(Feature::CreditScore).suggested_range,
            Some(SuggestedRange::new(300.0, 850.0))
        );
    }

    #[test]
    fn categorical_features_carry_suggested_values() {
        let schema = FeatureSchema::standard();
        for feature in Feature::CATEGORICAL {
            assert!(feature.is_categorical());
            assert!(!schema.spec(feature).suggested_values.is_empty());
        }
    }
}
