//! Non-fatal input advisories. They never block scoring or alter model input.

use serde::Serialize;

use super::domain::ApplicantRecord;
use super::schema::{Feature, FeatureSchema, SuggestedRange};

/// Allowed gap between the supplied ratio and the one derived from amount and income.
const RATIO_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeAdvisory {
    OutsideSuggestedRange {
        feature: Feature,
        value: f64,
        range: SuggestedRange,
    },
    LoanPercentIncomeMismatch {
        supplied: f64,
        suggested: f64,
    },
}

impl RangeAdvisory {
    pub fn message(&self) -> String {
        match self {
            RangeAdvisory::OutsideSuggestedRange {
                feature,
                value,
                range,
            } => format!(
                "{feature} = {value} is outside the suggested range {}-{}",
                range.min, range.max
            ),
            RangeAdvisory::LoanPercentIncomeMismatch {
                supplied,
                suggested,
            } => format!(
                "loan_percent_income = {supplied} differs from loan_amnt / person_income = {suggested:.2}"
            ),
        }
    }
}

/// `loan_amnt / person_income` rounded to two decimals, or `None` without income.
pub fn suggested_loan_percent_income(loan_amnt: f64, person_income: f64) -> Option<f64> {
    if person_income > 0.0 && person_income.is_finite() && loan_amnt.is_finite() {
        Some((loan_amnt / person_income * 100.0).round() / 100.0)
    } else {
        None
    }
}

pub fn review(record: &ApplicantRecord, schema: &FeatureSchema) -> Vec<RangeAdvisory> {
    let mut advisories: Vec<_> = schema
        .fields()
        .iter()
        .filter_map(|spec| {
            let range = spec.suggested_range?;
            let value = record.numeric(spec.feature)?;
            (!range.contains(value)).then_some(RangeAdvisory::OutsideSuggestedRange {
                feature: spec.feature,
                value,
                range,
            })
        })
        .collect();

    if let Some(suggested) =
        suggested_loan_percent_income(record.loan_amnt, record.person_income)
    {
        if (record.loan_percent_income - suggested).abs() > RATIO_TOLERANCE {
            advisories.push(RangeAdvisory::LoanPercentIncomeMismatch {
                supplied: record.loan_percent_income,
                suggested,
            });
        }
    }

    advisories
}
