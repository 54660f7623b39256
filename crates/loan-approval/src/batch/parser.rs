use std::io::Read;

use crate::inference::{ApplicantRecord, Feature, FeatureKind, SchemaMismatch};

/// Uploaded table with the positions of every schema column resolved.
#[derive(Debug)]
pub(crate) struct BatchTable {
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Vec<String>>,
    positions: [usize; Feature::COUNT],
}

/// Reads the whole upload and checks the header before any row is touched.
///
/// Short rows are kept and fail on their empty cells; a row wider than the
/// header rejects the upload.
pub(crate) fn read_table<R: Read>(reader: R) -> Result<BatchTable, super::BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut positions = [0usize; Feature::COUNT];
    let mut missing = Vec::new();
    for feature in Feature::ALL {
        match headers.iter().position(|header| header == feature.name()) {
            Some(position) => positions[feature.index()] = position,
            None => missing.push(feature.name().to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(SchemaMismatch::MissingColumns(missing).into());
    }

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(SchemaMismatch::ExtraCells {
                row: idx + 1,
                expected: headers.len(),
                found: record.len(),
            }
            .into());
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(BatchTable {
        headers,
        rows,
        positions,
    })
}

impl BatchTable {
    pub(crate) fn record(&self, row: &[String]) -> Result<ApplicantRecord, SchemaMismatch> {
        let cell = |feature: Feature| -> Result<&str, SchemaMismatch> {
            row.get(self.positions[feature.index()])
                .map(String::as_str)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| SchemaMismatch::EmptyValue {
                    column: feature.name().to_string(),
                })
        };
        let label = |feature: Feature| cell(feature).map(str::to_string);
        let integer = |feature: Feature| cell(feature).and_then(|raw| parse_integer(feature, raw));
        let numeric = |feature: Feature| cell(feature).and_then(|raw| parse_numeric(feature, raw));

        Ok(ApplicantRecord {
            person_age: integer(Feature::PersonAge)?,
            person_gender: label(Feature::PersonGender)?,
            person_education: label(Feature::PersonEducation)?,
            person_income: numeric(Feature::PersonIncome)?,
            person_home_ownership: label(Feature::PersonHomeOwnership)?,
            previous_loan_defaults_on_file: label(Feature::PreviousLoanDefaultsOnFile)?,
            loan_amnt: numeric(Feature::LoanAmnt)?,
            loan_int_rate: numeric(Feature::LoanIntRate)?,
            loan_percent_income: numeric(Feature::LoanPercentIncome)?,
            credit_score: integer(Feature::CreditScore)?,
            loan_intent: label(Feature::LoanIntent)?,
        })
    }
}

fn unparseable(feature: Feature, raw: &str) -> SchemaMismatch {
    SchemaMismatch::UnparseableValue {
        column: feature.name().to_string(),
        value: raw.to_string(),
    }
}

fn parse_numeric(feature: Feature, raw: &str) -> Result<f64, SchemaMismatch> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| unparseable(feature, raw))
}

/// Integers written by spreadsheet exports as `30.0` are accepted.
fn parse_integer(feature: Feature, raw: &str) -> Result<i64, SchemaMismatch> {
    debug_assert_eq!(feature.kind(), FeatureKind::Integer);
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }

    parse_numeric(feature, raw).and_then(|value| {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Ok(value as i64)
        } else {
            Err(unparseable(feature, raw))
        }
    })
}
