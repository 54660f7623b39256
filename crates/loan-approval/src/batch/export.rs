use super::{BatchError, BatchReport};

pub const PREDICTION_COLUMN: &str = "prediction";
pub const APPROVAL_PROB_COLUMN: &str = "approval_prob";

/// Writes the upload back out with the prediction and probability columns.
///
/// Existing columns with either name are overwritten in place; otherwise both
/// are appended after the uploaded columns. Failed rows leave both cells empty.
pub(super) fn write_csv(report: &BatchReport) -> Result<String, BatchError> {
    let mut headers = report.headers.clone();
    let prediction_at = column_position(&mut headers, PREDICTION_COLUMN);
    let probability_at = column_position(&mut headers, APPROVAL_PROB_COLUMN);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;

    for row in &report.rows {
        // Rows never exceed the header; short rows are padded.
        let mut cells = row.values.clone();
        cells.resize(headers.len(), String::new());

        let (label, probability) = match row.prediction() {
            Some(prediction) => (
                prediction.label.label().to_string(),
                prediction.probability.to_string(),
            ),
            None => (String::new(), String::new()),
        };
        cells[prediction_at] = label;
        cells[probability_at] = probability;

        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| BatchError::Io(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| BatchError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

fn column_position(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|header| header == name) {
        Some(position) => position,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}
