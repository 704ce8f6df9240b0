use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int32Type, Int64Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{CustomerDataset, CustomerRecord};

/// Columns every input file must provide. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Age",
    "Location",
    "Satisfaction_Score",
    "Feedback_Score",
    "Time_Spent_on_Site",
    "Products_Purchased",
    "Products_Viewed",
    "Retention_Status",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the customer table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the [`REQUIRED_COLUMNS`] (recommended)
/// * `.json`    – `[{ "Age": 31, "Location": "Urban", ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_file(path: &Path) -> Result<CustomerDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let dataset = CustomerDataset::from_records(records)
        .with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} customers across {} locations (ages {}-{}) from {}",
        dataset.len(),
        dataset.locations.len(),
        dataset.age_bounds.0,
        dataset.age_bounds.1,
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Raw row shared by all formats
// ---------------------------------------------------------------------------

/// One row as it appears on disk, before categorical validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Satisfaction_Score")]
    satisfaction_score: f64,
    #[serde(rename = "Feedback_Score")]
    feedback_score: f64,
    #[serde(rename = "Time_Spent_on_Site")]
    time_spent_on_site: f64,
    #[serde(rename = "Products_Purchased")]
    products_purchased: u32,
    #[serde(rename = "Products_Viewed")]
    products_viewed: u32,
    #[serde(rename = "Retention_Status")]
    retention_status: String,
}

impl RawRecord {
    /// Validate the categorical and float fields of data row `row` (1-based).
    fn into_record(self, row: usize) -> Result<CustomerRecord, DataError> {
        Ok(CustomerRecord {
            age: self.age,
            location: self.location,
            satisfaction_score: finite(self.satisfaction_score, row, "Satisfaction_Score")?,
            feedback_score: finite(self.feedback_score, row, "Feedback_Score")?,
            time_spent_on_site: finite(self.time_spent_on_site, row, "Time_Spent_on_Site")?,
            products_purchased: self.products_purchased,
            products_viewed: self.products_viewed,
            retention_status: self.retention_status.parse()?,
        })
    }
}

/// Reject NaN and infinities, which would poison every mean they touch.
fn finite(value: f64, row: usize, column: &str) -> Result<f64, DataError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataError::InvalidValue {
            row,
            column: column.to_string(),
            message: format!("non-finite value {value}"),
        })
    }
}

fn check_columns(mut present: impl FnMut(&str) -> bool) -> Result<(), DataError> {
    match REQUIRED_COLUMNS.into_iter().find(|col| !present(col)) {
        Some(col) => Err(DataError::MissingColumn(col.to_string())),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<CustomerRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    check_columns(|col| headers.iter().any(|h| h == col))?;
    reader.set_headers(csv::StringRecord::from(headers.clone()));

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
        let raw = result.map_err(|e| csv_value_error(&headers, row_no + 1, e))?;
        records.push(raw.into_record(row_no + 1)?);
    }
    Ok(records)
}

fn csv_value_error(headers: &[String], row: usize, err: csv::Error) -> DataError {
    let column = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err
            .field()
            .and_then(|i| headers.get(i as usize))
            .cloned(),
        _ => None,
    };
    DataError::InvalidValue {
        row,
        column: column.unwrap_or_else(|| "?".to_string()),
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Age": 31, "Location": "Urban", "Satisfaction_Score": 7, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<CustomerRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        check_columns(|col| obj.contains_key(col))?;

        let raw: RawRecord = serde_json::from_value(row.clone())
            .map_err(|e| json_value_error(obj, i + 1, e))?;
        records.push(raw.into_record(i + 1)?);
    }
    Ok(records)
}

/// Name the first required column whose value does not fit its field type.
fn json_value_error(
    obj: &serde_json::Map<String, JsonValue>,
    row: usize,
    err: serde_json::Error,
) -> DataError {
    let fits = |col: &str, value: &JsonValue| match col {
        "Age" | "Products_Purchased" | "Products_Viewed" => {
            serde_json::from_value::<u32>(value.clone()).is_ok()
        }
        "Location" | "Retention_Status" => value.is_string(),
        _ => value.is_number(),
    };
    let column = REQUIRED_COLUMNS
        .into_iter()
        .find(|col| obj.get(*col).is_some_and(|v| !fits(*col, v)))
        .unwrap_or("?");
    DataError::InvalidValue {
        row,
        column: column.to_string(),
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Integer columns may be Int32/Int64/UInt32/UInt64, numeric columns any
/// 32/64-bit integer or float type, categorical columns Utf8/LargeUtf8.
fn load_parquet(path: &Path) -> Result<Vec<CustomerRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        check_columns(|col| schema.index_of(col).is_ok())?;

        let age = batch_column(&batch, "Age")?;
        let location = batch_column(&batch, "Location")?;
        let satisfaction = batch_column(&batch, "Satisfaction_Score")?;
        let feedback = batch_column(&batch, "Feedback_Score")?;
        let time_spent = batch_column(&batch, "Time_Spent_on_Site")?;
        let purchased = batch_column(&batch, "Products_Purchased")?;
        let viewed = batch_column(&batch, "Products_Viewed")?;
        let status = batch_column(&batch, "Retention_Status")?;

        for row in 0..batch.num_rows() {
            let row_no = records.len() + 1;
            let raw = RawRecord {
                age: cell(cell_u32(age, row), row_no, "Age")?,
                location: cell(cell_str(location, row), row_no, "Location")?,
                satisfaction_score: cell(
                    cell_f64(satisfaction, row),
                    row_no,
                    "Satisfaction_Score",
                )?,
                feedback_score: cell(cell_f64(feedback, row), row_no, "Feedback_Score")?,
                time_spent_on_site: cell(
                    cell_f64(time_spent, row),
                    row_no,
                    "Time_Spent_on_Site",
                )?,
                products_purchased: cell(
                    cell_u32(purchased, row),
                    row_no,
                    "Products_Purchased",
                )?,
                products_viewed: cell(cell_u32(viewed, row), row_no, "Products_Viewed")?,
                retention_status: cell(cell_str(status, row), row_no, "Retention_Status")?,
            };
            records.push(raw.into_record(row_no)?);
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn batch_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b ArrayRef> {
    let idx = batch.schema().index_of(name)?;
    Ok(batch.column(idx))
}

fn cell<T>(value: Option<T>, row: usize, column: &str) -> Result<T, DataError> {
    value.ok_or_else(|| DataError::InvalidValue {
        row,
        column: column.to_string(),
        message: "null or unsupported column type".to_string(),
    })
}

fn cell_u32(col: &ArrayRef, row: usize) -> Option<u32> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => u32::try_from(col.as_primitive::<Int32Type>().value(row)).ok(),
        DataType::Int64 => u32::try_from(col.as_primitive::<Int64Type>().value(row)).ok(),
        DataType::UInt32 => Some(col.as_primitive::<UInt32Type>().value(row)),
        DataType::UInt64 => u32::try_from(col.as_primitive::<UInt64Type>().value(row)).ok(),
        _ => None,
    }
}

fn cell_f64(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => Some(col.as_primitive::<Float64Type>().value(row)),
        DataType::Float32 => Some(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::UInt64 => Some(col.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::UInt32 => Some(col.as_primitive::<UInt32Type>().value(row) as f64),
        _ => None,
    }
}

fn cell_str(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray, UInt32Array, UInt64Array};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::{Builder, NamedTempFile};

    use super::*;
    use crate::data::model::RetentionStatus;

    const HEADER: &str = "Customer_ID,Age,Gender,Location,Num_Interactions,Feedback_Score,\
Products_Purchased,Products_Viewed,Time_Spent_on_Site,Satisfaction_Score,Retention_Status";

    fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    fn csv_file(rows: &[&str]) -> NamedTempFile {
        let mut text = format!("{HEADER}\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        temp_file(".csv", &text)
    }

    fn data_error(err: &anyhow::Error) -> &DataError {
        err.downcast_ref::<DataError>()
            .unwrap_or_else(|| panic!("expected DataError, got {err:#}"))
    }

    #[test]
    fn loads_csv_and_ignores_extra_columns() {
        let file = csv_file(&[
            "1,56,Male,Urban,11,4,18,38,18.3,2,Churned",
            "2,69,Female,Suburban,10,3,2,17,9.2,6,Retained",
            "3,46,Male,Urban,5,5,11,46,42.1,10,Retained",
        ]);

        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.locations, vec!["Urban", "Suburban"]);
        assert_eq!(ds.age_bounds, (46, 69));
        let first = &ds.records[0];
        assert_eq!(first.age, 56);
        assert_eq!(first.feedback_score, 4.0);
        assert_eq!(first.products_purchased, 18);
        assert_eq!(first.products_viewed, 38);
        assert_eq!(first.time_spent_on_site, 18.3);
        assert_eq!(first.satisfaction_score, 2.0);
        assert_eq!(first.retention_status, RetentionStatus::Churned);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let file = temp_file(".csv", "Age,Location\n30,Urban\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            data_error(&err),
            DataError::MissingColumn(col) if col == "Satisfaction_Score"
        ));
    }

    #[test]
    fn malformed_value_names_row_and_column() {
        let file = csv_file(&[
            "1,56,Male,Urban,11,4,18,38,18.3,2,Churned",
            "2,sixty,Female,Rural,10,3,2,17,9.2,6,Retained",
        ]);
        let err = load_file(file.path()).unwrap_err();
        match data_error(&err) {
            DataError::InvalidValue { row, column, .. } => {
                assert_eq!(*row, 2);
                assert_eq!(column, "Age");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn json_malformed_value_names_row_and_column() {
        let file = temp_file(
            ".json",
            r#"[
                {"Age": 31, "Location": "Rural", "Satisfaction_Score": 7,
                 "Feedback_Score": 4.5, "Time_Spent_on_Site": 12.0,
                 "Products_Purchased": 3, "Products_Viewed": 9,
                 "Retention_Status": "Retained"},
                {"Age": "thirty", "Location": "Urban", "Satisfaction_Score": 5,
                 "Feedback_Score": 2, "Time_Spent_on_Site": 8.0,
                 "Products_Purchased": 1, "Products_Viewed": 4,
                 "Retention_Status": "Churned"}
            ]"#,
        );
        let err = load_file(file.path()).unwrap_err();
        match data_error(&err) {
            DataError::InvalidValue { row, column, .. } => {
                assert_eq!(*row, 2);
                assert_eq!(column, "Age");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn non_finite_score_is_rejected() {
        let file = csv_file(&[
            "1,56,Male,Urban,11,4,18,38,18.3,2,Churned",
            "2,41,Female,Rural,10,NaN,2,17,9.2,6,Retained",
        ]);
        let err = load_file(file.path()).unwrap_err();
        match data_error(&err) {
            DataError::InvalidValue { row, column, .. } => {
                assert_eq!(*row, 2);
                assert_eq!(column, "Feedback_Score");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unknown_retention_status_is_fatal() {
        let file = csv_file(&["1,56,Male,Urban,11,4,18,38,18.3,2,Paused"]);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            data_error(&err),
            DataError::UnknownRetentionStatus(s) if s == "Paused"
        ));
    }

    #[test]
    fn header_only_file_is_empty_dataset() {
        let file = csv_file(&[]);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(data_error(&err), DataError::Empty));
    }

    #[test]
    fn missing_file_and_unknown_extension_fail() {
        assert!(load_file(Path::new("/definitely/not/here.csv")).is_err());
        let file = temp_file(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }

    #[test]
    fn loads_records_oriented_json() {
        let file = temp_file(
            ".json",
            r#"[
                {"Age": 31, "Location": "Rural", "Satisfaction_Score": 7,
                 "Feedback_Score": 4.5, "Time_Spent_on_Site": 12.0,
                 "Products_Purchased": 3, "Products_Viewed": 9,
                 "Retention_Status": "Retained", "Gender": "Female"}
            ]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].location, "Rural");
        assert_eq!(ds.records[0].satisfaction_score, 7.0);
    }

    #[test]
    fn json_row_without_column_is_rejected() {
        let file = temp_file(".json", r#"[{"Age": 31}]"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(data_error(&err), DataError::MissingColumn(_)));
    }

    #[test]
    fn loads_parquet_with_mixed_numeric_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Age", DataType::Int64, false),
            Field::new("Location", DataType::Utf8, false),
            Field::new("Satisfaction_Score", DataType::Int64, false),
            Field::new("Feedback_Score", DataType::Float64, false),
            Field::new("Time_Spent_on_Site", DataType::Float64, false),
            Field::new("Products_Purchased", DataType::Int64, false),
            Field::new("Products_Viewed", DataType::Int64, false),
            Field::new("Retention_Status", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![25, 40])),
                Arc::new(StringArray::from(vec!["Urban", "Rural"])),
                Arc::new(Int64Array::from(vec![4, 2])),
                Arc::new(Float64Array::from(vec![3.5, 1.0])),
                Arc::new(Float64Array::from(vec![12.5, 30.0])),
                Arc::new(Int64Array::from(vec![2, 7])),
                Arc::new(Int64Array::from(vec![10, 11])),
                Arc::new(StringArray::from(vec!["Retained", "Churned"])),
            ],
        )
        .unwrap();

        let file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.age_bounds, (25, 40));
        assert_eq!(ds.records[1].retention_status, RetentionStatus::Churned);
        assert_eq!(ds.records[0].satisfaction_score, 4.0);
    }

    #[test]
    fn parquet_unsigned_score_columns_are_numeric() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Age", DataType::UInt32, false),
            Field::new("Location", DataType::Utf8, false),
            Field::new("Satisfaction_Score", DataType::UInt64, false),
            Field::new("Feedback_Score", DataType::UInt32, false),
            Field::new("Time_Spent_on_Site", DataType::UInt64, false),
            Field::new("Products_Purchased", DataType::UInt32, false),
            Field::new("Products_Viewed", DataType::UInt32, false),
            Field::new("Retention_Status", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(UInt32Array::from(vec![33])),
                Arc::new(StringArray::from(vec!["Suburban"])),
                Arc::new(UInt64Array::from(vec![8])),
                Arc::new(UInt32Array::from(vec![3])),
                Arc::new(UInt64Array::from(vec![25])),
                Arc::new(UInt32Array::from(vec![4])),
                Arc::new(UInt32Array::from(vec![12])),
                Arc::new(StringArray::from(vec!["Retained"])),
            ],
        )
        .unwrap();

        let file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.satisfaction_score, 8.0);
        assert_eq!(rec.feedback_score, 3.0);
        assert_eq!(rec.time_spent_on_site, 25.0);
    }
}
