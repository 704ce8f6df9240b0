use thiserror::Error;

/// Validation failures raised while turning a flat file into a
/// [`CustomerDataset`](super::model::CustomerDataset).
#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("record {row}: invalid value in column '{column}': {message}")]
    InvalidValue {
        row: usize,
        column: String,
        message: String,
    },

    #[error("unknown retention status '{0}' (expected 'Retained' or 'Churned')")]
    UnknownRetentionStatus(String),

    #[error("dataset contains no records")]
    Empty,
}
