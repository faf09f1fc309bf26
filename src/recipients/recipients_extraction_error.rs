/// Describes why recipients couldn't be extracted from the tabular data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipientsExtractionError {
    /// Data cannot be parsed as CSV rows or doesn't contain any rows.
    #[error("Cannot read records from the CSV file: {0}")]
    Malformed(String),
    /// Requested column isn't present in the header row.
    #[error("Column `{0}` is not found in the CSV file.")]
    ColumnNotFound(String),
}
