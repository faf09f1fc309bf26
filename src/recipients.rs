mod recipients_extraction_error;

pub use self::recipients_extraction_error::RecipientsExtractionError;
use csv_async::AsyncReaderBuilder;
use futures::StreamExt;

/// Extracts values of the `column` from CSV `data`, one per data row, preserving the row order.
/// The first row is treated as a header and the column name must match exactly. Values aren't
/// validated or de-duplicated.
pub async fn extract_recipients(
    data: &[u8],
    column: &str,
) -> Result<Vec<String>, RecipientsExtractionError> {
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .create_reader(data);

    let headers = csv_reader
        .headers()
        .await
        .map_err(|err| RecipientsExtractionError::Malformed(err.to_string()))?;
    if headers.is_empty() {
        return Err(RecipientsExtractionError::Malformed(
            "no records found".to_string(),
        ));
    }

    // The last column wins if the header row contains duplicated names.
    let column_index = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| *header == column)
        .map(|(index, _)| index)
        .last()
        .ok_or_else(|| RecipientsExtractionError::ColumnNotFound(column.to_string()))?;

    let mut recipients = Vec::new();
    let mut records = csv_reader.records();
    while let Some(record) = records.next().await {
        let record = record.map_err(|err| RecipientsExtractionError::Malformed(err.to_string()))?;
        if let Some(value) = record.get(column_index) {
            recipients.push(value.to_string());
        }
    }

    Ok(recipients)
}
