use serde::Serialize;

/// Lifecycle status of the batch.
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum BatchStatus {
    /// Some of the recipients don't have a terminal outcome yet.
    Open,
    /// Every recipient has a terminal outcome, the batch is immutable.
    Closed,
}
