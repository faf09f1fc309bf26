use serde::{Deserialize, Serialize};
use std::{fmt::Display, ops::Deref, str::FromStr};
use uuid::Uuid;

/// Defines a type for the ID of the batch. IDs are time-ordered (UUID v7).
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct BatchId(Uuid);
impl BatchId {
    /// Issues a new, unique batch ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for BatchId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for BatchId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

impl Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Deref for BatchId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
