//! Operation identifiers.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RegistryError;

/// Prefix namespacing operation ids.
pub const OPERATION_ID_PREFIX: &str = "opid-";

/// Globally unique operation identifier, rendered as `opid-<uuid>`.
///
/// Ids are random (uuid v4 from the OS entropy source), so generating one
/// never coordinates with other threads or operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationId(String);

impl OperationId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self(format!("{OPERATION_ID_PREFIX}{}", Uuid::new_v4()))
    }

    /// The textual form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The uuid part of the id.
    pub fn uuid(&self) -> Uuid {
        // Construction always validates the suffix.
        Uuid::parse_str(&self.0[OPERATION_ID_PREFIX.len()..]).unwrap_or_default()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OperationId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = s
            .strip_prefix(OPERATION_ID_PREFIX)
            .ok_or_else(|| RegistryError::InvalidId(s.to_string()))?;
        let uuid = Uuid::try_parse(suffix).map_err(|_| RegistryError::InvalidId(s.to_string()))?;
        Ok(Self(format!("{OPERATION_ID_PREFIX}{}", uuid.hyphenated())))
    }
}

impl TryFrom<String> for OperationId {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OperationId> for String {
    fn from(id: OperationId) -> Self {
        id.0
    }
}

impl AsRef<str> for OperationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for OperationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
