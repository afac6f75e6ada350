use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for the client/household scope that owns a record.
///
/// Positions, flows, scenarios, and stress tests all belong to exactly one
/// client scope. The importer uses this id to decide which source records
/// are in scope for a given import run.
///
/// # Examples
///
/// ```
/// use liquidity_engine::core::client::ClientId;
///
/// let smith = ClientId::new("household-smith");
/// let jones = ClientId::new("household-jones");
/// assert_ne!(smith, jones);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Create a new client identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this client ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_equality() {
        let a = ClientId::new("household-smith");
        let b = ClientId::new("household-smith");
        let c = ClientId::new("entity-smith-llc");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_client_display() {
        let c = ClientId::new("household-smith");
        assert_eq!(format!("{}", c), "household-smith");
    }
}
