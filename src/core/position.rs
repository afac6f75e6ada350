use crate::core::client::ClientId;
use crate::core::currency::CurrencyCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The level at which a cash position is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionScope {
    Household,
    Entity,
    Portfolio,
    Account,
}

impl fmt::Display for PositionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PositionScope::Household => "household",
            PositionScope::Entity => "entity",
            PositionScope::Portfolio => "portfolio",
            PositionScope::Account => "account",
        };
        write!(f, "{}", label)
    }
}

/// A point-in-time cash balance for one account or aggregation scope.
///
/// Positions are immutable once recorded: a fresher balance from a custodial
/// sync or manual entry supersedes the old one with a later `as_of`, it never
/// mutates a position in place. The forecast engine sums position balances to
/// derive its starting balance and reads nothing else from them.
///
/// # Examples
///
/// ```
/// use liquidity_engine::core::client::ClientId;
/// use liquidity_engine::core::currency::CurrencyCode;
/// use liquidity_engine::core::position::{CashPosition, PositionScope};
/// use rust_decimal_macros::dec;
///
/// let position = CashPosition::new(
///     ClientId::new("household-smith"),
///     PositionScope::Account,
///     dec!(2_500_000),
///     CurrencyCode::new("USD"),
/// );
///
/// assert_eq!(position.balance(), dec!(2_500_000));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashPosition {
    /// Owning client scope.
    client: ClientId,
    /// Aggregation level this balance applies to.
    scope: PositionScope,
    /// The cash balance. May be negative for overdrawn accounts.
    balance: Decimal,
    /// The currency of denomination.
    currency: CurrencyCode,
    /// When this balance was observed. Defaults to now when absent from
    /// serialized input.
    #[serde(default = "Utc::now")]
    as_of: DateTime<Utc>,
    /// Optional account/portfolio reference for drill-down.
    reference: Option<String>,
}

impl CashPosition {
    /// Create a new position observed now.
    pub fn new(
        client: ClientId,
        scope: PositionScope,
        balance: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            client,
            scope,
            balance,
            currency,
            as_of: Utc::now(),
            reference: None,
        }
    }

    /// Set an explicit observation timestamp (useful for testing / replay).
    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    /// Set an account/portfolio reference string.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    // --- Accessors ---

    pub fn client(&self) -> &ClientId {
        &self.client
    }

    pub fn scope(&self) -> PositionScope {
        self.scope
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

/// Sum the balances of a set of positions.
///
/// Positions are assumed to already share one settlement currency at this
/// layer; normalization is the calling layer's responsibility.
pub fn total_balance(positions: &[CashPosition]) -> Decimal {
    positions.iter().map(|p| p.balance()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_position(balance: Decimal) -> CashPosition {
        CashPosition::new(
            ClientId::new("household-smith"),
            PositionScope::Account,
            balance,
            CurrencyCode::new("USD"),
        )
    }

    #[test]
    fn test_position_creation() {
        let p = sample_position(dec!(1_000_000));
        assert_eq!(p.client().as_str(), "household-smith");
        assert_eq!(p.scope(), PositionScope::Account);
        assert_eq!(p.balance(), dec!(1_000_000));
    }

    #[test]
    fn test_total_balance() {
        let positions = vec![
            sample_position(dec!(600_000)),
            sample_position(dec!(400_000)),
            sample_position(dec!(-50_000)),
        ];
        assert_eq!(total_balance(&positions), dec!(950_000));
    }

    #[test]
    fn test_total_balance_empty() {
        assert_eq!(total_balance(&[]), Decimal::ZERO);
    }
}
