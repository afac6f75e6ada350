use crate::core::client::ClientId;
use crate::core::currency::CurrencyCode;
use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a cash movement relative to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    Inflow,
    Outflow,
}

/// Category of a cash movement.
///
/// Categories drive scenario adjustments: distribution inflows can be
/// delayed, capital-call outflows shifted, debt outflows rate-shocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowCategory {
    CapitalCall,
    Distribution,
    Invoice,
    Tax,
    Debt,
    Payroll,
    Rent,
    Dividend,
    Interest,
    Fee,
    Other,
}

impl fmt::Display for FlowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowCategory::CapitalCall => "capital_call",
            FlowCategory::Distribution => "distribution",
            FlowCategory::Invoice => "invoice",
            FlowCategory::Tax => "tax",
            FlowCategory::Debt => "debt",
            FlowCategory::Payroll => "payroll",
            FlowCategory::Rent => "rent",
            FlowCategory::Dividend => "dividend",
            FlowCategory::Interest => "interest",
            FlowCategory::Fee => "fee",
            FlowCategory::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// How often a recurring flow repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Once,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annually,
}

impl RecurrencePattern {
    /// The occurrence date following `date`, or `None` for one-off flows.
    ///
    /// Weekly and biweekly step by a fixed day count; monthly, quarterly,
    /// and annual recurrences step by calendar months so month-end dates
    /// clamp the way `chrono` clamps them (Jan 31 + 1 month = Feb 28/29).
    pub fn next_date(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            RecurrencePattern::Once => None,
            RecurrencePattern::Weekly => date.checked_add_days(Days::new(7)),
            RecurrencePattern::Biweekly => date.checked_add_days(Days::new(14)),
            RecurrencePattern::Monthly => date.checked_add_months(Months::new(1)),
            RecurrencePattern::Quarterly => date.checked_add_months(Months::new(3)),
            RecurrencePattern::Annually => date.checked_add_months(Months::new(12)),
        }
    }
}

/// Recurrence descriptor attached to a flow template.
///
/// Expansion stops at the earliest of the forecast horizon end, `end_date`,
/// or the `occurrences` cap. Both bounds are optional; an unbounded weekly
/// recurrence simply fills the horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
}

impl Recurrence {
    pub fn new(pattern: RecurrencePattern) -> Self {
        Self {
            pattern,
            end_date: None,
            occurrences: None,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn capped(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }
}

/// Provenance of an imported flow, e.g. `invoice:inv-17`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: String,
    pub id: String,
}

impl SourceRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A single expected cash movement.
///
/// A flow with a recurrence descriptor is a *template*: the forecast engine
/// expands it into dated instances on read, and those instances are never
/// persisted as independent records. Instance ids are the template id
/// suffixed with an occurrence index (`"{id}_{n}"`), so outputs referencing
/// the same occurrence are stable across re-runs with identical inputs.
///
/// # Examples
///
/// ```
/// use liquidity_engine::core::client::ClientId;
/// use liquidity_engine::core::currency::CurrencyCode;
/// use liquidity_engine::core::flow::{CashFlow, FlowCategory, FlowDirection};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let flow = CashFlow::new(
///     "inv-17",
///     ClientId::new("household-smith"),
///     FlowDirection::Outflow,
///     FlowCategory::Invoice,
///     NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
///     dec!(45_000),
///     CurrencyCode::new("USD"),
/// );
///
/// assert_eq!(flow.amount(), dec!(45_000));
/// assert!(!flow.is_recurring());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlow {
    /// Stable identifier. Importer-derived flows use `{prefix}-{source_id}`.
    id: String,
    /// Owning client scope.
    client: ClientId,
    direction: FlowDirection,
    category: FlowCategory,
    /// Template date: the first (or only) occurrence.
    flow_date: NaiveDate,
    /// The expected amount. Must be positive; direction carries the sign.
    amount: Decimal,
    currency: CurrencyCode,
    /// Present on recurring templates only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurrence: Option<Recurrence>,
    /// Whether the counterparty has confirmed/approved the movement.
    /// Informational: unconfirmed flows still enter the projection.
    confirmed: bool,
    /// Where this flow was imported from, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<SourceRef>,
}

impl CashFlow {
    /// Create a new one-off, unconfirmed flow.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn new(
        id: impl Into<String>,
        client: ClientId,
        direction: FlowDirection,
        category: FlowCategory,
        flow_date: NaiveDate,
        amount: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        assert!(
            amount > Decimal::ZERO,
            "Flow amount must be positive, got {}",
            amount
        );
        Self {
            id: id.into(),
            client,
            direction,
            category,
            flow_date,
            amount,
            currency,
            recurrence: None,
            confirmed: false,
            source: None,
        }
    }

    /// Attach a recurrence descriptor, turning this flow into a template.
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Mark the flow as confirmed by its counterparty.
    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    /// Record the source this flow was imported from.
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client(&self) -> &ClientId {
        &self.client
    }

    pub fn direction(&self) -> FlowDirection {
        self.direction
    }

    pub fn category(&self) -> FlowCategory {
        self.category
    }

    pub fn flow_date(&self) -> NaiveDate {
        self.flow_date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn recurrence(&self) -> Option<&Recurrence> {
        self.recurrence.as_ref()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn source(&self) -> Option<&SourceRef> {
        self.source.as_ref()
    }
}

/// A collection of flow templates feeding a forecast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowSet {
    flows: Vec<CashFlow>,
}

impl FlowSet {
    pub fn new() -> Self {
        Self { flows: Vec::new() }
    }

    pub fn add(&mut self, flow: CashFlow) {
        self.flows.push(flow);
    }

    /// Insert a flow, replacing any existing flow with the same id.
    ///
    /// This is what makes re-imports idempotent: importer-derived ids are
    /// deterministic, so importing the same source record twice overwrites
    /// rather than duplicates.
    pub fn upsert(&mut self, flow: CashFlow) {
        match self.flows.iter_mut().find(|f| f.id() == flow.id()) {
            Some(existing) => *existing = flow,
            None => self.flows.push(flow),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CashFlow> {
        self.flows.iter().find(|f| f.id() == id)
    }

    pub fn flows(&self) -> &[CashFlow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Total template amount in one direction (recurrences not expanded).
    pub fn gross_total(&self, direction: FlowDirection) -> Decimal {
        self.flows
            .iter()
            .filter(|f| f.direction() == direction)
            .map(|f| f.amount())
            .sum()
    }
}

impl FromIterator<CashFlow> for FlowSet {
    fn from_iter<T: IntoIterator<Item = CashFlow>>(iter: T) -> Self {
        Self {
            flows: iter.into_iter().collect(),
        }
    }
}
