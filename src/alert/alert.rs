use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Alert severity, also the ordering key for deduplication.
///
/// Declared lowest-first so the derived `Ord` makes `Critical` the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    /// Weight used by the priority score.
    pub fn weight(&self) -> i64 {
        match self {
            AlertSeverity::Critical => 1000,
            AlertSeverity::Warning => 100,
            AlertSeverity::Info => 10,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Critical => "critical",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Info => "info",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lifecycle status: open → acknowledged → closed. Acknowledgement is
/// optional; closed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Closed,
}

impl AlertStatus {
    /// Weight used by the priority score.
    pub fn weight(&self) -> i64 {
        match self {
            AlertStatus::Open => 100,
            AlertStatus::Acknowledged => 10,
            AlertStatus::Closed => 1,
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertStatus::Open => "open",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Closed => "closed",
        };
        write!(f, "{}", label)
    }
}

/// Invalid lifecycle transitions.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("cannot acknowledge an alert that is {status}")]
    NotAcknowledgeable { status: AlertStatus },
    #[error("alert is already closed")]
    AlreadyClosed,
}

/// Priority of a suggested remediation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

/// One suggested remediation action attached to an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub description: String,
    pub priority: ActionPriority,
}

impl SuggestedAction {
    pub fn new(description: impl Into<String>, priority: ActionPriority) -> Self {
        Self {
            description: description.into(),
            priority,
        }
    }
}

/// One actionable liquidity notification tied to a forecast run.
///
/// Alerts are created by the alert engine and owned by the forecast that
/// produced them. A human actor may acknowledge or close them; escalation
/// is a pure predicate evaluated by an external scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityAlert {
    id: Uuid,
    severity: AlertSeverity,
    status: AlertStatus,
    /// The first projected day below the minimum-cash threshold.
    deficit_date: NaiveDate,
    /// How far the projected minimum falls below the threshold.
    shortfall: Decimal,
    /// Days from the forecast start until the deficit date, captured at
    /// generation time.
    days_until_deficit: i64,
    title: String,
    description: String,
    actions: Vec<SuggestedAction>,
    created_at: DateTime<Utc>,
    /// Name of the scenario or stress test the forecast ran under, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_scenario: Option<String>,
}

impl LiquidityAlert {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        severity: AlertSeverity,
        deficit_date: NaiveDate,
        shortfall: Decimal,
        days_until_deficit: i64,
        title: String,
        description: String,
        actions: Vec<SuggestedAction>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            status: AlertStatus::Open,
            deficit_date,
            shortfall,
            days_until_deficit,
            title,
            description,
            actions,
            created_at,
            source_scenario: None,
        }
    }

    /// Tag the alert with the scenario or stress test it came from.
    pub fn with_source_scenario(mut self, name: impl Into<String>) -> Self {
        self.source_scenario = Some(name.into());
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn severity(&self) -> AlertSeverity {
        self.severity
    }

    pub fn status(&self) -> AlertStatus {
        self.status
    }

    pub fn deficit_date(&self) -> NaiveDate {
        self.deficit_date
    }

    pub fn shortfall(&self) -> Decimal {
        self.shortfall
    }

    pub fn days_until_deficit(&self) -> i64 {
        self.days_until_deficit
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn actions(&self) -> &[SuggestedAction] {
        &self.actions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn source_scenario(&self) -> Option<&str> {
        self.source_scenario.as_deref()
    }

    // --- Lifecycle ---

    /// Mark the alert as seen. Only open alerts can be acknowledged.
    pub fn acknowledge(&mut self) -> Result<(), AlertError> {
        match self.status {
            AlertStatus::Open => {
                self.status = AlertStatus::Acknowledged;
                Ok(())
            }
            status => Err(AlertError::NotAcknowledgeable { status }),
        }
    }

    /// Close the alert. Open alerts may close directly; closed is terminal.
    pub fn close(&mut self) -> Result<(), AlertError> {
        match self.status {
            AlertStatus::Closed => Err(AlertError::AlreadyClosed),
            _ => {
                self.status = AlertStatus::Closed;
                Ok(())
            }
        }
    }

    /// Whether an external scheduler should escalate this alert at `now`:
    /// critical, still open, and more than 24 hours old.
    pub fn should_escalate(&self, now: DateTime<Utc>) -> bool {
        self.severity == AlertSeverity::Critical
            && self.status == AlertStatus::Open
            && now - self.created_at > Duration::hours(24)
    }

    /// Queue-ordering score; lower sorts first.
    ///
    /// `−severity_weight − status_weight + days_until_deficit`: the most
    /// severe, most open, most imminent alerts come first.
    pub fn priority_score(&self) -> i64 {
        -self.severity.weight() - self.status.weight() + self.days_until_deficit
    }
}

/// Sort a queue of alerts most-urgent-first.
pub fn sort_by_priority(alerts: &mut [LiquidityAlert]) {
    alerts.sort_by_key(|a| a.priority_score());
}
