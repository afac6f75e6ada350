use crate::core::client::ClientId;
use crate::core::currency::CurrencyCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an invoice in the billing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Approved,
    Paid,
    Cancelled,
}

/// Whether an invoice is money owed to us or by us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    Receivable,
    Payable,
}

/// Lifecycle status of a private-capital call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalCallStatus {
    Pending,
    Approved,
    Funded,
    Cancelled,
}

/// Lifecycle status of a private-capital distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionStatus {
    Announced,
    Confirmed,
    Received,
    Cancelled,
}

/// Lifecycle status of a tax deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxDeadlineStatus {
    Upcoming,
    Confirmed,
    Paid,
    Cancelled,
}

/// An invoice record from the billing subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: String,
    pub client: ClientId,
    pub kind: InvoiceKind,
    pub status: InvoiceStatus,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub due_date: NaiveDate,
}

/// A capital-call notice from the private-markets subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalCallRecord {
    pub id: String,
    pub client: ClientId,
    pub status: CapitalCallStatus,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund: Option<String>,
}

/// An announced distribution from the private-markets subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub id: String,
    pub client: ClientId,
    pub status: DistributionStatus,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub expected_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund: Option<String>,
}

/// A tax payment deadline from the tax-calendar subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxDeadlineRecord {
    pub id: String,
    pub client: ClientId,
    pub status: TaxDeadlineStatus,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

/// A raw cash-impacting record from one of the supported source subsystems.
///
/// Each variant has its own shape and status vocabulary; the importer
/// consumes the union through one narrow projection per kind rather than
/// reaching into untyped fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source_kind", rename_all = "snake_case")]
pub enum SourceRecord {
    Invoice(InvoiceRecord),
    CapitalCall(CapitalCallRecord),
    Distribution(DistributionRecord),
    TaxDeadline(TaxDeadlineRecord),
}

impl SourceRecord {
    /// The owning client scope of the underlying record.
    pub fn client(&self) -> &ClientId {
        match self {
            SourceRecord::Invoice(r) => &r.client,
            SourceRecord::CapitalCall(r) => &r.client,
            SourceRecord::Distribution(r) => &r.client,
            SourceRecord::TaxDeadline(r) => &r.client,
        }
    }

    /// The source-system identifier of the underlying record.
    pub fn source_id(&self) -> &str {
        match self {
            SourceRecord::Invoice(r) => &r.id,
            SourceRecord::CapitalCall(r) => &r.id,
            SourceRecord::Distribution(r) => &r.id,
            SourceRecord::TaxDeadline(r) => &r.id,
        }
    }

    /// Source-kind label used in provenance references.
    pub fn kind_label(&self) -> &'static str {
        match self {
            SourceRecord::Invoice(_) => "invoice",
            SourceRecord::CapitalCall(_) => "capital_call",
            SourceRecord::Distribution(_) => "distribution",
            SourceRecord::TaxDeadline(_) => "tax_deadline",
        }
    }

    /// Whether the record is terminally settled or cancelled.
    ///
    /// Settled obligations are no longer expected cash movements and never
    /// become forecast inputs.
    pub fn is_settled(&self) -> bool {
        match self {
            SourceRecord::Invoice(r) => {
                matches!(r.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
            }
            SourceRecord::CapitalCall(r) => matches!(
                r.status,
                CapitalCallStatus::Funded | CapitalCallStatus::Cancelled
            ),
            SourceRecord::Distribution(r) => matches!(
                r.status,
                DistributionStatus::Received | DistributionStatus::Cancelled
            ),
            SourceRecord::TaxDeadline(r) => matches!(
                r.status,
                TaxDeadlineStatus::Paid | TaxDeadlineStatus::Cancelled
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(status: InvoiceStatus) -> SourceRecord {
        SourceRecord::Invoice(InvoiceRecord {
            id: "17".into(),
            client: ClientId::new("household-smith"),
            kind: InvoiceKind::Payable,
            status,
            amount: dec!(45_000),
            currency: CurrencyCode::usd(),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        })
    }

    #[test]
    fn test_settled_detection() {
        assert!(invoice(InvoiceStatus::Paid).is_settled());
        assert!(invoice(InvoiceStatus::Cancelled).is_settled());
        assert!(!invoice(InvoiceStatus::Sent).is_settled());
        assert!(!invoice(InvoiceStatus::Approved).is_settled());
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(invoice(InvoiceStatus::Sent).kind_label(), "invoice");
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_value(invoice(InvoiceStatus::Sent)).unwrap();
        assert_eq!(json["source_kind"], "invoice");
        assert_eq!(json["status"], "sent");
    }
}
