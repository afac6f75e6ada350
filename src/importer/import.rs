use crate::core::client::ClientId;
use crate::core::flow::{CashFlow, FlowCategory, FlowDirection, FlowSet, SourceRef};
use crate::importer::source::{
    CapitalCallRecord, CapitalCallStatus, DistributionRecord, DistributionStatus, InvoiceKind,
    InvoiceRecord, InvoiceStatus, SourceRecord, TaxDeadlineRecord, TaxDeadlineStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of an import batch.
///
/// Per-record failures never abort the batch: a record that cannot be mapped
/// is reported in `errors` and counted neither as imported nor skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// Flows produced by this batch, keyed by deterministic derived ids.
    pub flows: FlowSet,
    /// Records successfully mapped into flows.
    pub imported: usize,
    /// Records skipped as out-of-scope or already settled.
    pub skipped: usize,
    /// Per-record mapping failures.
    pub errors: Vec<String>,
}

impl ImportReport {
    /// Fold another report into this one, upserting flows by id.
    pub fn merge(&mut self, other: ImportReport) {
        for flow in other.flows.flows() {
            self.flows.upsert(flow.clone());
        }
        self.imported += other.imported;
        self.skipped += other.skipped;
        self.errors.extend(other.errors);
    }
}

/// Maps heterogeneous source records into canonical cash flows.
///
/// Each supported source kind has a fixed direction and category mapping,
/// and produces flows with deterministic ids (`inv-`, `cc-`, `dist-`,
/// `tax-` prefixes), so repeated imports of the same record are idempotent.
pub struct FlowImporter;

impl FlowImporter {
    /// Import a batch of source records for one client.
    ///
    /// Records owned by a different client, or whose status is terminally
    /// settled or cancelled, are skipped. Records that fail to map are
    /// reported in the result's error list; the batch always completes.
    pub fn import(client: &ClientId, records: &[SourceRecord]) -> ImportReport {
        let mut report = ImportReport::default();

        for record in records {
            if record.client() != client {
                log::debug!(
                    "skipping {} {}: owned by {}, importing for {}",
                    record.kind_label(),
                    record.source_id(),
                    record.client(),
                    client
                );
                report.skipped += 1;
                continue;
            }
            if record.is_settled() {
                log::debug!(
                    "skipping {} {}: already settled or cancelled",
                    record.kind_label(),
                    record.source_id()
                );
                report.skipped += 1;
                continue;
            }

            match Self::project(record) {
                Ok(flow) => {
                    report.flows.upsert(flow);
                    report.imported += 1;
                }
                Err(e) => report.errors.push(e),
            }
        }

        report
    }

    /// Project one open source record into its canonical flow.
    fn project(record: &SourceRecord) -> Result<CashFlow, String> {
        match record {
            SourceRecord::Invoice(r) => Self::project_invoice(r),
            SourceRecord::CapitalCall(r) => Self::project_capital_call(r),
            SourceRecord::Distribution(r) => Self::project_distribution(r),
            SourceRecord::TaxDeadline(r) => Self::project_tax_deadline(r),
        }
    }

    fn check_amount(kind: &str, id: &str, amount: Decimal) -> Result<(), String> {
        if amount <= Decimal::ZERO {
            return Err(format!(
                "{} {}: amount must be positive, got {}",
                kind, id, amount
            ));
        }
        Ok(())
    }

    fn project_invoice(r: &InvoiceRecord) -> Result<CashFlow, String> {
        Self::check_amount("invoice", &r.id, r.amount)?;
        let direction = match r.kind {
            InvoiceKind::Receivable => FlowDirection::Inflow,
            InvoiceKind::Payable => FlowDirection::Outflow,
        };
        let mut flow = CashFlow::new(
            format!("inv-{}", r.id),
            r.client.clone(),
            direction,
            FlowCategory::Invoice,
            r.due_date,
            r.amount,
            r.currency.clone(),
        )
        .with_source(SourceRef::new("invoice", &r.id));
        if r.status == InvoiceStatus::Approved {
            flow = flow.confirmed();
        }
        Ok(flow)
    }

    fn project_capital_call(r: &CapitalCallRecord) -> Result<CashFlow, String> {
        Self::check_amount("capital call", &r.id, r.amount)?;
        let mut flow = CashFlow::new(
            format!("cc-{}", r.id),
            r.client.clone(),
            FlowDirection::Outflow,
            FlowCategory::CapitalCall,
            r.due_date,
            r.amount,
            r.currency.clone(),
        )
        .with_source(SourceRef::new("capital_call", &r.id));
        if r.status == CapitalCallStatus::Approved {
            flow = flow.confirmed();
        }
        Ok(flow)
    }

    fn project_distribution(r: &DistributionRecord) -> Result<CashFlow, String> {
        Self::check_amount("distribution", &r.id, r.amount)?;
        let mut flow = CashFlow::new(
            format!("dist-{}", r.id),
            r.client.clone(),
            FlowDirection::Inflow,
            FlowCategory::Distribution,
            r.expected_date,
            r.amount,
            r.currency.clone(),
        )
        .with_source(SourceRef::new("distribution", &r.id));
        if r.status == DistributionStatus::Confirmed {
            flow = flow.confirmed();
        }
        Ok(flow)
    }

    fn project_tax_deadline(r: &TaxDeadlineRecord) -> Result<CashFlow, String> {
        Self::check_amount("tax deadline", &r.id, r.amount)?;
        let mut flow = CashFlow::new(
            format!("tax-{}", r.id),
            r.client.clone(),
            FlowDirection::Outflow,
            FlowCategory::Tax,
            r.due_date,
            r.amount,
            r.currency.clone(),
        )
        .with_source(SourceRef::new("tax_deadline", &r.id));
        if r.status == TaxDeadlineStatus::Confirmed {
            flow = flow.confirmed();
        }
        Ok(flow)
    }
}
