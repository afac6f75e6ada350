//! Random portfolio generation for tests, benchmarks, and the CLI.
//!
//! Produces positions and flow sets with a plausible category mix so the
//! forecast, stress, and alert engines can be exercised at scale.

use crate::core::client::ClientId;
use crate::core::currency::CurrencyCode;
use crate::core::flow::{
    CashFlow, FlowCategory, FlowDirection, FlowSet, Recurrence, RecurrencePattern,
};
use crate::core::position::{CashPosition, PositionScope};
use chrono::{Days, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    /// Client scope that owns the generated records.
    pub client: ClientId,
    /// Number of cash positions.
    pub position_count: usize,
    /// Number of flow templates.
    pub flow_count: usize,
    /// Minimum flow amount.
    pub min_amount: Decimal,
    /// Maximum flow amount.
    pub max_amount: Decimal,
    /// First possible flow date.
    pub start_date: NaiveDate,
    /// Flow dates are spread over this many days after the start.
    pub span_days: u64,
    /// Fraction of flows that get a monthly recurrence, in percent.
    pub recurring_percent: u32,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            client: ClientId::new("household-000"),
            position_count: 3,
            flow_count: 25,
            min_amount: Decimal::from(1_000),
            max_amount: Decimal::from(500_000),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date"),
            span_days: 90,
            recurring_percent: 20,
        }
    }
}

const CATEGORIES: [FlowCategory; 11] = [
    FlowCategory::CapitalCall,
    FlowCategory::Distribution,
    FlowCategory::Invoice,
    FlowCategory::Tax,
    FlowCategory::Debt,
    FlowCategory::Payroll,
    FlowCategory::Rent,
    FlowCategory::Dividend,
    FlowCategory::Interest,
    FlowCategory::Fee,
    FlowCategory::Other,
];

fn direction_for(rng: &mut impl Rng, category: FlowCategory) -> FlowDirection {
    match category {
        FlowCategory::Distribution | FlowCategory::Dividend | FlowCategory::Interest => {
            FlowDirection::Inflow
        }
        FlowCategory::CapitalCall
        | FlowCategory::Tax
        | FlowCategory::Debt
        | FlowCategory::Payroll
        | FlowCategory::Rent
        | FlowCategory::Fee => FlowDirection::Outflow,
        FlowCategory::Invoice | FlowCategory::Other => {
            if rng.gen_bool(0.5) {
                FlowDirection::Inflow
            } else {
                FlowDirection::Outflow
            }
        }
    }
}

fn random_amount(rng: &mut impl Rng, config: &PortfolioConfig) -> Decimal {
    let min: f64 = config.min_amount.to_string().parse().unwrap_or(1_000.0);
    let max: f64 = config.max_amount.to_string().parse().unwrap_or(500_000.0);
    let amount = rng.gen_range(min..max);
    Decimal::from_f64_retain(amount)
        .unwrap_or(Decimal::from(1_000))
        .round_dp(2)
        .max(Decimal::ONE)
}

/// Generate random positions and flow templates for one client.
pub fn generate_random_portfolio(config: &PortfolioConfig) -> (Vec<CashPosition>, FlowSet) {
    let mut rng = rand::thread_rng();

    let positions: Vec<CashPosition> = (0..config.position_count)
        .map(|i| {
            CashPosition::new(
                config.client.clone(),
                PositionScope::Account,
                random_amount(&mut rng, config) * Decimal::from(10),
                CurrencyCode::usd(),
            )
            .with_reference(format!("ACCT-{:03}", i))
        })
        .collect();

    let mut flows = FlowSet::new();
    for i in 0..config.flow_count {
        let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let direction = direction_for(&mut rng, category);
        let offset = rng.gen_range(0..=config.span_days);
        let date = config.start_date + Days::new(offset);

        let mut flow = CashFlow::new(
            format!("gen-{:04}", i),
            config.client.clone(),
            direction,
            category,
            date,
            random_amount(&mut rng, config),
            CurrencyCode::usd(),
        );
        if rng.gen_range(0..100) < config.recurring_percent {
            flow = flow.with_recurrence(Recurrence::new(RecurrencePattern::Monthly));
        }
        flows.add(flow);
    }

    (positions, flows)
}
