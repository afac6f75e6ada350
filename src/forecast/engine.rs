use crate::core::flow::{FlowCategory, FlowDirection, FlowSet};
use crate::core::position::{total_balance, CashPosition};
use crate::forecast::result::{DailyBalance, ForecastResult, ForecastSummary};
use crate::scenario::adjustments::{RuleAction, ScenarioAdjustments};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters for one forecast run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastParams {
    /// First day of the horizon.
    pub start_date: NaiveDate,
    /// Days after the start date; the horizon covers `horizon_days + 1`
    /// calendar days inclusive. A horizon of 0 produces exactly one day.
    pub horizon_days: u32,
    /// Closing balances below this threshold count as deficit days.
    pub minimum_cash: Decimal,
}

impl ForecastParams {
    pub fn new(start_date: NaiveDate, horizon_days: u32) -> Self {
        Self {
            start_date,
            horizon_days,
            minimum_cash: Decimal::ZERO,
        }
    }

    pub fn with_minimum_cash(mut self, minimum_cash: Decimal) -> Self {
        self.minimum_cash = minimum_cash;
        self
    }

    /// Last day of the horizon, inclusive.
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Days::new(self.horizon_days as u64)
    }
}

/// One dated occurrence of a flow template.
///
/// Instances are derived on read and never persisted. A recurring template
/// yields instances with ids `"{template_id}_{occurrence_index}"`; a
/// non-recurring flow yields at most one instance carrying its own id.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowInstance {
    pub id: String,
    pub direction: FlowDirection,
    pub category: FlowCategory,
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// One row of the scenario adjustment table: which flows it targets and
/// what it does to them.
struct AdjustmentEntry {
    direction: FlowDirection,
    /// `None` targets every category in the direction.
    category: Option<FlowCategory>,
    amount_factor: Decimal,
    day_shift: i64,
}

impl AdjustmentEntry {
    fn targets(&self, instance: &FlowInstance) -> bool {
        self.direction == instance.direction
            && self.category.map_or(true, |c| c == instance.category)
    }
}

/// Build the adjustment table for a scenario.
///
/// The table keeps the daily aggregation loop free of category special
/// cases: each entry maps (direction, category) to an amount factor and a
/// signed day shift.
fn adjustment_table(adj: &ScenarioAdjustments) -> Vec<AdjustmentEntry> {
    let hundred = Decimal::from(100);
    let ten_thousand = Decimal::from(10_000);

    vec![
        AdjustmentEntry {
            direction: FlowDirection::Inflow,
            category: None,
            amount_factor: Decimal::ONE - adj.inflow_haircut() / hundred,
            day_shift: 0,
        },
        AdjustmentEntry {
            direction: FlowDirection::Outflow,
            category: None,
            amount_factor: Decimal::ONE + adj.outflow_increase() / hundred,
            day_shift: 0,
        },
        AdjustmentEntry {
            direction: FlowDirection::Inflow,
            category: Some(FlowCategory::Distribution),
            amount_factor: Decimal::ONE,
            day_shift: adj.distribution_delay(),
        },
        AdjustmentEntry {
            direction: FlowDirection::Outflow,
            category: Some(FlowCategory::CapitalCall),
            amount_factor: Decimal::ONE,
            day_shift: adj.capital_call_shift(),
        },
        AdjustmentEntry {
            direction: FlowDirection::Outflow,
            category: Some(FlowCategory::Debt),
            amount_factor: Decimal::ONE + adj.rate_shock() / ten_thousand,
            day_shift: 0,
        },
    ]
}

fn shift_date(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date + Days::new(days as u64)
    } else {
        date - Days::new((-days) as u64)
    }
}

/// The projection core.
///
/// Pure and deterministic: identical positions, flows, scenario, and
/// parameters always reproduce the same result, which is what makes
/// comparison and alert deduplication meaningful.
pub struct ForecastEngine;

impl ForecastEngine {
    /// Expand flow templates into dated instances over `[start, end]`
    /// inclusive.
    ///
    /// Expansion stops at the earliest of the horizon end, the recurrence's
    /// own end date, or its occurrence cap. Instances before the horizon
    /// start are dropped, but the occurrence index still advances so ids
    /// stay stable across runs with different horizon starts.
    pub fn expand_flows(flows: &FlowSet, start: NaiveDate, end: NaiveDate) -> Vec<FlowInstance> {
        let mut instances = Vec::new();

        for flow in flows.flows() {
            match flow.recurrence() {
                None => {
                    let date = flow.flow_date();
                    if date >= start && date <= end {
                        instances.push(FlowInstance {
                            id: flow.id().to_string(),
                            direction: flow.direction(),
                            category: flow.category(),
                            date,
                            amount: flow.amount(),
                        });
                    }
                }
                Some(recurrence) => {
                    let mut date = flow.flow_date();
                    let mut index: u32 = 0;
                    loop {
                        if date > end {
                            break;
                        }
                        if recurrence.end_date.is_some_and(|e| date > e) {
                            break;
                        }
                        if recurrence.occurrences.is_some_and(|cap| index >= cap) {
                            break;
                        }
                        if date >= start {
                            instances.push(FlowInstance {
                                id: format!("{}_{}", flow.id(), index),
                                direction: flow.direction(),
                                category: flow.category(),
                                date,
                                amount: flow.amount(),
                            });
                        }
                        index += 1;
                        match recurrence.pattern.next_date(date) {
                            Some(next) => date = next,
                            None => break,
                        }
                    }
                }
            }
        }

        instances
    }

    /// Apply scenario adjustments to expanded instances, producing new
    /// derived instances. The input is never mutated.
    ///
    /// Per instance: the amount adjustment is computed first (built-in
    /// factors, then custom-rule amount actions), then the accumulated
    /// date shift is applied, in one pass.
    fn apply_adjustments(
        instances: &[FlowInstance],
        adjustments: &ScenarioAdjustments,
    ) -> Vec<FlowInstance> {
        let table = adjustment_table(adjustments);

        instances
            .iter()
            .map(|instance| {
                let mut amount = instance.amount;
                let mut shift: i64 = 0;

                for entry in table.iter().filter(|e| e.targets(instance)) {
                    amount *= entry.amount_factor;
                    shift += entry.day_shift;
                }

                for rule in &adjustments.custom_rules {
                    if !rule.applies_to(instance.direction, instance.category, amount) {
                        continue;
                    }
                    match &rule.action {
                        RuleAction::Multiply(factor) => amount *= factor,
                        RuleAction::Add(delta) => amount += delta,
                        RuleAction::DelayDays(days) => shift += days,
                    }
                }

                FlowInstance {
                    id: instance.id.clone(),
                    direction: instance.direction,
                    category: instance.category,
                    date: shift_date(instance.date, shift),
                    amount: amount.max(Decimal::ZERO),
                }
            })
            .collect()
    }

    /// Build a daily balance forecast.
    ///
    /// # Algorithm
    ///
    /// 1. Starting balance = sum of all position balances.
    /// 2. Expand recurring flows across the horizon.
    /// 3. Apply scenario adjustments per instance.
    /// 4. Walk day by day: each opening equals the previous closing,
    ///    closing = opening + inflows − outflows. Minimum/maximum balance,
    ///    cumulative totals, and deficit days are accumulated in the same
    ///    single linear scan.
    ///
    /// Adjusted instances shifted outside the horizon no longer contribute.
    /// An empty flow set produces a flat timeline at the starting balance.
    pub fn build_forecast(
        positions: &[CashPosition],
        flows: &FlowSet,
        scenario: Option<&ScenarioAdjustments>,
        params: &ForecastParams,
    ) -> ForecastResult {
        let start = params.start_date;
        let end = params.end_date();
        let starting_balance = total_balance(positions);

        let mut instances = Self::expand_flows(flows, start, end);
        if let Some(adjustments) = scenario {
            instances = Self::apply_adjustments(&instances, adjustments);
            log::debug!(
                "applied scenario ({}) to {} instances",
                adjustments.describe(),
                instances.len()
            );
        }

        // Group by calendar date. Shifted instances may have left the
        // horizon; those are dropped here.
        let mut by_date: BTreeMap<NaiveDate, (Decimal, Decimal, Vec<String>)> = BTreeMap::new();
        for instance in instances {
            if instance.date < start || instance.date > end {
                continue;
            }
            let bucket = by_date
                .entry(instance.date)
                .or_insert((Decimal::ZERO, Decimal::ZERO, Vec::new()));
            match instance.direction {
                FlowDirection::Inflow => bucket.0 += instance.amount,
                FlowDirection::Outflow => bucket.1 += instance.amount,
            }
            bucket.2.push(instance.id);
        }

        let mut daily = Vec::with_capacity(params.horizon_days as usize + 1);
        let mut balance = starting_balance;
        let mut minimum_balance = Decimal::MAX;
        let mut minimum_balance_date = start;
        let mut maximum_balance = Decimal::MIN;
        let mut total_inflows = Decimal::ZERO;
        let mut total_outflows = Decimal::ZERO;
        let mut deficit_days = Vec::new();

        let mut date = start;
        loop {
            let (inflows, outflows, flow_ids) = by_date
                .remove(&date)
                .unwrap_or((Decimal::ZERO, Decimal::ZERO, Vec::new()));

            let opening = balance;
            let closing = opening + inflows - outflows;
            balance = closing;

            total_inflows += inflows;
            total_outflows += outflows;
            if closing < minimum_balance {
                minimum_balance = closing;
                minimum_balance_date = date;
            }
            if closing > maximum_balance {
                maximum_balance = closing;
            }
            if closing < params.minimum_cash {
                deficit_days.push(date);
            }

            daily.push(DailyBalance {
                date,
                opening_balance: opening,
                inflows,
                outflows,
                closing_balance: closing,
                flow_ids,
            });

            if date == end {
                break;
            }
            date = date + Days::new(1);
        }

        let summary = ForecastSummary {
            minimum_balance,
            minimum_balance_date,
            maximum_balance,
            total_inflows,
            total_outflows,
            deficit_days,
        };

        ForecastResult::new(
            start,
            end,
            starting_balance,
            params.minimum_cash,
            daily,
            summary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::ClientId;
    use crate::core::currency::CurrencyCode;
    use crate::core::flow::{CashFlow, Recurrence, RecurrencePattern};
    use crate::core::position::PositionScope;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client() -> ClientId {
        ClientId::new("household-smith")
    }

    fn position(balance: Decimal) -> CashPosition {
        CashPosition::new(
            client(),
            PositionScope::Account,
            balance,
            CurrencyCode::usd(),
        )
    }

    fn flow(
        id: &str,
        direction: FlowDirection,
        category: FlowCategory,
        on: NaiveDate,
        amount: Decimal,
    ) -> CashFlow {
        CashFlow::new(
            id,
            client(),
            direction,
            category,
            on,
            amount,
            CurrencyCode::usd(),
        )
    }

    #[test]
    fn test_zero_horizon_single_day() {
        let start = date(2026, 3, 1);
        let params = ForecastParams::new(start, 0);
        let result =
            ForecastEngine::build_forecast(&[position(dec!(500_000))], &FlowSet::new(), None, &params);

        assert_eq!(result.daily_balances().len(), 1);
        let day = &result.daily_balances()[0];
        assert_eq!(day.date, start);
        assert_eq!(day.opening_balance, dec!(500_000));
        assert_eq!(day.closing_balance, dec!(500_000));
        assert_eq!(result.summary().minimum_balance, dec!(500_000));
    }

    #[test]
    fn test_empty_flows_flat_timeline() {
        let params = ForecastParams::new(date(2026, 3, 1), 10);
        let result =
            ForecastEngine::build_forecast(&[position(dec!(100))], &FlowSet::new(), None, &params);

        assert_eq!(result.daily_balances().len(), 11);
        assert!(result
            .daily_balances()
            .iter()
            .all(|d| d.closing_balance == dec!(100)));
    }

    #[test]
    fn test_balance_continuity() {
        let start = date(2026, 3, 1);
        let mut flows = FlowSet::new();
        flows.add(flow(
            "inv-1",
            FlowDirection::Inflow,
            FlowCategory::Invoice,
            date(2026, 3, 3),
            dec!(10_000),
        ));
        flows.add(flow(
            "tax-1",
            FlowDirection::Outflow,
            FlowCategory::Tax,
            date(2026, 3, 7),
            dec!(4_000),
        ));

        let params = ForecastParams::new(start, 10);
        let result = ForecastEngine::build_forecast(&[position(dec!(1_000))], &flows, None, &params);

        let daily = result.daily_balances();
        for day in daily {
            assert_eq!(
                day.closing_balance,
                day.opening_balance + day.inflows - day.outflows
            );
        }
        for pair in daily.windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
        }
        assert_eq!(daily.last().unwrap().closing_balance, dec!(7_000));
    }

    #[test]
    fn test_weekly_expansion_count() {
        let start = date(2026, 3, 1);
        let template = flow(
            "rent-1",
            FlowDirection::Outflow,
            FlowCategory::Rent,
            start,
            dec!(1_000),
        )
        .with_recurrence(Recurrence::new(RecurrencePattern::Weekly));

        let instances =
            ForecastEngine::expand_flows(&[template].into_iter().collect(), start, start + Days::new(21));
        assert_eq!(instances.len(), 4);
        let ids: Vec<&str> = instances.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["rent-1_0", "rent-1_1", "rent-1_2", "rent-1_3"]);
        assert_eq!(instances[3].date, start + Days::new(21));
    }

    #[test]
    fn test_expansion_occurrence_cap() {
        let start = date(2026, 3, 1);
        let template = flow(
            "fee-1",
            FlowDirection::Outflow,
            FlowCategory::Fee,
            start,
            dec!(500),
        )
        .with_recurrence(Recurrence::new(RecurrencePattern::Weekly).capped(2));

        let instances =
            ForecastEngine::expand_flows(&[template].into_iter().collect(), start, start + Days::new(60));
        assert_eq!(instances.len(), 2);
    }

    #[test]
    fn test_expansion_end_date_bound() {
        let start = date(2026, 3, 1);
        let template = flow(
            "fee-1",
            FlowDirection::Outflow,
            FlowCategory::Fee,
            start,
            dec!(500),
        )
        .with_recurrence(Recurrence::new(RecurrencePattern::Weekly).until(date(2026, 3, 10)));

        let instances =
            ForecastEngine::expand_flows(&[template].into_iter().collect(), start, start + Days::new(60));
        // Day 0 and day 7 fall on or before Mar 10; day 14 does not.
        assert_eq!(instances.len(), 2);
    }

    #[test]
    fn test_pre_horizon_instances_dropped_index_advances() {
        let template_start = date(2026, 3, 1);
        let template = flow(
            "rent-1",
            FlowDirection::Outflow,
            FlowCategory::Rent,
            template_start,
            dec!(1_000),
        )
        .with_recurrence(Recurrence::new(RecurrencePattern::Weekly));

        let horizon_start = date(2026, 3, 10);
        let instances = ForecastEngine::expand_flows(
            &[template].into_iter().collect(),
            horizon_start,
            date(2026, 3, 31),
        );
        // Occurrences 0 (Mar 1) and 1 (Mar 8) precede the horizon.
        let ids: Vec<&str> = instances.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["rent-1_2", "rent-1_3", "rent-1_4"]);
    }

    #[test]
    fn test_haircut_and_increase() {
        let start = date(2026, 3, 1);
        let mut flows = FlowSet::new();
        flows.add(flow(
            "in-1",
            FlowDirection::Inflow,
            FlowCategory::Dividend,
            date(2026, 3, 2),
            dec!(1_000),
        ));
        flows.add(flow(
            "out-1",
            FlowDirection::Outflow,
            FlowCategory::Payroll,
            date(2026, 3, 2),
            dec!(1_000),
        ));

        let adjustments = ScenarioAdjustments {
            inflow_haircut_pct: Some(dec!(20)),
            outflow_increase_pct: Some(dec!(10)),
            ..Default::default()
        };
        let params = ForecastParams::new(start, 5);
        let result =
            ForecastEngine::build_forecast(&[position(dec!(0))], &flows, Some(&adjustments), &params);

        assert_eq!(result.summary().total_inflows, dec!(800));
        assert_eq!(result.summary().total_outflows, dec!(1100));
    }

    #[test]
    fn test_distribution_delay_moves_date() {
        let start = date(2026, 3, 1);
        let mut flows = FlowSet::new();
        flows.add(flow(
            "dist-1",
            FlowDirection::Inflow,
            FlowCategory::Distribution,
            date(2026, 3, 2),
            dec!(50_000),
        ));

        let adjustments = ScenarioAdjustments {
            distribution_delay_days: Some(5),
            ..Default::default()
        };
        let params = ForecastParams::new(start, 10);
        let result =
            ForecastEngine::build_forecast(&[position(dec!(0))], &flows, Some(&adjustments), &params);

        let day = result
            .daily_balances()
            .iter()
            .find(|d| d.inflows > Decimal::ZERO)
            .unwrap();
        assert_eq!(day.date, date(2026, 3, 7));
    }

    #[test]
    fn test_capital_call_negative_shift_is_earlier() {
        let start = date(2026, 3, 1);
        let mut flows = FlowSet::new();
        flows.add(flow(
            "cc-1",
            FlowDirection::Outflow,
            FlowCategory::CapitalCall,
            date(2026, 3, 10),
            dec!(250_000),
        ));

        let adjustments = ScenarioAdjustments {
            capital_call_shift_days: Some(-7),
            ..Default::default()
        };
        let params = ForecastParams::new(start, 20);
        let result =
            ForecastEngine::build_forecast(&[position(dec!(0))], &flows, Some(&adjustments), &params);

        let day = result
            .daily_balances()
            .iter()
            .find(|d| d.outflows > Decimal::ZERO)
            .unwrap();
        assert_eq!(day.date, date(2026, 3, 3));
    }

    #[test]
    fn test_debt_rate_shock() {
        let start = date(2026, 3, 1);
        let mut flows = FlowSet::new();
        flows.add(flow(
            "debt-1",
            FlowDirection::Outflow,
            FlowCategory::Debt,
            date(2026, 3, 2),
            dec!(10_000),
        ));

        let adjustments = ScenarioAdjustments {
            rate_shock_bps: Some(dec!(100)),
            ..Default::default()
        };
        let params = ForecastParams::new(start, 5);
        let result =
            ForecastEngine::build_forecast(&[position(dec!(0))], &flows, Some(&adjustments), &params);

        // 100bp on 10,000 = +100
        assert_eq!(result.summary().total_outflows, dec!(10_100));
    }

    #[test]
    fn test_shifted_out_of_horizon_drops() {
        let start = date(2026, 3, 1);
        let mut flows = FlowSet::new();
        flows.add(flow(
            "dist-1",
            FlowDirection::Inflow,
            FlowCategory::Distribution,
            date(2026, 3, 5),
            dec!(50_000),
        ));

        let adjustments = ScenarioAdjustments {
            distribution_delay_days: Some(30),
            ..Default::default()
        };
        let params = ForecastParams::new(start, 10);
        let result =
            ForecastEngine::build_forecast(&[position(dec!(0))], &flows, Some(&adjustments), &params);

        assert_eq!(result.summary().total_inflows, Decimal::ZERO);
    }

    #[test]
    fn test_deficit_days_below_threshold() {
        let start = date(2026, 3, 1);
        let mut flows = FlowSet::new();
        flows.add(flow(
            "cc-1",
            FlowDirection::Outflow,
            FlowCategory::CapitalCall,
            start + Days::new(10),
            dec!(1_200_000),
        ));

        let params = ForecastParams::new(start, 30);
        let result =
            ForecastEngine::build_forecast(&[position(dec!(1_000_000))], &flows, None, &params);

        assert_eq!(result.summary().minimum_balance, dec!(-200_000));
        assert_eq!(
            result.summary().minimum_balance_date,
            start + Days::new(10)
        );
        // Balance stays negative from day 10 through the horizon end.
        assert_eq!(result.summary().deficit_day_count(), 21);
        assert_eq!(result.first_deficit_date(), Some(start + Days::new(10)));
        assert_eq!(result.shortfall(), dec!(200_000));
    }
}
