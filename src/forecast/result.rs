use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One day of the projected balance timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBalance {
    pub date: NaiveDate,
    /// Equal to the previous day's closing balance; the first day's opening
    /// is the forecast starting balance.
    pub opening_balance: Decimal,
    pub inflows: Decimal,
    pub outflows: Decimal,
    pub closing_balance: Decimal,
    /// Instance ids of the flows contributing to this day, for drill-down.
    pub flow_ids: Vec<String>,
}

/// Aggregate statistics accumulated during the daily walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub minimum_balance: Decimal,
    pub minimum_balance_date: NaiveDate,
    pub maximum_balance: Decimal,
    pub total_inflows: Decimal,
    pub total_outflows: Decimal,
    /// Dates whose closing balance fell below the minimum-cash threshold.
    pub deficit_days: Vec<NaiveDate>,
}

impl ForecastSummary {
    pub fn deficit_day_count(&self) -> usize {
        self.deficit_days.len()
    }
}

/// The projected daily balance timeline plus summary statistics.
///
/// This is the contract between the forecast, stress, and alert engines.
/// It is a pure value: re-running the forecast with identical inputs
/// reproduces it byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    start_date: NaiveDate,
    end_date: NaiveDate,
    starting_balance: Decimal,
    /// The configured minimum-cash threshold deficit days are measured
    /// against.
    minimum_cash: Decimal,
    daily: Vec<DailyBalance>,
    summary: ForecastSummary,
}

impl ForecastResult {
    pub(crate) fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        starting_balance: Decimal,
        minimum_cash: Decimal,
        daily: Vec<DailyBalance>,
        summary: ForecastSummary,
    ) -> Self {
        Self {
            start_date,
            end_date,
            starting_balance,
            minimum_cash,
            daily,
            summary,
        }
    }

    // --- Accessors ---

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn starting_balance(&self) -> Decimal {
        self.starting_balance
    }

    pub fn minimum_cash(&self) -> Decimal {
        self.minimum_cash
    }

    pub fn daily_balances(&self) -> &[DailyBalance] {
        &self.daily
    }

    pub fn summary(&self) -> &ForecastSummary {
        &self.summary
    }

    /// The first date whose closing balance fell below the threshold, if
    /// any. "No deficit" is a valid, good outcome.
    pub fn first_deficit_date(&self) -> Option<NaiveDate> {
        self.summary.deficit_days.first().copied()
    }

    /// Days from the horizon start until the first deficit date.
    pub fn days_until_first_deficit(&self) -> Option<i64> {
        self.first_deficit_date()
            .map(|d| (d - self.start_date).num_days())
    }

    /// How far the minimum balance fell below the threshold, floored at
    /// zero when the forecast never breaches it.
    pub fn shortfall(&self) -> Decimal {
        (self.minimum_cash - self.summary.minimum_balance).max(Decimal::ZERO)
    }
}

impl std::fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Cash Forecast ===")?;
        writeln!(f, "Horizon:          {} → {}", self.start_date, self.end_date)?;
        writeln!(f, "Starting Balance: {}", self.starting_balance)?;
        writeln!(
            f,
            "Minimum Balance:  {} on {}",
            self.summary.minimum_balance, self.summary.minimum_balance_date
        )?;
        writeln!(f, "Maximum Balance:  {}", self.summary.maximum_balance)?;
        writeln!(f, "Total Inflows:    {}", self.summary.total_inflows)?;
        writeln!(f, "Total Outflows:   {}", self.summary.total_outflows)?;
        writeln!(f, "Deficit Days:     {}", self.summary.deficit_day_count())?;
        if let Some(first) = self.first_deficit_date() {
            writeln!(f, "First Deficit:    {}", first)?;
        }
        Ok(())
    }
}

/// Signed differences between two forecast results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastComparison {
    /// Other minus base.
    pub min_balance_delta: Decimal,
    pub total_inflow_delta: Decimal,
    pub total_outflow_delta: Decimal,
    pub deficit_day_delta: i64,
    /// `|Δmin / base_min| × 100`; reported as 0 when the base minimum is
    /// exactly zero rather than dividing by zero.
    pub variance_percent: f64,
}

/// Diff two forecast results, `other` against `base`.
pub fn compare_forecast_results(base: &ForecastResult, other: &ForecastResult) -> ForecastComparison {
    let base_min = base.summary().minimum_balance;
    let min_delta = other.summary().minimum_balance - base_min;

    let variance_percent = if base_min == Decimal::ZERO {
        0.0
    } else {
        let pct = (min_delta / base_min).abs() * Decimal::from(100);
        pct.to_string().parse::<f64>().unwrap_or(0.0)
    };

    ForecastComparison {
        min_balance_delta: min_delta,
        total_inflow_delta: other.summary().total_inflows - base.summary().total_inflows,
        total_outflow_delta: other.summary().total_outflows - base.summary().total_outflows,
        deficit_day_delta: other.summary().deficit_day_count() as i64
            - base.summary().deficit_day_count() as i64,
        variance_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn result_with_min(min: Decimal, deficit_days: Vec<NaiveDate>) -> ForecastResult {
        let start = date(2026, 1, 1);
        ForecastResult::new(
            start,
            date(2026, 1, 31),
            dec!(1_000_000),
            Decimal::ZERO,
            Vec::new(),
            ForecastSummary {
                minimum_balance: min,
                minimum_balance_date: start,
                maximum_balance: dec!(1_000_000),
                total_inflows: Decimal::ZERO,
                total_outflows: Decimal::ZERO,
                deficit_days,
            },
        )
    }

    #[test]
    fn test_shortfall_floored_at_zero() {
        let healthy = result_with_min(dec!(250_000), Vec::new());
        assert_eq!(healthy.shortfall(), Decimal::ZERO);

        let breached = result_with_min(dec!(-200_000), vec![date(2026, 1, 10)]);
        assert_eq!(breached.shortfall(), dec!(200_000));
    }

    #[test]
    fn test_days_until_first_deficit() {
        let breached = result_with_min(dec!(-1), vec![date(2026, 1, 11), date(2026, 1, 12)]);
        assert_eq!(breached.first_deficit_date(), Some(date(2026, 1, 11)));
        assert_eq!(breached.days_until_first_deficit(), Some(10));

        let healthy = result_with_min(dec!(1), Vec::new());
        assert_eq!(healthy.days_until_first_deficit(), None);
    }

    #[test]
    fn test_compare_signed_deltas() {
        let base = result_with_min(dec!(100_000), Vec::new());
        let other = result_with_min(dec!(75_000), vec![date(2026, 1, 20)]);

        let cmp = compare_forecast_results(&base, &other);
        assert_eq!(cmp.min_balance_delta, dec!(-25_000));
        assert_eq!(cmp.deficit_day_delta, 1);
        assert!((cmp.variance_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_zero_base_min_guard() {
        let base = result_with_min(Decimal::ZERO, Vec::new());
        let other = result_with_min(dec!(-50_000), Vec::new());

        let cmp = compare_forecast_results(&base, &other);
        assert_eq!(cmp.variance_percent, 0.0);
        assert_eq!(cmp.min_balance_delta, dec!(-50_000));
    }
}
