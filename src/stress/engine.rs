use crate::core::flow::FlowSet;
use crate::core::position::CashPosition;
use crate::forecast::engine::{ForecastEngine, ForecastParams};
use crate::forecast::result::{compare_forecast_results, ForecastComparison, ForecastResult};
use crate::scenario::adjustments::ScenarioAdjustments;
use crate::stress::archetype::{StressArchetype, StressSeverity};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Definition of one stress test: an archetype, a severity tier, and an
/// optional magnitude override replacing the tier default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashStressTest {
    pub archetype: StressArchetype,
    pub severity: StressSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<Decimal>,
}

impl CashStressTest {
    pub fn new(archetype: StressArchetype, severity: StressSeverity) -> Self {
        Self {
            archetype,
            severity,
            magnitude: None,
        }
    }

    pub fn with_magnitude(mut self, magnitude: Decimal) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    /// The effective magnitude: the override if given, else the tier
    /// default.
    pub fn effective_magnitude(&self) -> Decimal {
        self.magnitude
            .unwrap_or_else(|| self.archetype.default_magnitude(self.severity))
    }
}

/// Result payload of a stress run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestResult {
    pub archetype: StressArchetype,
    pub severity: StressSeverity,
    /// Summary of the applied overlay, merged over any base scenario.
    pub scenario_summary: String,
    /// Minimum cash reached under stress.
    pub minimum_cash: Decimal,
    pub minimum_cash_date: NaiveDate,
    /// Deficit days of the stressed run.
    pub breach_dates: Vec<NaiveDate>,
    pub breach_count: usize,
    /// `max(0, threshold − stressed minimum)`.
    pub total_shortfall: Decimal,
    /// Generated one-line impact description.
    pub impact_summary: String,
    /// Differential against the supplied baseline forecast.
    pub comparison: ForecastComparison,
    /// 1 when any breach day exists, else 0. A flag that the alert engine
    /// should be invoked for this run, not a count of alerts produced.
    pub alerts_generated: u8,
}

impl std::fmt::Display for StressTestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Stress Test: {} ({}) ===", self.archetype, self.severity)?;
        writeln!(f, "Adjustments:    {}", self.scenario_summary)?;
        writeln!(
            f,
            "Minimum Cash:   {} on {}",
            self.minimum_cash, self.minimum_cash_date
        )?;
        writeln!(f, "Breach Days:    {}", self.breach_count)?;
        writeln!(f, "Shortfall:      {}", self.total_shortfall)?;
        writeln!(f, "Min Δ vs Base:  {}", self.comparison.min_balance_delta)?;
        writeln!(f, "Variance:       {:.1}%", self.comparison.variance_percent)?;
        writeln!(f, "{}", self.impact_summary)?;
        Ok(())
    }
}

/// Wraps the forecast engine to answer "what if X happens".
pub struct StressEngine;

impl StressEngine {
    /// Run a stress test against a baseline forecast.
    ///
    /// The archetype/severity pair becomes a transient scenario overlay
    /// merged on top of any active base scenario; stress parameters take
    /// precedence on overlapping fields. The stressed forecast uses the
    /// same positions, flows, and parameters as the baseline.
    pub fn run(
        test: &CashStressTest,
        positions: &[CashPosition],
        flows: &FlowSet,
        base_scenario: Option<&ScenarioAdjustments>,
        params: &ForecastParams,
        baseline: &ForecastResult,
    ) -> StressTestResult {
        let overlay = test.archetype.overlay(test.effective_magnitude());
        let stressed_scenario = match base_scenario {
            Some(base) => base.merge(&overlay),
            None => overlay,
        };

        let stressed =
            ForecastEngine::build_forecast(positions, flows, Some(&stressed_scenario), params);
        let comparison = compare_forecast_results(baseline, &stressed);

        let summary = stressed.summary();
        let breach_dates = summary.deficit_days.clone();
        let breach_count = breach_dates.len();
        let total_shortfall = stressed.shortfall();

        let impact_summary = if breach_count == 0 {
            format!(
                "A {} {} stress leaves minimum cash at {} on {}; no threshold breaches over the horizon.",
                test.severity, test.archetype, summary.minimum_balance, summary.minimum_balance_date
            )
        } else {
            format!(
                "A {} {} stress drives minimum cash to {} on {}, breaching the {} threshold on {} day(s) with a total shortfall of {}.",
                test.severity,
                test.archetype,
                summary.minimum_balance,
                summary.minimum_balance_date,
                stressed.minimum_cash(),
                breach_count,
                total_shortfall
            )
        };

        StressTestResult {
            archetype: test.archetype,
            severity: test.severity,
            scenario_summary: stressed_scenario.describe(),
            minimum_cash: summary.minimum_balance,
            minimum_cash_date: summary.minimum_balance_date,
            breach_dates,
            breach_count,
            total_shortfall,
            impact_summary,
            comparison,
            alerts_generated: if breach_count > 0 { 1 } else { 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::ClientId;
    use crate::core::currency::CurrencyCode;
    use crate::core::flow::{CashFlow, FlowCategory, FlowDirection};
    use crate::core::position::PositionScope;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixtures() -> (Vec<CashPosition>, FlowSet) {
        let client = ClientId::new("household-smith");
        let positions = vec![CashPosition::new(
            client.clone(),
            PositionScope::Household,
            dec!(500_000),
            CurrencyCode::usd(),
        )];

        let mut flows = FlowSet::new();
        flows.add(CashFlow::new(
            "dist-1",
            client.clone(),
            FlowDirection::Inflow,
            FlowCategory::Distribution,
            date(2026, 3, 5),
            dec!(400_000),
            CurrencyCode::usd(),
        ));
        flows.add(CashFlow::new(
            "cc-1",
            client,
            FlowDirection::Outflow,
            FlowCategory::CapitalCall,
            date(2026, 3, 10),
            dec!(800_000),
            CurrencyCode::usd(),
        ));
        (positions, flows)
    }

    #[test]
    fn test_delayed_distributions_creates_breach() {
        let (positions, flows) = fixtures();
        let params = ForecastParams::new(date(2026, 3, 1), 30);
        let baseline = ForecastEngine::build_forecast(&positions, &flows, None, &params);
        // Baseline: +400k on day 4, -800k on day 9 → min 100k, no breach.
        assert_eq!(baseline.summary().deficit_day_count(), 0);

        let test = CashStressTest::new(
            StressArchetype::DelayedDistributions,
            StressSeverity::Severe,
        );
        let result = StressEngine::run(&test, &positions, &flows, None, &params, &baseline);

        // The distribution left the horizon, so the call overdraws cash.
        assert_eq!(result.minimum_cash, dec!(-300_000));
        assert!(result.breach_count > 0);
        assert_eq!(result.alerts_generated, 1);
        assert_eq!(result.total_shortfall, dec!(300_000));
        assert!(result.comparison.min_balance_delta < Decimal::ZERO);
        assert!(result.impact_summary.contains("delayed distributions"));
    }

    #[test]
    fn test_no_breach_flag_zero() {
        let (positions, flows) = fixtures();
        let params = ForecastParams::new(date(2026, 3, 1), 30);
        let baseline = ForecastEngine::build_forecast(&positions, &flows, None, &params);

        let test = CashStressTest::new(StressArchetype::DebtRateShock, StressSeverity::Mild);
        let result = StressEngine::run(&test, &positions, &flows, None, &params, &baseline);

        // No debt flows, so the shock changes nothing.
        assert_eq!(result.breach_count, 0);
        assert_eq!(result.alerts_generated, 0);
        assert_eq!(result.total_shortfall, Decimal::ZERO);
        assert_eq!(result.comparison.min_balance_delta, Decimal::ZERO);
    }

    #[test]
    fn test_stress_overlay_wins_over_base_scenario() {
        let (positions, flows) = fixtures();
        let params = ForecastParams::new(date(2026, 3, 1), 30);
        let base = ScenarioAdjustments {
            inflow_haircut_pct: Some(dec!(5)),
            ..Default::default()
        };
        let baseline = ForecastEngine::build_forecast(&positions, &flows, Some(&base), &params);

        let test = CashStressTest::new(StressArchetype::MarketDrawdown, StressSeverity::Severe);
        let result = StressEngine::run(&test, &positions, &flows, Some(&base), &params, &baseline);

        // 40% haircut replaced the base 5%: inflow 400k → 240k.
        assert!(result.scenario_summary.contains("40% inflow reduction"));
        assert_eq!(result.comparison.total_inflow_delta, dec!(-140_000));
    }

    #[test]
    fn test_magnitude_override() {
        let test = CashStressTest::new(StressArchetype::MarketDrawdown, StressSeverity::Mild)
            .with_magnitude(dec!(33));
        assert_eq!(test.effective_magnitude(), dec!(33));

        let default = CashStressTest::new(StressArchetype::MarketDrawdown, StressSeverity::Mild);
        assert_eq!(default.effective_magnitude(), dec!(10));
    }
}
