use crate::alert::alert::{
    ActionPriority, AlertSeverity, LiquidityAlert, SuggestedAction,
};
use crate::alert::rules::{AlertMetric, AlertRule};
use crate::forecast::result::ForecastResult;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

/// Format an amount with thousands separators for alert text.
fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = rounded.to_string();
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Severity- and magnitude-driven remediation suggestions.
///
/// Critical alerts always lead with payment-delay and short-term-financing
/// suggestions; large shortfalls add asset liquidation; every alert ends
/// with the two baseline actions.
fn suggested_actions(severity: AlertSeverity, shortfall: Decimal) -> Vec<SuggestedAction> {
    let mut actions = Vec::new();

    if severity == AlertSeverity::Critical {
        actions.push(SuggestedAction::new(
            "Negotiate payment delays with counterparties",
            ActionPriority::High,
        ));
        actions.push(SuggestedAction::new(
            "Evaluate short-term financing options",
            ActionPriority::High,
        ));
    }
    if shortfall > dec!(500_000) {
        actions.push(SuggestedAction::new(
            "Liquidate liquid assets to cover the shortfall",
            ActionPriority::High,
        ));
    }

    actions.push(SuggestedAction::new(
        "Contact counterparties to confirm expected flow timing",
        ActionPriority::Medium,
    ));
    actions.push(SuggestedAction::new(
        "Review forecast inputs for freshness",
        ActionPriority::Low,
    ));

    actions
}

/// Derives deduplicated liquidity alerts from a forecast result.
///
/// Generation is a pure function of the forecast, the rule set, and the
/// generation timestamp. It runs no trigger loop and holds no state.
pub struct AlertEngine;

impl AlertEngine {
    /// Evaluate a rule set against a forecast and synthesize alerts.
    ///
    /// Alerts are only synthesized when the horizon contains a deficit
    /// day; "no deficit" is a valid, good outcome that produces an empty
    /// list. One candidate is generated per matching rule, then candidates
    /// are deduplicated by deficit date keeping the highest severity, so
    /// at most one alert per deficit date survives a generation pass.
    pub fn generate(
        forecast: &ForecastResult,
        rules: &[AlertRule],
        generated_at: DateTime<Utc>,
    ) -> Vec<LiquidityAlert> {
        let Some(deficit_date) = forecast.first_deficit_date() else {
            return Vec::new();
        };
        let days_until = forecast.days_until_first_deficit().unwrap_or(0);
        let summary = forecast.summary();
        let shortfall = forecast.shortfall();
        let deficit_count = summary.deficit_day_count();

        let mut candidates = Vec::new();
        for rule in rules {
            let value = match rule.metric {
                AlertMetric::DaysUntilDeficit => Decimal::from(days_until),
                AlertMetric::MinimumBalance => summary.minimum_balance,
                AlertMetric::ShortfallAmount => shortfall,
                AlertMetric::DeficitDayCount => Decimal::from(deficit_count as u64),
            };
            if !rule.matches(value) {
                continue;
            }

            candidates.push(Self::build_alert(
                rule.severity,
                forecast,
                deficit_date,
                days_until,
                shortfall,
                generated_at,
            ));
        }

        Self::deduplicate(candidates)
    }

    /// Evaluate the rules and tag every surviving alert with the scenario
    /// or stress-test name the forecast ran under.
    pub fn generate_for_scenario(
        forecast: &ForecastResult,
        rules: &[AlertRule],
        generated_at: DateTime<Utc>,
        scenario_name: &str,
    ) -> Vec<LiquidityAlert> {
        Self::generate(forecast, rules, generated_at)
            .into_iter()
            .map(|a| a.with_source_scenario(scenario_name))
            .collect()
    }

    fn build_alert(
        severity: AlertSeverity,
        forecast: &ForecastResult,
        deficit_date: NaiveDate,
        days_until: i64,
        shortfall: Decimal,
        generated_at: DateTime<Utc>,
    ) -> LiquidityAlert {
        let summary = forecast.summary();
        let date_text = deficit_date.format("%b %-d, %Y").to_string();

        let title = format!(
            "{} liquidity alert: projected cash deficit on {}",
            capitalize(severity.label()),
            date_text
        );
        let description = format!(
            "Cash is projected to fall {} below the minimum threshold on {}, \
             {} day(s) from the forecast start. The minimum balance over the \
             horizon is {}, with {} day(s) below the threshold.",
            format_amount(shortfall),
            date_text,
            days_until,
            format_amount(summary.minimum_balance),
            summary.deficit_day_count()
        );

        LiquidityAlert::new(
            severity,
            deficit_date,
            shortfall,
            days_until,
            title,
            description,
            suggested_actions(severity, shortfall),
            generated_at,
        )
    }

    /// Keep the highest-severity candidate per deficit date. Candidates of
    /// equal severity keep the earliest-generated one.
    fn deduplicate(candidates: Vec<LiquidityAlert>) -> Vec<LiquidityAlert> {
        let mut by_date: BTreeMap<NaiveDate, LiquidityAlert> = BTreeMap::new();
        for candidate in candidates {
            match by_date.get(&candidate.deficit_date()) {
                Some(existing) if existing.severity() >= candidate.severity() => {}
                _ => {
                    by_date.insert(candidate.deficit_date(), candidate);
                }
            }
        }
        by_date.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::rules::default_rules;
    use crate::core::client::ClientId;
    use crate::core::currency::CurrencyCode;
    use crate::core::flow::{CashFlow, FlowCategory, FlowDirection, FlowSet};
    use crate::core::position::{CashPosition, PositionScope};
    use crate::forecast::engine::{ForecastEngine, ForecastParams};
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn forecast_with_deficit_on_day(day: u64) -> ForecastResult {
        let client = ClientId::new("household-smith");
        let start = date(2026, 3, 1);
        let positions = vec![CashPosition::new(
            client.clone(),
            PositionScope::Household,
            dec!(1_000_000),
            CurrencyCode::usd(),
        )];
        let mut flows = FlowSet::new();
        flows.add(CashFlow::new(
            "cc-1",
            client,
            FlowDirection::Outflow,
            FlowCategory::CapitalCall,
            start + Days::new(day),
            dec!(1_200_000),
            CurrencyCode::usd(),
        ));
        let params = ForecastParams::new(start, 30);
        ForecastEngine::build_forecast(&positions, &flows, None, &params)
    }

    #[test]
    fn test_imminent_deficit_yields_single_critical_alert() {
        let forecast = forecast_with_deficit_on_day(10);
        let alerts = AlertEngine::generate(&forecast, &default_rules(), Utc::now());

        // Three rules match (critical ≤30d, warning ≤90d, info shortfall>0,
        // warning min<100k) but dedup keeps one per deficit date.
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.severity(), AlertSeverity::Critical);
        assert_eq!(alert.deficit_date(), date(2026, 3, 11));
        assert_eq!(alert.shortfall(), dec!(200_000));
        assert_eq!(alert.days_until_deficit(), 10);
        assert!(alert.title().starts_with("Critical"));
        assert!(alert.description().contains("200,000"));
    }

    #[test]
    fn test_no_deficit_no_alerts() {
        let client = ClientId::new("household-smith");
        let positions = vec![CashPosition::new(
            client,
            PositionScope::Household,
            dec!(1_000_000),
            CurrencyCode::usd(),
        )];
        let params = ForecastParams::new(date(2026, 3, 1), 30);
        let forecast = ForecastEngine::build_forecast(&positions, &FlowSet::new(), None, &params);

        let alerts = AlertEngine::generate(&forecast, &default_rules(), Utc::now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_critical_actions_present() {
        let forecast = forecast_with_deficit_on_day(5);
        let alerts = AlertEngine::generate(&forecast, &default_rules(), Utc::now());
        let actions = alerts[0].actions();

        assert!(actions
            .iter()
            .any(|a| a.description.contains("Negotiate payment delays")));
        assert!(actions
            .iter()
            .any(|a| a.description.contains("short-term financing")));
        // Baseline actions always close the list.
        let last_two: Vec<_> = actions.iter().rev().take(2).collect();
        assert_eq!(last_two[0].priority, ActionPriority::Low);
        assert_eq!(last_two[1].priority, ActionPriority::Medium);
    }

    #[test]
    fn test_large_shortfall_adds_liquidation_action() {
        let client = ClientId::new("household-smith");
        let start = date(2026, 3, 1);
        let positions = vec![CashPosition::new(
            client.clone(),
            PositionScope::Household,
            dec!(100_000),
            CurrencyCode::usd(),
        )];
        let mut flows = FlowSet::new();
        flows.add(CashFlow::new(
            "cc-1",
            client,
            FlowDirection::Outflow,
            FlowCategory::CapitalCall,
            start + Days::new(3),
            dec!(900_000),
            CurrencyCode::usd(),
        ));
        let params = ForecastParams::new(start, 30);
        let forecast = ForecastEngine::build_forecast(&positions, &flows, None, &params);
        assert_eq!(forecast.shortfall(), dec!(800_000));

        let alerts = AlertEngine::generate(&forecast, &default_rules(), Utc::now());
        assert!(alerts[0]
            .actions()
            .iter()
            .any(|a| a.description.contains("Liquidate liquid assets")));
    }

    #[test]
    fn test_scenario_tagging() {
        let forecast = forecast_with_deficit_on_day(10);
        let alerts = AlertEngine::generate_for_scenario(
            &forecast,
            &default_rules(),
            Utc::now(),
            "conservative",
        );
        assert_eq!(alerts[0].source_scenario(), Some("conservative"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(200000)), "200,000");
        assert_eq!(format_amount(dec!(-1234567.5)), "-1,234,567.5");
        assert_eq!(format_amount(dec!(999)), "999");
        assert_eq!(format_amount(Decimal::ZERO), "0");
    }

    #[test]
    fn test_deduplicate_keeps_max_severity() {
        let forecast = forecast_with_deficit_on_day(10);
        let now = Utc::now();
        let mk = |severity| {
            AlertEngine::build_alert(severity, &forecast, date(2026, 3, 11), 10, dec!(200_000), now)
        };
        let survivors = AlertEngine::deduplicate(vec![
            mk(AlertSeverity::Info),
            mk(AlertSeverity::Critical),
            mk(AlertSeverity::Warning),
        ]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].severity(), AlertSeverity::Critical);
    }
}
