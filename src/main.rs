//! liquidity-engine CLI
//!
//! Run cash forecasts and stress tests from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Forecast a portfolio from a JSON file
//! liquidity-engine forecast --input portfolio.json --horizon 90
//!
//! # Apply a scenario preset and emit JSON
//! liquidity-engine forecast --input portfolio.json --preset conservative --format json
//!
//! # Run a stress test against the baseline
//! liquidity-engine stress --input portfolio.json --archetype tax_spike --severity severe
//!
//! # Generate a random portfolio for testing
//! liquidity-engine generate --positions 3 --flows 40 --output portfolio.json
//! ```

use chrono::{NaiveDate, Utc};
use liquidity_engine::alert::engine::AlertEngine;
use liquidity_engine::alert::rules::default_rules;
use liquidity_engine::core::flow::{CashFlow, FlowSet};
use liquidity_engine::core::position::CashPosition;
use liquidity_engine::forecast::engine::{ForecastEngine, ForecastParams};
use liquidity_engine::scenario::adjustments::{CashScenario, ScenarioAdjustments};
use liquidity_engine::simulation::generator::{generate_random_portfolio, PortfolioConfig};
use liquidity_engine::stress::engine::{CashStressTest, StressEngine};
use liquidity_engine::stress::{StressArchetype, StressSeverity};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"liquidity-engine — cash forecasting and stress testing

USAGE:
    liquidity-engine <COMMAND> [OPTIONS]

COMMANDS:
    forecast    Project a daily cash balance timeline and derive alerts
    stress      Run an archetype stress test against the baseline forecast
    generate    Generate a random portfolio (for testing)
    help        Show this message

OPTIONS (forecast, stress):
    --input <FILE>        Path to JSON portfolio file
    --start <DATE>        Horizon start, YYYY-MM-DD (default: today)
    --horizon <DAYS>      Horizon length in days (default: 90)
    --threshold <AMOUNT>  Minimum-cash threshold (default: 0)
    --preset <NAME>       Scenario preset: base, conservative, aggressive
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (stress):
    --archetype <NAME>    market_drawdown | delayed_distributions | tax_spike |
                          debt_rate_shock | capital_call_acceleration
    --severity <TIER>     mild | moderate | severe
    --magnitude <VALUE>   Override the severity-tier default magnitude

OPTIONS (generate):
    --positions <N>       Number of positions (default: 3)
    --flows <N>           Number of flow templates (default: 25)
    --output <FILE>       Write to file instead of stdout

EXAMPLES:
    liquidity-engine forecast --input portfolio.json
    liquidity-engine forecast --input portfolio.json --preset conservative --format json
    liquidity-engine stress --input portfolio.json --archetype market_drawdown --severity moderate
    liquidity-engine generate --positions 5 --flows 60 --output portfolio.json"#
    );
}

/// JSON schema for input portfolios.
#[derive(serde::Deserialize, serde::Serialize)]
struct PortfolioFile {
    positions: Vec<CashPosition>,
    flows: Vec<CashFlow>,
}

fn load_portfolio(path: &str) -> (Vec<CashPosition>, FlowSet) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: PortfolioFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format: {{ \"positions\": [...], \"flows\": [...] }}");
        process::exit(1);
    });

    let flows: FlowSet = file.flows.into_iter().collect();
    (file.positions, flows)
}

/// Shared options for the forecast and stress commands.
struct RunOptions {
    input: Option<String>,
    start: NaiveDate,
    horizon: u32,
    threshold: Decimal,
    preset: Option<String>,
    format: String,
    archetype: Option<String>,
    severity: Option<String>,
    magnitude: Option<Decimal>,
}

impl RunOptions {
    fn parse(args: &[String]) -> Self {
        let mut options = RunOptions {
            input: None,
            start: Utc::now().date_naive(),
            horizon: 90,
            threshold: Decimal::ZERO,
            preset: None,
            format: "text".to_string(),
            archetype: None,
            severity: None,
            magnitude: None,
        };

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            i += 1;
            let value = args.get(i).cloned().unwrap_or_else(|| {
                eprintln!("{} requires a value", flag);
                process::exit(1);
            });
            match flag {
                "--input" => options.input = Some(value),
                "--start" => {
                    options.start = value.parse().unwrap_or_else(|e| {
                        eprintln!("Invalid --start date '{}': {}", value, e);
                        process::exit(1);
                    })
                }
                "--horizon" => {
                    options.horizon = value.parse().unwrap_or_else(|_| {
                        eprintln!("--horizon requires a number of days");
                        process::exit(1);
                    })
                }
                "--threshold" => {
                    options.threshold = value.parse().unwrap_or_else(|_| {
                        eprintln!("--threshold requires an amount");
                        process::exit(1);
                    })
                }
                "--preset" => options.preset = Some(value),
                "--format" => options.format = value,
                "--archetype" => options.archetype = Some(value),
                "--severity" => options.severity = Some(value),
                "--magnitude" => {
                    options.magnitude = Some(value.parse().unwrap_or_else(|_| {
                        eprintln!("--magnitude requires a number");
                        process::exit(1);
                    }))
                }
                _ => {
                    eprintln!("Unknown option: {}", flag);
                    process::exit(1);
                }
            }
            i += 1;
        }
        options
    }

    fn require_input(&self) -> &str {
        self.input.as_deref().unwrap_or_else(|| {
            eprintln!("Error: --input <FILE> is required");
            process::exit(1);
        })
    }

    fn scenario(&self) -> Option<ScenarioAdjustments> {
        let name = self.preset.as_deref()?;
        let scenario = CashScenario::preset(name).unwrap_or_else(|| {
            eprintln!("Unknown preset '{}'; expected base, conservative, or aggressive", name);
            process::exit(1);
        });
        Some(scenario.adjustments)
    }

    fn params(&self) -> ForecastParams {
        ForecastParams::new(self.start, self.horizon).with_minimum_cash(self.threshold)
    }
}

fn cmd_forecast(args: &[String]) {
    let options = RunOptions::parse(args);
    let (positions, flows) = load_portfolio(options.require_input());
    let scenario = options.scenario();
    let params = options.params();

    let result = ForecastEngine::build_forecast(&positions, &flows, scenario.as_ref(), &params);
    let alerts = AlertEngine::generate(&result, &default_rules(), Utc::now());

    if options.format == "json" {
        #[derive(serde::Serialize)]
        struct Output<'a> {
            forecast: &'a liquidity_engine::forecast::result::ForecastResult,
            alerts: &'a [liquidity_engine::alert::alert::LiquidityAlert],
        }
        let output = Output {
            forecast: &result,
            alerts: &alerts,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("{}", result);
        if let Some(adjustments) = &scenario {
            println!("Scenario:         {}", adjustments.describe());
        }
        if alerts.is_empty() {
            println!("\nNo liquidity alerts.");
        } else {
            println!("\n=== Liquidity Alerts ===");
            for alert in &alerts {
                println!("[{}] {}", alert.severity(), alert.title());
                println!("  {}", alert.description());
                for action in alert.actions() {
                    println!("  - {}", action.description);
                }
            }
        }
    }
}

fn cmd_stress(args: &[String]) {
    let options = RunOptions::parse(args);
    let (positions, flows) = load_portfolio(options.require_input());
    let scenario = options.scenario();
    let params = options.params();

    let archetype = options
        .archetype
        .as_deref()
        .and_then(StressArchetype::parse)
        .unwrap_or_else(|| {
            eprintln!("Error: --archetype is required (see help for values)");
            process::exit(1);
        });
    let severity = options
        .severity
        .as_deref()
        .and_then(StressSeverity::parse)
        .unwrap_or_else(|| {
            eprintln!("Error: --severity is required: mild, moderate, or severe");
            process::exit(1);
        });

    let mut test = CashStressTest::new(archetype, severity);
    if let Some(magnitude) = options.magnitude {
        test = test.with_magnitude(magnitude);
    }

    let baseline = ForecastEngine::build_forecast(&positions, &flows, scenario.as_ref(), &params);
    let result = StressEngine::run(
        &test,
        &positions,
        &flows,
        scenario.as_ref(),
        &params,
        &baseline,
    );

    if options.format == "json" {
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        println!("{}", result);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = PortfolioConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let value = args.get(i).cloned().unwrap_or_else(|| {
            eprintln!("{} requires a value", flag);
            process::exit(1);
        });
        match flag {
            "--positions" => {
                config.position_count = value.parse().unwrap_or_else(|_| {
                    eprintln!("--positions requires a number");
                    process::exit(1);
                })
            }
            "--flows" => {
                config.flow_count = value.parse().unwrap_or_else(|_| {
                    eprintln!("--flows requires a number");
                    process::exit(1);
                })
            }
            "--output" => output_path = Some(value),
            _ => {
                eprintln!("Unknown option: {}", flag);
                process::exit(1);
            }
        }
        i += 1;
    }

    let (positions, flows) = generate_random_portfolio(&config);
    let file = PortfolioFile {
        positions,
        flows: flows.flows().to_vec(),
    };
    let json = serde_json::to_string_pretty(&file).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} positions and {} flows → {}",
            file.positions.len(),
            file.flows.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "forecast" => cmd_forecast(rest),
        "stress" => cmd_stress(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
