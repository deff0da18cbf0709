//! Output formatting module for CLI display
//!
//! Keeps presentation (currency, percentages, tables, JSON) out of the
//! simulation types.

use colored::{ColoredString, Colorize};
use rendafixa::rates::{RateOrigin, RateSet};
use rendafixa::simulation::{
    BenchmarkMode, Instrument, InstrumentYield, SimulationResult, IPCA_ANNUAL_RATE,
};
use rendafixa::utils::{format_currency, format_percent};
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

fn origin_note(origin: RateOrigin) -> String {
    match origin {
        RateOrigin::Live => "Banco Central".to_string(),
        RateOrigin::Fallback => "fallback (Banco Central unavailable)".yellow().to_string(),
    }
}

/// Bold label, padded before styling
fn label(text: &str) -> ColoredString {
    format!("{:<20}", text).bold()
}

/// Format a simulation for JSON output
pub fn format_simulation_json(result: &SimulationResult, origin: RateOrigin) -> String {
    #[derive(Serialize)]
    struct JsonSimulation<'a> {
        rates_origin: RateOrigin,
        #[serde(flatten)]
        result: &'a SimulationResult,
    }

    serde_json::to_string_pretty(&JsonSimulation {
        rates_origin: origin,
        result,
    })
    .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a simulation for terminal table output
pub fn format_simulation_table(result: &SimulationResult, origin: RateOrigin) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} Simulation: {} at {} of {} for {} month(s)\n\n",
        "💰".cyan().bold(),
        format_currency(result.principal),
        format_percent(result.benchmark_percent),
        result.mode,
        result.term_months
    ));

    #[derive(Tabled)]
    struct YieldRow {
        #[tabled(rename = "Instrument")]
        instrument: String,
        #[tabled(rename = "Annual Rate")]
        annual_rate: String,
        #[tabled(rename = "Final Value")]
        final_value: String,
        #[tabled(rename = "Net Yield")]
        net_yield: String,
    }

    let to_row = |y: &InstrumentYield| YieldRow {
        instrument: y.instrument.label().to_string(),
        annual_rate: format_percent(y.annual_rate),
        final_value: format_currency(y.final_value),
        net_yield: format_currency(y.net_yield).green().to_string(),
    };

    let mut rows = vec![to_row(&result.primary())];
    if let Some(comparison) = &result.comparison {
        rows.extend(comparison.iter().map(to_row));
    }

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());

    output.push_str(&format!(
        "\n\n{} {} ({})",
        label(&format!("{} rate:", result.mode)),
        format_percent(result.base_rate),
        if result.mode == BenchmarkMode::Ipca {
            "fixed".to_string()
        } else {
            origin_note(origin)
        }
    ));
    output.push_str(&format!(
        "\n{} {}\n",
        label("Effective rate:"),
        format_percent(result.effective_rate)
    ));

    if result.comparison.is_some() {
        output.push_str(&format!(
            "{} {} is shown without income tax.\n",
            "ℹ".blue().bold(),
            Instrument::Cdb.label()
        ));
    }

    output
}

/// Format rates for JSON output
pub fn format_rates_json(rates: &RateSet, origin: RateOrigin) -> String {
    #[derive(Serialize)]
    struct JsonRates<'a> {
        origin: RateOrigin,
        #[serde(flatten)]
        rates: &'a RateSet,
        ipca: rust_decimal::Decimal,
    }

    serde_json::to_string_pretty(&JsonRates {
        origin,
        rates,
        ipca: IPCA_ANNUAL_RATE,
    })
    .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format rates for terminal output
pub fn format_rates_table(rates: &RateSet, origin: RateOrigin) -> String {
    format!(
        "\n{} Benchmark rates ({})\n\n{:<8} {:>8}\n{:<8} {:>8}\n{:<8} {:>8} (fixed)\n",
        "📈".cyan().bold(),
        origin_note(origin),
        "CDI",
        format_percent(rates.cdi),
        "SELIC",
        format_percent(rates.selic),
        "IPCA",
        format_percent(IPCA_ANNUAL_RATE),
    )
}

/// Format help text entries as `TERM\n  description`
pub fn format_explanations(entries: &[(&str, &str)]) -> String {
    let mut output = String::new();
    for (term, description) in entries {
        output.push_str(&format!("\n{}\n  {}\n", term.bold(), description));
    }
    output
}
