use anyhow::{bail, Result};
use tracing::info;

use crate::cli::formatters;
use crate::cli::{Cli, Commands};
use rendafixa::config::Config;
use rendafixa::rates::{BcbClient, RateProvider};
use rendafixa::simulation::{BenchmarkMode, Instrument, SimulationInput};
use rendafixa::Session;

/// Global flags shared by every command
struct Options {
    json: bool,
    offline: bool,
    config: Option<std::path::PathBuf>,
}

fn offline_from_env() -> bool {
    std::env::var("RENDAFIXA_OFFLINE")
        .map(|v| v != "0")
        .unwrap_or(false)
}

pub async fn run(cli: Cli) -> Result<()> {
    let options = Options {
        json: cli.json,
        offline: cli.offline || offline_from_env(),
        config: cli.config,
    };

    match cli.command {
        Commands::Simulate {
            principal,
            months,
            percent,
            mode,
            compare,
        } => {
            // Reject bad input before touching the network
            let input = SimulationInput::parse(&principal, &months, &percent, mode)?;
            let session = open_session(&options).await?;
            let result = session.simulate(&input, compare)?;

            if options.json {
                println!(
                    "{}",
                    formatters::format_simulation_json(&result, session.origin())
                );
            } else {
                print!(
                    "{}",
                    formatters::format_simulation_table(&result, session.origin())
                );
            }
            Ok(())
        }

        Commands::Rates => {
            let session = open_session(&options).await?;
            let rates = session.rates();
            if options.json {
                println!("{}", formatters::format_rates_json(&rates, session.origin()));
            } else {
                print!("{}", formatters::format_rates_table(&rates, session.origin()));
            }
            Ok(())
        }

        Commands::Explain { term } => {
            let entries = match term.as_deref() {
                Some(t) => vec![lookup_term(t)?],
                None => all_terms(),
            };
            print!("{}", formatters::format_explanations(&entries));
            Ok(())
        }
    }
}

/// Resolve the rate snapshot: fallback when offline, one fetch otherwise.
async fn open_session(options: &Options) -> Result<Session> {
    if options.offline {
        info!("Offline mode, using fallback rates");
        return Ok(Session::offline());
    }

    let config = Config::load(options.config.as_deref())?;
    let provider = RateProvider::new(BcbClient::new(config.rates)?);
    Ok(Session::initialize(&provider).await)
}

fn all_terms() -> Vec<(&'static str, &'static str)> {
    let benchmarks = BenchmarkMode::ALL
        .iter()
        .map(|mode| (mode.as_str(), mode.description()));
    let instruments = [
        Instrument::LciLca,
        Instrument::Cdb,
        Instrument::Savings,
        Instrument::TreasurySelic,
    ]
    .into_iter()
    .map(|i| (i.label(), i.description()));

    benchmarks.chain(instruments).collect()
}

fn lookup_term(term: &str) -> Result<(&'static str, &'static str)> {
    if let Ok(mode) = term.parse::<BenchmarkMode>() {
        return Ok((mode.as_str(), mode.description()));
    }

    let instrument = match term.trim().to_lowercase().as_str() {
        "lci" | "lca" | "lci/lca" | "lcilca" => Instrument::LciLca,
        "cdb" => Instrument::Cdb,
        "poupanca" | "poupança" | "savings" => Instrument::Savings,
        "tesouro" | "tesouro-selic" | "treasury" => Instrument::TreasurySelic,
        _ => bail!(
            "Unknown term '{}'. Try one of: CDI, SELIC, IPCA, LCI, CDB, poupanca, tesouro",
            term
        ),
    };
    Ok((instrument.label(), instrument.description()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_terms() {
        assert_eq!(lookup_term("cdi").unwrap().0, "CDI");
        assert_eq!(lookup_term("LCA").unwrap().0, Instrument::LciLca.label());
        assert_eq!(lookup_term("poupança").unwrap().0, Instrument::Savings.label());
        assert!(lookup_term("bitcoin").is_err());
    }

    #[test]
    fn test_all_terms_lists_benchmarks_and_instruments() {
        let terms = all_terms();
        assert_eq!(terms.len(), 7);
        assert_eq!(terms[0].0, "CDI");
    }
}
