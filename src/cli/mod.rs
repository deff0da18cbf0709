use clap::{Parser, Subcommand};
use rendafixa::{BenchmarkMode, SimulatorError};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "rendafixa")]
#[command(version, about = "Brazilian fixed-income yield simulator")]
#[command(
    long_about = "Simulate what an investment earns in LCI/LCA, CDB, savings (poupança) and Tesouro Selic, using the current CDI and SELIC rates published by the Banco Central do Brasil."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Skip the Banco Central and use the fallback rates (also RENDAFIXA_OFFLINE=1)
    #[arg(long = "offline", global = true)]
    pub offline: bool,

    /// Path to a config file (default: $XDG_CONFIG_HOME/rendafixa/config.toml)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate an investment (e.g. `simulate 10000 12 95 --mode cdi`)
    Simulate {
        /// Amount invested, in R$ (10000, 10000.50 or 10.000,50)
        #[arg(allow_hyphen_values = true)]
        principal: String,

        /// Term in months
        #[arg(allow_hyphen_values = true)]
        months: String,

        /// Percentage of the benchmark (e.g. 95 for 95% of the CDI)
        #[arg(allow_hyphen_values = true)]
        percent: String,

        /// Benchmark: CDI, SELIC or IPCA
        #[arg(short, long, default_value = "cdi", value_parser = parse_mode)]
        mode: BenchmarkMode,

        /// Also show savings, CDB and Tesouro Selic for the same term
        #[arg(short, long)]
        compare: bool,
    },

    /// Show the current CDI and SELIC rates
    Rates,

    /// Explain a benchmark or instrument (CDI, SELIC, IPCA, LCI, CDB, ...)
    Explain {
        /// Term to explain; omit to list all
        term: Option<String>,
    },
}

fn parse_mode(value: &str) -> Result<BenchmarkMode, String> {
    value
        .parse::<BenchmarkMode>()
        .map_err(|e: SimulatorError| e.to_string())
}
