//! Simulation inputs and results
//!
//! The calculator itself lives in [`calculator`]; this module holds the data
//! it consumes and produces, plus the benchmark and instrument vocabulary.

pub mod calculator;

pub use calculator::YieldCalculator;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::SimulatorError;
use crate::rates::RateSet;
use crate::utils::{parse_decimal_br, parse_percent_br};

/// Annual rate used for IPCA-linked simulations. Never fetched.
pub const IPCA_ANNUAL_RATE: Decimal = dec!(0.045);

/// Annual rate of the savings account ("poupança") comparison scenario.
pub const SAVINGS_ANNUAL_RATE: Decimal = dec!(0.05);

/// Benchmark the contracted percentage applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BenchmarkMode {
    Cdi,
    Selic,
    Ipca,
}

impl BenchmarkMode {
    pub const ALL: [BenchmarkMode; 3] = [
        BenchmarkMode::Cdi,
        BenchmarkMode::Selic,
        BenchmarkMode::Ipca,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkMode::Cdi => "CDI",
            BenchmarkMode::Selic => "SELIC",
            BenchmarkMode::Ipca => "IPCA",
        }
    }

    /// Resolve the annual base rate for this benchmark.
    ///
    /// CDI and SELIC come from the fetched snapshot; IPCA is the fixed
    /// [`IPCA_ANNUAL_RATE`] whatever the snapshot holds.
    pub fn base_rate(&self, rates: &RateSet) -> Decimal {
        match self {
            BenchmarkMode::Cdi => rates.cdi,
            BenchmarkMode::Selic => rates.selic,
            BenchmarkMode::Ipca => IPCA_ANNUAL_RATE,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BenchmarkMode::Cdi => {
                "CDI (Certificado de Depósito Interbancário) is the average rate banks charge each \
                 other for short-term loans. CDBs and LCI/LCAs usually pay a percentage of the CDI."
            }
            BenchmarkMode::Selic => {
                "SELIC is the base interest rate of the Brazilian economy. It is the reference for \
                 loans, financing and fixed-income investments such as Tesouro Selic."
            }
            BenchmarkMode::Ipca => {
                "IPCA is Brazil's official consumer price inflation index. Some investments are \
                 linked to the IPCA to protect purchasing power."
            }
        }
    }
}

impl fmt::Display for BenchmarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BenchmarkMode {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CDI" => Ok(BenchmarkMode::Cdi),
            "SELIC" => Ok(BenchmarkMode::Selic),
            "IPCA" => Ok(BenchmarkMode::Ipca),
            other => Err(SimulatorError::invalid(
                "mode",
                format!("unknown benchmark '{}' (expected CDI, SELIC or IPCA)", other),
            )),
        }
    }
}

/// Fixed-income instruments shown in a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    /// Tax-exempt LCI/LCA, the primary scenario
    LciLca,
    Savings,
    Cdb,
    TreasurySelic,
}

impl Instrument {
    pub fn label(&self) -> &'static str {
        match self {
            Instrument::LciLca => "LCI/LCA (tax-exempt)",
            Instrument::Savings => "Savings (Poupança)",
            Instrument::Cdb => "CDB",
            Instrument::TreasurySelic => "Tesouro Selic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Instrument::LciLca => {
                "LCI and LCA are bank-issued securities backed by real-estate and agribusiness \
                 credit. They are exempt from income tax for individuals."
            }
            Instrument::Savings => {
                "Savings accounts (poupança) pay a regulated rate and are exempt from income tax."
            }
            Instrument::Cdb => {
                "CDB (Certificado de Depósito Bancário) is a taxable bank certificate of deposit, \
                 usually contracted as a percentage of the CDI."
            }
            Instrument::TreasurySelic => {
                "Tesouro Selic is a federal government bond that pays the SELIC rate."
            }
        }
    }
}

/// Investment parameters for one simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationInput {
    pub principal: Decimal,
    pub term_months: u32,
    /// Fraction of the benchmark, 0.95 = 95%
    pub benchmark_percent: Decimal,
    pub mode: BenchmarkMode,
}

impl SimulationInput {
    pub fn new(
        principal: Decimal,
        term_months: u32,
        benchmark_percent: Decimal,
        mode: BenchmarkMode,
    ) -> Self {
        Self {
            principal,
            term_months,
            benchmark_percent,
            mode,
        }
    }

    /// Build an input from the raw text a user typed.
    ///
    /// `percent` is a whole percentage (`"95"` or `"95,5"`), `term_months` must
    /// be an integer. The result is validated before it is returned.
    pub fn parse(
        principal: &str,
        term_months: &str,
        percent: &str,
        mode: BenchmarkMode,
    ) -> Result<Self, SimulatorError> {
        let principal = parse_decimal_br(principal)
            .map_err(|e| SimulatorError::invalid("principal", e.to_string()))?;
        let term_months = term_months.trim().parse::<u32>().map_err(|_| {
            SimulatorError::invalid(
                "term_months",
                format!("'{}' is not a positive whole number of months", term_months.trim()),
            )
        })?;
        let benchmark_percent = parse_percent_br(percent)
            .map_err(|e| SimulatorError::invalid("benchmark_percent", e.to_string()))?;

        let input = Self::new(principal, term_months, benchmark_percent, mode);
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.principal <= Decimal::ZERO {
            return Err(SimulatorError::invalid(
                "principal",
                format!("must be greater than zero (got {})", self.principal),
            ));
        }
        if self.term_months == 0 {
            return Err(SimulatorError::invalid(
                "term_months",
                "must be at least one month",
            ));
        }
        if self.benchmark_percent.is_sign_negative() && !self.benchmark_percent.is_zero() {
            return Err(SimulatorError::invalid(
                "benchmark_percent",
                format!("must not be negative (got {})", self.benchmark_percent),
            ));
        }
        Ok(())
    }
}

/// Yield of one instrument over the simulated term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentYield {
    pub instrument: Instrument,
    pub annual_rate: Decimal,
    pub final_value: Decimal,
    pub net_yield: Decimal,
}

/// Alternative instruments computed with the same principal and term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub savings: InstrumentYield,
    pub cdb: InstrumentYield,
    pub treasury_selic: InstrumentYield,
}

impl Comparison {
    pub fn iter(&self) -> impl Iterator<Item = &InstrumentYield> {
        [&self.savings, &self.cdb, &self.treasury_selic].into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationResult {
    pub mode: BenchmarkMode,
    pub principal: Decimal,
    pub term_months: u32,
    pub benchmark_percent: Decimal,
    pub base_rate: Decimal,
    pub effective_rate: Decimal,
    pub net_yield: Decimal,
    pub final_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

impl SimulationResult {
    /// The primary scenario as an instrument row
    pub fn primary(&self) -> InstrumentYield {
        InstrumentYield {
            instrument: Instrument::LciLca,
            annual_rate: self.effective_rate,
            final_value: self.final_value,
            net_yield: self.net_yield,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str_is_case_insensitive() {
        assert_eq!("cdi".parse::<BenchmarkMode>().unwrap(), BenchmarkMode::Cdi);
        assert_eq!(" Selic ".parse::<BenchmarkMode>().unwrap(), BenchmarkMode::Selic);
        assert_eq!("IPCA".parse::<BenchmarkMode>().unwrap(), BenchmarkMode::Ipca);

        let err = "igpm".parse::<BenchmarkMode>().unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_base_rate_mapping() {
        let rates = RateSet::new(dec!(0.10), dec!(0.11));
        assert_eq!(BenchmarkMode::Cdi.base_rate(&rates), dec!(0.10));
        assert_eq!(BenchmarkMode::Selic.base_rate(&rates), dec!(0.11));
        assert_eq!(BenchmarkMode::Ipca.base_rate(&rates), dec!(0.045));
    }

    #[test]
    fn test_ipca_ignores_fetched_rates() {
        for rates in [
            RateSet::FALLBACK,
            RateSet::new(Decimal::ZERO, Decimal::ZERO),
            RateSet::new(dec!(0.5), dec!(0.9)),
        ] {
            assert_eq!(BenchmarkMode::Ipca.base_rate(&rates), IPCA_ANNUAL_RATE);
        }
    }

    #[test]
    fn test_parse_form_input() {
        let input = SimulationInput::parse("10.000,00", "12", "95", BenchmarkMode::Cdi).unwrap();
        assert_eq!(input.principal, dec!(10000));
        assert_eq!(input.term_months, 12);
        assert_eq!(input.benchmark_percent, dec!(0.95));

        let input = SimulationInput::parse("2500.50", " 6 ", "102,5", BenchmarkMode::Selic).unwrap();
        assert_eq!(input.principal, dec!(2500.50));
        assert_eq!(input.benchmark_percent, dec!(1.025));
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        let cases = [
            ("-5", "12", "95", "principal"),
            ("0", "12", "95", "principal"),
            ("abc", "12", "95", "principal"),
            ("1000", "0", "95", "term_months"),
            ("1000", "-3", "95", "term_months"),
            ("1000", "12.5", "95", "term_months"),
            ("1000", "", "95", "term_months"),
            ("1000", "12", "-10", "benchmark_percent"),
            ("1000", "12", "", "benchmark_percent"),
        ];

        for (principal, months, percent, expected_field) in cases {
            match SimulationInput::parse(principal, months, percent, BenchmarkMode::Cdi) {
                Err(SimulatorError::InvalidInput { field, .. }) => {
                    assert_eq!(field, expected_field, "input {:?}", (principal, months, percent))
                }
                other => panic!("expected InvalidInput for {:?}, got {:?}", principal, other),
            }
        }
    }

    #[test]
    fn test_zero_percent_is_valid() {
        let input = SimulationInput::new(dec!(100), 1, Decimal::ZERO, BenchmarkMode::Cdi);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_descriptions_present() {
        for mode in BenchmarkMode::ALL {
            assert!(mode.description().contains(mode.as_str()));
        }
        assert!(Instrument::Cdb.description().contains("taxable"));
    }
}
