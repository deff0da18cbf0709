//! Compound yield calculation
//!
//! Growth is annualized and applied once over the whole term expressed in
//! fractional years: `principal * (1 + rate) ^ (months / 12)`. This is not
//! monthly compounding.

use rust_decimal::{Decimal, MathematicalOps};
use tracing::debug;

use super::{
    Comparison, Instrument, InstrumentYield, SimulationInput, SimulationResult,
    SAVINGS_ANNUAL_RATE,
};
use crate::error::SimulatorError;

const MONTHS_PER_YEAR: u32 = 12;

/// Pure yield calculator. Holds no state besides the savings rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldCalculator {
    savings_rate: Decimal,
}

impl Default for YieldCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl YieldCalculator {
    pub fn new() -> Self {
        Self {
            savings_rate: SAVINGS_ANNUAL_RATE,
        }
    }

    /// Compute the primary (LCI/LCA) scenario.
    pub fn compute(
        &self,
        input: &SimulationInput,
        base_rate: Decimal,
    ) -> Result<SimulationResult, SimulatorError> {
        input.validate()?;
        check_rate("base_rate", base_rate)?;

        let effective_rate = base_rate
            .checked_mul(input.benchmark_percent)
            .map(|rate| rate.normalize())
            .ok_or_else(|| SimulatorError::invalid("benchmark_percent", "effective rate out of range"))?;
        let final_value = grow(input.principal, effective_rate, input.term_months)?;
        let net_yield = final_value - input.principal;

        debug!(
            mode = %input.mode,
            term_months = input.term_months,
            %effective_rate,
            %final_value,
            "computed simulation"
        );

        Ok(SimulationResult {
            mode: input.mode,
            principal: input.principal,
            term_months: input.term_months,
            benchmark_percent: input.benchmark_percent,
            base_rate,
            effective_rate,
            net_yield,
            final_value,
            comparison: None,
        })
    }

    /// Compute the primary scenario plus savings, CDB and Tesouro Selic.
    ///
    /// The CDB row uses the same rate as the primary scenario, without any
    /// income-tax drag.
    pub fn compute_with_comparison(
        &self,
        input: &SimulationInput,
        base_rate: Decimal,
        selic_rate: Decimal,
    ) -> Result<SimulationResult, SimulatorError> {
        check_rate("selic_rate", selic_rate)?;
        let mut result = self.compute(input, base_rate)?;

        let scenario = |instrument: Instrument,
                        annual_rate: Decimal|
         -> Result<InstrumentYield, SimulatorError> {
            let final_value = grow(input.principal, annual_rate, input.term_months)?;
            Ok(InstrumentYield {
                instrument,
                annual_rate,
                final_value,
                net_yield: final_value - input.principal,
            })
        };

        result.comparison = Some(Comparison {
            savings: scenario(Instrument::Savings, self.savings_rate)?,
            cdb: scenario(Instrument::Cdb, result.effective_rate)?,
            treasury_selic: scenario(Instrument::TreasurySelic, selic_rate)?,
        });

        Ok(result)
    }
}

fn check_rate(field: &'static str, rate: Decimal) -> Result<(), SimulatorError> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(SimulatorError::invalid(
            field,
            format!("must not be negative (got {})", rate),
        ));
    }
    Ok(())
}

/// `principal * (1 + annual_rate) ^ (term_months / 12)`
fn grow(
    principal: Decimal,
    annual_rate: Decimal,
    term_months: u32,
) -> Result<Decimal, SimulatorError> {
    let factor = growth_factor(annual_rate, term_months)?;
    principal
        .checked_mul(factor)
        .map(|value| value.normalize())
        .ok_or_else(|| SimulatorError::invalid("principal", "final value out of range"))
}

fn growth_factor(annual_rate: Decimal, term_months: u32) -> Result<Decimal, SimulatorError> {
    if annual_rate.is_zero() {
        return Ok(Decimal::ONE);
    }

    let base = Decimal::ONE
        .checked_add(annual_rate)
        .ok_or_else(|| SimulatorError::invalid("rate", "annual rate out of range"))?;
    let factor = if term_months % MONTHS_PER_YEAR == 0 {
        base.checked_powu(u64::from(term_months / MONTHS_PER_YEAR))
    } else {
        let years = Decimal::from(term_months) / Decimal::from(MONTHS_PER_YEAR);
        base.checked_powd(years)
    };

    factor.ok_or_else(|| SimulatorError::invalid("term_months", "compounded value out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateSet;
    use crate::simulation::BenchmarkMode;
    use rust_decimal_macros::dec;

    fn input(principal: Decimal, months: u32, percent: Decimal) -> SimulationInput {
        SimulationInput::new(principal, months, percent, BenchmarkMode::Cdi)
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} ± {}, got {}",
            expected,
            tolerance,
            actual
        );
    }

    #[test]
    fn test_one_year_at_95_percent_of_cdi() {
        let calc = YieldCalculator::new();
        let result = calc
            .compute(&input(dec!(10000), 12, dec!(0.95)), dec!(0.1325))
            .unwrap();

        assert_eq!(result.effective_rate, dec!(0.125875));
        assert_eq!(result.final_value, dec!(11258.75));
        assert_eq!(result.net_yield, dec!(1258.75));
        assert!(result.comparison.is_none());
    }

    #[test]
    fn test_two_years_compounds_annually() {
        let calc = YieldCalculator::new();
        let result = calc
            .compute(&input(dec!(10000), 24, dec!(0.95)), dec!(0.1325))
            .unwrap();

        // 10000 * 1.125875^2
        assert_eq!(result.final_value, dec!(12675.94515625));
        assert_eq!(result.net_yield, dec!(2675.94515625));
    }

    #[test]
    fn test_fractional_years_use_real_exponent() {
        let calc = YieldCalculator::new();
        // 1.21 ^ 0.5 = 1.1
        let result = calc
            .compute(&input(dec!(10000), 6, Decimal::ONE), dec!(0.21))
            .unwrap();
        assert_close(result.final_value, dec!(11000), dec!(0.01));

        // 18 months is 1.5 years, not 18 monthly periods
        let result = calc
            .compute(&input(dec!(1000), 18, Decimal::ONE), dec!(0.44))
            .unwrap();
        assert_close(result.final_value, dec!(1728), dec!(0.01));
    }

    #[test]
    fn test_zero_effective_rate_keeps_principal() {
        let calc = YieldCalculator::new();
        for months in [1, 7, 12, 30] {
            let result = calc
                .compute(&input(dec!(1234.56), months, Decimal::ZERO), dec!(0.1325))
                .unwrap();
            assert_eq!(result.final_value, dec!(1234.56));
            assert_eq!(result.net_yield, Decimal::ZERO);

            let result = calc
                .compute(&input(dec!(1234.56), months, dec!(0.95)), Decimal::ZERO)
                .unwrap();
            assert_eq!(result.final_value, dec!(1234.56));
        }
    }

    #[test]
    fn test_final_value_never_below_principal() {
        let calc = YieldCalculator::new();
        for months in [1, 5, 12, 13, 36, 61] {
            for percent in [dec!(0), dec!(0.5), dec!(1), dec!(1.2)] {
                for rate in [dec!(0), dec!(0.0001), dec!(0.1325), dec!(0.45)] {
                    let inp = input(dec!(500), months, percent);
                    let result = calc.compute(&inp, rate).unwrap();
                    assert!(result.final_value >= result.principal);
                    assert_eq!(result.final_value, result.principal + result.net_yield);
                }
            }
        }
    }

    #[test]
    fn test_compute_is_idempotent() {
        let calc = YieldCalculator::new();
        let inp = input(dec!(7777.77), 17, dec!(1.03));
        let first = calc.compute_with_comparison(&inp, dec!(0.1315), dec!(0.14)).unwrap();
        let second = calc.compute_with_comparison(&inp, dec!(0.1315), dec!(0.14)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.final_value.serialize(), second.final_value.serialize());
    }

    #[test]
    fn test_comparison_scenarios() {
        let calc = YieldCalculator::new();
        let result = calc
            .compute_with_comparison(&input(dec!(10000), 12, dec!(0.95)), dec!(0.1325), dec!(0.1325))
            .unwrap();
        let comparison = result.comparison.as_ref().unwrap();

        assert_eq!(comparison.savings.annual_rate, dec!(0.05));
        assert_eq!(comparison.savings.final_value, dec!(10500));
        assert_eq!(comparison.savings.net_yield, dec!(500));

        assert_eq!(comparison.treasury_selic.final_value, dec!(11325));
        assert_eq!(comparison.treasury_selic.net_yield, dec!(1325));

        // CDB mirrors the primary scenario
        assert_eq!(comparison.cdb.final_value, result.final_value);
        assert_eq!(comparison.cdb.net_yield, result.net_yield);
        assert_eq!(comparison.cdb.instrument, Instrument::Cdb);
    }

    #[test]
    fn test_treasury_ignores_benchmark_percent() {
        let calc = YieldCalculator::new();
        let result = calc
            .compute_with_comparison(&input(dec!(1000), 24, dec!(0.5)), dec!(0.10), dec!(0.10))
            .unwrap();
        let comparison = result.comparison.unwrap();
        assert_eq!(comparison.treasury_selic.final_value, dec!(1210));
        assert_eq!(result.final_value, dec!(1102.5));
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let calc = YieldCalculator::new();

        let err = calc
            .compute(&input(dec!(-5), 12, dec!(0.95)), dec!(0.1325))
            .unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidInput { field: "principal", .. }));

        let err = calc
            .compute(&input(dec!(100), 0, dec!(0.95)), dec!(0.1325))
            .unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidInput { field: "term_months", .. }));

        let err = calc
            .compute(&input(dec!(100), 12, dec!(-0.1)), dec!(0.1325))
            .unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidInput { field: "benchmark_percent", .. }));

        let err = calc
            .compute(&input(dec!(100), 12, dec!(0.95)), dec!(-0.01))
            .unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidInput { field: "base_rate", .. }));

        let err = calc
            .compute_with_comparison(&input(dec!(100), 12, dec!(0.95)), dec!(0.1), dec!(-0.1))
            .unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidInput { field: "selic_rate", .. }));
    }

    #[test]
    fn test_overflow_is_invalid_input_not_panic() {
        let calc = YieldCalculator::new();
        let result = calc.compute(&input(dec!(1000000000), 12 * 4000, Decimal::ONE), dec!(10));
        assert!(matches!(result, Err(SimulatorError::InvalidInput { .. })));
    }

    #[test]
    fn test_huge_benchmark_percent_is_invalid_input() {
        let calc = YieldCalculator::new();
        let err = calc
            .compute(&input(dec!(1), 12, Decimal::MAX), dec!(2))
            .unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidInput { field: "benchmark_percent", .. }));
    }

    #[test]
    fn test_huge_base_rate_is_invalid_input() {
        let calc = YieldCalculator::new();
        let err = calc
            .compute(&input(dec!(1), 12, Decimal::ONE), Decimal::MAX)
            .unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidInput { field: "rate", .. }));

        let result = calc.compute(&input(dec!(1), 7, Decimal::ONE), Decimal::MAX);
        assert!(matches!(result, Err(SimulatorError::InvalidInput { .. })));
    }

    #[test]
    fn test_huge_selic_rate_is_invalid_input() {
        let calc = YieldCalculator::new();
        let err = calc
            .compute_with_comparison(&input(dec!(1), 12, dec!(0.95)), dec!(0.1325), Decimal::MAX)
            .unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidInput { field: "rate", .. }));

        let result = calc.compute_with_comparison(
            &input(dec!(1000), 12 * 40, dec!(0.95)),
            dec!(0.1325),
            dec!(1000000000),
        );
        assert!(matches!(result, Err(SimulatorError::InvalidInput { .. })));
    }

    #[test]
    fn test_ipca_mode_uses_fixed_rate() {
        let calc = YieldCalculator::new();
        let rates = RateSet::new(dec!(0.2), dec!(0.3));
        let rate = BenchmarkMode::Ipca.base_rate(&rates);
        let result = calc
            .compute(
                &SimulationInput::new(dec!(10000), 12, Decimal::ONE, BenchmarkMode::Ipca),
                rate,
            )
            .unwrap();
        assert_eq!(result.final_value, dec!(10450));
    }
}
