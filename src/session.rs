//! Simulation session
//!
//! Two phases: [`Session::initialize`] resolves the rate snapshot (the only
//! step that waits on the network), then [`Session::simulate`] runs
//! synchronously as many times as needed against that snapshot.

use tracing::info;

use crate::error::SimulatorError;
use crate::rates::{RateOrigin, RateProvider, RateSet, RateSource};
use crate::simulation::{SimulationInput, SimulationResult, YieldCalculator};

#[derive(Debug, Clone)]
pub struct Session {
    rates: RateSet,
    origin: RateOrigin,
    calculator: YieldCalculator,
}

impl Session {
    /// Fetch rates once and start a session with them.
    pub async fn initialize<S: RateSource>(provider: &RateProvider<S>) -> Self {
        let (rates, origin) = provider.fetch_with_origin().await;
        info!(?origin, "Session initialized");
        Self {
            rates,
            origin,
            calculator: YieldCalculator::new(),
        }
    }

    /// Start a session from a snapshot the caller already holds.
    pub fn with_rates(rates: RateSet, origin: RateOrigin) -> Self {
        Self {
            rates,
            origin,
            calculator: YieldCalculator::new(),
        }
    }

    /// Start a session on [`RateSet::FALLBACK`] without touching the network.
    pub fn offline() -> Self {
        Self {
            rates: RateSet::FALLBACK,
            origin: RateOrigin::Fallback,
            calculator: YieldCalculator::new(),
        }
    }

    pub fn rates(&self) -> RateSet {
        self.rates
    }

    pub fn origin(&self) -> RateOrigin {
        self.origin
    }

    /// Install a new snapshot, returning the one it replaces.
    pub fn replace_rates(&mut self, rates: RateSet, origin: RateOrigin) -> RateSet {
        self.origin = origin;
        std::mem::replace(&mut self.rates, rates)
    }

    pub fn simulate(
        &self,
        input: &SimulationInput,
        compare: bool,
    ) -> Result<SimulationResult, SimulatorError> {
        let base_rate = input.mode.base_rate(&self.rates);
        if compare {
            self.calculator
                .compute_with_comparison(input, base_rate, self.rates.selic)
        } else {
            self.calculator.compute(input, base_rate)
        }
    }
}
