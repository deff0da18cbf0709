//! Benchmark rate retrieval
//!
//! [`RateProvider`] asks a [`RateSource`] for the latest CDI and SELIC
//! observations and never fails: any error is logged and replaced by
//! [`RateSet::FALLBACK`]. The production source is [`bcb::BcbClient`].

pub mod bcb;

pub use bcb::BcbClient;

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::error::{Result, SimulatorError};

/// Annual CDI and SELIC rates as decimal fractions (0.1325 = 13.25%/year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateSet {
    pub cdi: Decimal,
    pub selic: Decimal,
}

impl RateSet {
    /// Used whenever the rate source cannot be reached or returns garbage
    pub const FALLBACK: RateSet = RateSet {
        cdi: dec!(0.1325),
        selic: dec!(0.1325),
    };

    pub fn new(cdi: Decimal, selic: Decimal) -> Self {
        Self { cdi, selic }
    }
}

impl Default for RateSet {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Time series published by the rate source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateSeries {
    Cdi,
    Selic,
}

impl RateSeries {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSeries::Cdi => "CDI",
            RateSeries::Selic => "SELIC",
        }
    }
}

impl fmt::Display for RateSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can report the most recent annual rate of a series
#[allow(async_fn_in_trait)]
pub trait RateSource {
    /// Latest observation as a fraction (13,25% -> 0.1325)
    async fn latest(&self, series: RateSeries) -> Result<Decimal>;
}

/// Whether a [`RateSet`] came from the source or from the fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    Live,
    Fallback,
}

/// Best-effort rate provider with a static fallback
pub struct RateProvider<S> {
    source: S,
}

impl<S: RateSource> RateProvider<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch both rates, propagating the first failure.
    ///
    /// Both series are requested concurrently. There is no partial result:
    /// if either request fails the whole set fails.
    pub async fn try_fetch(&self) -> Result<RateSet> {
        let (cdi, selic) = tokio::try_join!(
            async {
                self.source
                    .latest(RateSeries::Cdi)
                    .await
                    .context("failed to fetch CDI")
            },
            async {
                self.source
                    .latest(RateSeries::Selic)
                    .await
                    .context("failed to fetch SELIC")
            },
        )?;

        for (series, value) in [(RateSeries::Cdi, cdi), (RateSeries::Selic, selic)] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(SimulatorError::RateFetch(format!(
                    "{} rate is negative: {}",
                    series, value
                ))
                .into());
            }
        }

        Ok(RateSet::new(cdi, selic))
    }

    /// Fetch both rates, falling back to [`RateSet::FALLBACK`] on any error.
    pub async fn fetch(&self) -> RateSet {
        self.fetch_with_origin().await.0
    }

    pub async fn fetch_with_origin(&self) -> (RateSet, RateOrigin) {
        match self.try_fetch().await {
            Ok(rates) => {
                info!(cdi = %rates.cdi, selic = %rates.selic, "Fetched benchmark rates");
                (rates, RateOrigin::Live)
            }
            Err(e) => {
                warn!("Benchmark rate fetch failed, using fallback rates: {:#}", e);
                (RateSet::FALLBACK, RateOrigin::Fallback)
            }
        }
    }
}
