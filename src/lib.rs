//! rendafixa - Brazilian fixed-income yield simulator
//!
//! Simulates what a principal earns over a term in LCI/LCA, CDB, savings and
//! Tesouro Selic, using the current CDI and SELIC rates from the Banco
//! Central (or a static fallback when they cannot be fetched).

pub mod config;
pub mod error;
pub mod rates;
pub mod session;
pub mod simulation;
pub mod utils;

pub use error::SimulatorError;
pub use rates::{RateProvider, RateSet};
pub use session::Session;
pub use simulation::{BenchmarkMode, SimulationInput, SimulationResult, YieldCalculator};
