#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Presence detection core (hardware-agnostic).
//!
//! All hardware interaction goes through the `sonar_traits` line and clock
//! traits, so everything here runs against simulated echoes and a manual clock.
//!
//! ## Architecture
//!
//! - **Sampling**: five pings per cycle, averaged into a `Distance` (`sampler`)
//! - **Detection**: two-threshold hysteresis over an explicit `PresenceState` (`detector`)
//! - **Loop**: `Monitor` ties both to the alert output at a fixed cadence (`runner`)
//! - **Configuration**: operating constants and the averaging policy (`config`)
//!
//! A cycle with no echo at all yields `Distance::NONE`, which the detector
//! treats as "nothing in range". That is the only degradation path; nothing in
//! the loop returns an error.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod detector;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod units;

pub use builder::MonitorBuilder;
pub use config::{Averaging, RunnerCfg, SamplerCfg, Thresholds};
pub use detector::{PresenceDetector, PresenceState, Transition};
pub use error::BuildError;
pub use runner::{CycleReport, Monitor, RunSummary};
pub use sampler::{RangeReading, RangeSampler};
pub use units::Distance;
