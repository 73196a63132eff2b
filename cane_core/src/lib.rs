#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core cane logic (hardware-agnostic).
//!
//! This crate provides the obstacle-risk engine and the night light. All
//! hardware interactions go through the `cane_traits` peripheral traits.
//!
//! ## Architecture
//!
//! - **Ranging**: trigger/echo time-of-flight with sentinel substitution (`range`)
//! - **Velocity**: closing speed from consecutive samples (`velocity`)
//! - **Risk**: ordered tiers from distance and speed (`risk`)
//! - **Alerts**: buzzer patterns, inline or on a worker thread (`alert`, `alert_worker`)
//! - **Night light**: LED from ambient light (`light`)
//! - **Loop**: one sense/decide/act cycle per `tick` (`control`), paced by `runner`
//!
//! ## Units
//!
//! Distances are centimetres (`f32`), closing speeds are cm/s with positive
//! meaning approaching, and timestamps are milliseconds since the loop was
//! built.

pub mod alert;
pub mod alert_worker;
pub mod builder;
pub mod config;
pub mod control;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod light;
pub mod mocks;
pub mod range;
pub mod risk;
pub mod runner;
pub mod status;
pub mod util;
pub mod velocity;

pub use alert::AlertActuator;
pub use alert_worker::AlertWorker;
pub use builder::ControlLoopBuilder;
pub use config::*;
pub use control::ControlLoop;
pub use error::{BuildError, CaneError, Report, Result};
pub use light::{LightState, NightLight};
pub use range::{DistanceSample, EchoFault, RangeSensor, SampleKind};
pub use risk::{RiskClassifier, RiskTier};
pub use runner::{LoopStats, RunParams, run};
pub use status::{Assessment, CycleOutcome, CycleReport};
pub use velocity::{VelocityEstimator, VelocityState};
