//! Multiplexed HC-SR04 ultrasonic ranging.
//!
//! A periodic tick interrupt feeds an [`Accumulator`] that the foreground
//! busy-waits on, and a PWM-input capture interrupt feeds an [`EchoCapture`]
//! with the width of the echo pulse. [`Sonar`] ties both together into one
//! blocking measurement cycle: trigger, wait for echo or timeout, quiet
//! period. Both interrupt handlers and the controller share one
//! [`MeasurementState`].
//!
//! The hardware is reached through `embedded-hal` output pins and the
//! [`TickTimer`] / [`CaptureTimer`] traits, so the whole cycle runs on the
//! host in tests.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
mod error;
pub mod indicator;
pub mod mux;
pub mod ranging;
mod state;
pub mod stopwatch;
pub mod trigger;

#[cfg(test)]
mod mock;

pub use crate::capture::{CaptureTimer, EchoCapture};
pub use crate::config::{Config, ConfigError};
pub use crate::error::Error;
pub use crate::indicator::{Indicators, Led};
pub use crate::mux::{Channel, ChannelSelector};
pub use crate::ranging::{Reading, Sonar, NO_ECHO_CM};
pub use crate::state::MeasurementState;
pub use crate::stopwatch::{Accumulator, Stopwatch, TickTimer, WaitOutcome};
