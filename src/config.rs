#![deny(unsafe_code)]

use core::fmt::{Display, Formatter};

use fugit::MicrosDurationU32;
use num::rational::Ratio;
use num::Zero;

/// Period of the elapsed-time accumulator interrupt.
pub const TICK: MicrosDurationU32 = MicrosDurationU32::micros(10);
/// High time of the trigger pulse.
pub const TRIGGER_WIDTH: MicrosDurationU32 = MicrosDurationU32::micros(10);
/// 9 ms bounds the range to about 1.5 m.
pub const TIMEOUT: MicrosDurationU32 = MicrosDurationU32::micros(9000);
/// Dead time the sensor needs between two measurements (datasheet).
pub const QUIET_PERIOD: MicrosDurationU32 = MicrosDurationU32::millis(60);
/// Round trip time of flight to centimeters, 1/58.
pub const CM_PER_US: f32 = 0.01724;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigError {
    ZeroTick,
    TriggerShorterThanTick,
    TimeoutShorterThanTick,
    QuietPeriodShorterThanTick,
    ZeroCaptureTick,
    InvalidScale,
    CycleTooLong,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.pad(match *self {
            ConfigError::ZeroTick => "tick period is zero",
            ConfigError::TriggerShorterThanTick => "trigger width is shorter than one tick",
            ConfigError::TimeoutShorterThanTick => "timeout is shorter than one tick",
            ConfigError::QuietPeriodShorterThanTick => "quiet period is shorter than one tick",
            ConfigError::ZeroCaptureTick => "capture tick is zero",
            ConfigError::InvalidScale => "distance scale must be positive",
            ConfigError::CycleTooLong => "measurement cycle does not fit in u32 microseconds",
        })
    }
}

/// Timing of one measurement cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Period of the accumulator interrupt. All timed waits resolve to it.
    pub tick: MicrosDurationU32,
    pub trigger_width: MicrosDurationU32,
    pub timeout: MicrosDurationU32,
    pub quiet_period: MicrosDurationU32,
    /// Microseconds per capture timer tick.
    pub capture_tick: Ratio<u32>,
    /// Centimeters per microsecond of echo pulse.
    pub cm_per_us: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tick: TICK,
            trigger_width: TRIGGER_WIDTH,
            timeout: TIMEOUT,
            quiet_period: QUIET_PERIOD,
            capture_tick: Ratio::from_integer(1),
            cm_per_us: CM_PER_US,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick.ticks() == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.trigger_width < self.tick {
            return Err(ConfigError::TriggerShorterThanTick);
        }
        if self.timeout < self.tick {
            return Err(ConfigError::TimeoutShorterThanTick);
        }
        if self.quiet_period < self.tick {
            return Err(ConfigError::QuietPeriodShorterThanTick);
        }
        if self.capture_tick.is_zero() {
            return Err(ConfigError::ZeroCaptureTick);
        }
        if !self.cm_per_us.is_finite() || self.cm_per_us <= 0.0 {
            return Err(ConfigError::InvalidScale);
        }
        if self.checked_cycle_us().is_none() {
            return Err(ConfigError::CycleTooLong);
        }

        Ok(())
    }

    /// Upper bound on how long one measurement blocks the caller.
    ///
    /// Each of the three timed waits can overshoot its threshold by at most
    /// one tick. Saturates at `u32::MAX` microseconds for a configuration
    /// that [`Config::validate`] rejects.
    pub fn worst_case_cycle(&self) -> MicrosDurationU32 {
        MicrosDurationU32::from_ticks(self.checked_cycle_us().unwrap_or(u32::MAX))
    }

    fn checked_cycle_us(&self) -> Option<u32> {
        self.tick
            .ticks()
            .checked_mul(3)?
            .checked_add(self.trigger_width.ticks())?
            .checked_add(self.timeout.ticks())?
            .checked_add(self.quiet_period.ticks())
    }

    // Capture ticks to microseconds of echo high time.
    pub fn pulse_us(&self, pulse_width_ticks: u32) -> f32 {
        let us_per_tick = *self.capture_tick.numer() as f32 / *self.capture_tick.denom() as f32;

        pulse_width_ticks as f32 * us_per_tick
    }

    pub fn distance_cm(&self, pulse_width_ticks: u32) -> f32 {
        self.pulse_us(pulse_width_ticks) * self.cm_per_us
    }
}
