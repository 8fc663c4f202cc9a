#![deny(unsafe_code)]

use core::fmt::{Display, Formatter};

use embedded_hal::digital::v2::OutputPin;

use crate::capture::CaptureTimer;
use crate::config::Config;
use crate::error::Error;
use crate::state::MeasurementState;
use crate::stopwatch::{Stopwatch, TickTimer, WaitOutcome};
use crate::trigger;

/// Returned by [`Sonar::measure_distance_cm`] when no echo arrived in time.
pub const NO_ECHO_CM: f32 = -1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reading {
    Distance(f32),
    Timeout,
}

impl Reading {
    /// Only a positive distance counts. A zero width capture is not a
    /// reading.
    pub fn is_valid(&self) -> bool {
        matches!(*self, Reading::Distance(cm) if cm > 0.0)
    }

    // Distance in cm, or NO_ECHO_CM.
    pub fn centimeters(&self) -> f32 {
        match *self {
            Reading::Distance(cm) => cm,
            Reading::Timeout => NO_ECHO_CM,
        }
    }
}

impl Display for Reading {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match *self {
            Reading::Distance(cm) => write!(f, "{:.1} cm", cm),
            Reading::Timeout => f.pad("no echo"),
        }
    }
}

/// HC-SR04 ranging cycle controller.
///
/// Measures on whichever sensor the multiplexer currently routes. Not
/// reentrant: drive it from the foreground loop only.
pub struct Sonar<'s, TRIG, TICK, CAP> {
    state: &'s MeasurementState,
    trigger: TRIG,
    stopwatch: Stopwatch<'s, TICK>,
    capture: CAP,
    config: Config,
}

impl<'s, TRIG, TICK, CAP> Sonar<'s, TRIG, TICK, CAP>
where
    TRIG: OutputPin,
    TICK: TickTimer,
    CAP: CaptureTimer,
{
    pub fn new(
        state: &'s MeasurementState,
        trigger: TRIG,
        tick_timer: TICK,
        capture: CAP,
        config: Config,
    ) -> Result<Self, Error<TRIG::Error>> {
        config.validate()?;

        let mut sonar = Sonar {
            state,
            trigger,
            stopwatch: Stopwatch::new(state, tick_timer),
            capture,
            config,
        };
        sonar.init()?;

        Ok(sonar)
    }

    /// Stop both timers, drive the trigger low and zero the shared state.
    /// Safe to call any number of times between measurements.
    pub fn init(&mut self) -> Result<(), Error<TRIG::Error>> {
        self.stopwatch.stop();
        self.capture.stop();
        self.trigger.set_low().map_err(Error::Pin)?;
        self.state.reset();

        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one full ranging cycle.
    ///
    /// Blocks for at most [`Config::worst_case_cycle`], and never returns
    /// before the quiet period has passed, whatever the outcome.
    pub fn measure(&mut self) -> Result<Reading, Error<TRIG::Error>> {
        // Arm. Clear the counter before the timer runs so that no event
        // from an earlier cycle can be mistaken for this one.
        self.capture.reset_counter();
        self.state.reset_echo();
        self.capture.start();

        if let Err(error) = trigger::pulse(
            &mut self.trigger,
            &mut self.stopwatch,
            self.config.trigger_width,
        ) {
            self.stopwatch.stop();
            self.capture.stop();
            return Err(Error::Pin(error));
        }

        let state = self.state;
        let outcome = self
            .stopwatch
            .wait_for(self.config.timeout, || state.echo_event_count() != 0);
        self.capture.stop();

        // Both timers are stopped, the width can not change under us.
        let reading = match outcome {
            WaitOutcome::Ready => {
                Reading::Distance(self.config.distance_cm(state.pulse_width_ticks()))
            }
            WaitOutcome::Expired => Reading::Timeout,
        };

        self.stopwatch.wait(self.config.quiet_period);

        Ok(reading)
    }

    /// Distance in centimeters, or [`NO_ECHO_CM`] on timeout.
    pub fn measure_distance_cm(&mut self) -> Result<f32, Error<TRIG::Error>> {
        Ok(self.measure()?.centimeters())
    }

    pub fn release(self) -> (TRIG, TICK, CAP) {
        (self.trigger, self.stopwatch.release(), self.capture)
    }
}
