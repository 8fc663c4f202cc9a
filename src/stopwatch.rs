#![deny(unsafe_code)]

use fugit::MicrosDurationU32;

use crate::state::MeasurementState;

/// Interrupt side of the elapsed-time counter.
///
/// Call [`Accumulator::tick`] from the periodic timer interrupt.
pub struct Accumulator<'s> {
    state: &'s MeasurementState,
    period_us: u32,
}

impl<'s> Accumulator<'s> {
    pub(crate) fn new(state: &'s MeasurementState, period: MicrosDurationU32) -> Self {
        Accumulator {
            state,
            period_us: period.ticks(),
        }
    }

    pub fn tick(&mut self) {
        self.state.add_elapsed(self.period_us);
    }

    pub fn period(&self) -> MicrosDurationU32 {
        MicrosDurationU32::from_ticks(self.period_us)
    }
}

/// Periodic timer driving the [`Accumulator`].
pub trait TickTimer {
    /// Restart the timer from a full period and unmask its interrupt.
    fn start(&mut self);

    /// Stop the timer. No tick may be delivered after this returns.
    fn stop(&mut self);

    /// Called on every iteration of a busy wait.
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    Expired,
}

/// Relative time measurement on top of the accumulator.
///
/// One stopwatch serves the trigger pulse, the echo timeout and the quiet
/// period, each with its own threshold.
pub struct Stopwatch<'s, T> {
    state: &'s MeasurementState,
    timer: T,
}

impl<'s, T: TickTimer> Stopwatch<'s, T> {
    pub fn new(state: &'s MeasurementState, timer: T) -> Self {
        Stopwatch { state, timer }
    }

    pub fn reset(&mut self) {
        self.state.reset_elapsed();
    }

    pub fn start(&mut self) {
        self.timer.start();
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }

    pub fn elapsed(&self) -> MicrosDurationU32 {
        MicrosDurationU32::from_ticks(self.state.elapsed_us())
    }

    /// Spin for at least `duration`, at most one tick longer.
    pub fn wait(&mut self, duration: MicrosDurationU32) {
        self.reset();
        self.start();

        while self.elapsed() < duration {
            self.timer.relax();
        }

        self.stop();
    }

    /// Spin until `ready` returns true or `limit` elapses, whichever is seen
    /// first. `ready` is checked before the limit on every poll.
    pub fn wait_for<F>(&mut self, limit: MicrosDurationU32, mut ready: F) -> WaitOutcome
    where
        F: FnMut() -> bool,
    {
        self.reset();
        self.start();

        let outcome = loop {
            if ready() {
                break WaitOutcome::Ready;
            }
            if self.elapsed() >= limit {
                break WaitOutcome::Expired;
            }
            self.timer.relax();
        };

        self.stop();
        outcome
    }

    pub fn release(self) -> T {
        self.timer
    }
}
