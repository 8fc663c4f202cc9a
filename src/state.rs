#![deny(unsafe_code)]

use core::cell::Cell;
use critical_section::Mutex;
use fugit::MicrosDurationU32;

use crate::capture::EchoCapture;
use crate::stopwatch::Accumulator;

/// Counters shared between the two interrupt handlers and the foreground
/// controller.
///
/// Every field has exactly one interrupt-side writer: `elapsed_us` belongs to
/// the [`Accumulator`], `echo_events` and `pulse_width_ticks` belong to the
/// [`EchoCapture`]. The foreground only reads them, or resets them while the
/// owning timer is stopped or right before it is started.
pub struct MeasurementState {
    echo_events: Mutex<Cell<u32>>,
    elapsed_us: Mutex<Cell<u32>>,
    pulse_width_ticks: Mutex<Cell<u32>>,
    split: Mutex<Cell<bool>>,
}

impl MeasurementState {
    pub const fn new() -> Self {
        Self {
            echo_events: Mutex::new(Cell::new(0)),
            elapsed_us: Mutex::new(Cell::new(0)),
            pulse_width_ticks: Mutex::new(Cell::new(0)),
            split: Mutex::new(Cell::new(false)),
        }
    }

    // Hand out the interrupt-side producers. Only the first call succeeds.
    pub fn split(&self, tick: MicrosDurationU32) -> Option<(Accumulator<'_>, EchoCapture<'_>)> {
        let already_split = critical_section::with(|cs| self.split.borrow(cs).replace(true));

        if already_split {
            None
        } else {
            Some((Accumulator::new(self, tick), EchoCapture::new(self)))
        }
    }

    pub fn echo_event_count(&self) -> u32 {
        critical_section::with(|cs| self.echo_events.borrow(cs).get())
    }

    pub fn elapsed_us(&self) -> u32 {
        critical_section::with(|cs| self.elapsed_us.borrow(cs).get())
    }

    pub fn pulse_width_ticks(&self) -> u32 {
        critical_section::with(|cs| self.pulse_width_ticks.borrow(cs).get())
    }

    pub(crate) fn add_elapsed(&self, period_us: u32) {
        critical_section::with(|cs| {
            let elapsed = self.elapsed_us.borrow(cs);
            elapsed.set(elapsed.get().saturating_add(period_us));
        });
    }

    // Width first, then the counter, so a nonzero count always comes with
    // the width of the same echo.
    pub(crate) fn record_echo(&self, pulse_width_ticks: u32) {
        critical_section::with(|cs| {
            self.pulse_width_ticks.borrow(cs).set(pulse_width_ticks);
            let events = self.echo_events.borrow(cs);
            events.set(events.get().wrapping_add(1));
        });
    }

    pub(crate) fn reset_elapsed(&self) {
        critical_section::with(|cs| self.elapsed_us.borrow(cs).set(0));
    }

    pub(crate) fn reset_echo(&self) {
        critical_section::with(|cs| self.echo_events.borrow(cs).set(0));
    }

    pub(crate) fn reset(&self) {
        critical_section::with(|cs| {
            self.echo_events.borrow(cs).set(0);
            self.elapsed_us.borrow(cs).set(0);
            self.pulse_width_ticks.borrow(cs).set(0);
        });
    }
}

impl Default for MeasurementState {
    fn default() -> Self {
        Self::new()
    }
}
