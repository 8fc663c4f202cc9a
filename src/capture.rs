#![deny(unsafe_code)]

use crate::state::MeasurementState;

/// Width of the echo pulse from the two capture registers.
///
/// In PWM input mode the counter is reset on the falling edge that ends the
/// previous pulse, `capture2` latches the rising edge and `capture1` the
/// falling edge of the current one. The difference wraps if the counter
/// overflowed inside one echo; such a width is wrong and is not detected.
pub fn pulse_width(capture1: u32, capture2: u32) -> u32 {
    capture1.wrapping_sub(capture2)
}

/// Interrupt side of the echo capture.
pub struct EchoCapture<'s> {
    state: &'s MeasurementState,
}

impl<'s> EchoCapture<'s> {
    pub(crate) fn new(state: &'s MeasurementState) -> Self {
        EchoCapture { state }
    }

    // Call from the capture interrupt with both capture register values.
    pub fn capture(&mut self, capture1: u32, capture2: u32) {
        self.state.record_echo(pulse_width(capture1, capture2));
    }
}

/// Timer running the dual-edge echo capture.
pub trait CaptureTimer {
    fn reset_counter(&mut self);
    fn start(&mut self);
    fn stop(&mut self);
}
