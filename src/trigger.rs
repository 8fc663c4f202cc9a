#![deny(unsafe_code)]

use embedded_hal::digital::v2::OutputPin;
use fugit::MicrosDurationU32;

use crate::stopwatch::{Stopwatch, TickTimer};

/// Drive `pin` high for `width`, timed by the accumulator.
///
/// The stopwatch is re-armed before the wait and its timer is stopped
/// before the pin goes low again.
pub fn pulse<P, T>(
    pin: &mut P,
    stopwatch: &mut Stopwatch<'_, T>,
    width: MicrosDurationU32,
) -> Result<(), P::Error>
where
    P: OutputPin,
    T: TickTimer,
{
    pin.set_high()?;
    stopwatch.wait(width);
    pin.set_low()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Level, SimBus, SimTicker, TestPin};
    use crate::state::MeasurementState;

    #[test]
    fn test_pulse_width() {
        let state = MeasurementState::new();
        let bus = SimBus::new(&state, MicrosDurationU32::micros(10));
        let mut pin = TestPin::trigger(&bus);
        let mut stopwatch = Stopwatch::new(&state, SimTicker::new(&bus));

        pulse(&mut pin, &mut stopwatch, MicrosDurationU32::micros(10)).unwrap();

        assert_eq!(pin.level(), Level::Low);
        assert_eq!(bus.trigger_edges(), [(Level::High, 0), (Level::Low, 10)]);
        assert!(!bus.ticker_running());
    }

    #[test]
    fn test_pulse_ignores_stale_time() {
        let state = MeasurementState::new();
        let bus = SimBus::new(&state, MicrosDurationU32::micros(10));
        let mut pin = TestPin::trigger(&bus);
        let mut stopwatch = Stopwatch::new(&state, SimTicker::new(&bus));

        bus.advance(MicrosDurationU32::micros(500));
        pulse(&mut pin, &mut stopwatch, MicrosDurationU32::micros(20)).unwrap();

        assert_eq!(state.elapsed_us(), 20);
        assert_eq!(bus.trigger_edges(), [(Level::High, 500), (Level::Low, 520)]);
    }

    #[test]
    fn test_pin_error() {
        let state = MeasurementState::new();
        let bus = SimBus::new(&state, MicrosDurationU32::micros(10));
        let mut pin = TestPin::broken();
        let mut stopwatch = Stopwatch::new(&state, SimTicker::new(&bus));

        assert!(pulse(&mut pin, &mut stopwatch, MicrosDurationU32::micros(10)).is_err());
        assert_eq!(bus.now(), 0);
    }
}
