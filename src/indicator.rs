#![deny(unsafe_code)]

use embedded_hal::digital::v2::OutputPin;

use crate::ranging::Reading;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Led {
    Green,
    Orange,
    Red,
    Blue,
}

impl Led {
    pub const ALL: [Led; 4] = [Led::Green, Led::Orange, Led::Red, Led::Blue];

    /// Lit for a valid reading.
    pub const IN_RANGE: Led = Led::Blue;
    /// Lit when no echo came back.
    pub const OUT_OF_RANGE: Led = Led::Red;

    const fn slot(self) -> usize {
        self as usize
    }
}

/// The four status LEDs.
pub struct Indicators<G, O, R, B> {
    green: G,
    orange: O,
    red: R,
    blue: B,
    lit: [bool; 4],
}

impl<G, O, R, B, E> Indicators<G, O, R, B>
where
    G: OutputPin<Error = E>,
    O: OutputPin<Error = E>,
    R: OutputPin<Error = E>,
    B: OutputPin<Error = E>,
{
    pub fn new(green: G, orange: O, red: R, blue: B) -> Result<Self, E> {
        let mut indicators = Indicators {
            green,
            orange,
            red,
            blue,
            lit: [false; 4],
        };
        indicators.all_off()?;

        Ok(indicators)
    }

    pub fn set(&mut self, led: Led, on: bool) -> Result<(), E> {
        match (led, on) {
            (Led::Green, true) => self.green.set_high(),
            (Led::Green, false) => self.green.set_low(),
            (Led::Orange, true) => self.orange.set_high(),
            (Led::Orange, false) => self.orange.set_low(),
            (Led::Red, true) => self.red.set_high(),
            (Led::Red, false) => self.red.set_low(),
            (Led::Blue, true) => self.blue.set_high(),
            (Led::Blue, false) => self.blue.set_low(),
        }?;
        self.lit[led.slot()] = on;

        Ok(())
    }

    pub fn on(&mut self, led: Led) -> Result<(), E> {
        self.set(led, true)
    }

    pub fn off(&mut self, led: Led) -> Result<(), E> {
        self.set(led, false)
    }

    pub fn toggle(&mut self, led: Led) -> Result<(), E> {
        self.set(led, !self.is_on(led))
    }

    pub fn is_on(&self, led: Led) -> bool {
        self.lit[led.slot()]
    }

    pub fn all_off(&mut self) -> Result<(), E> {
        for led in Led::ALL {
            self.off(led)?;
        }

        Ok(())
    }

    /// Light exactly one LED for the outcome of a measurement. Anything
    /// but a positive distance shows as out of range.
    pub fn show(&mut self, reading: Reading) -> Result<(), E> {
        let lit = if reading.is_valid() {
            Led::IN_RANGE
        } else {
            Led::OUT_OF_RANGE
        };

        for led in Led::ALL {
            if led != lit {
                self.off(led)?;
            }
        }
        self.on(lit)
    }

    pub fn release(self) -> (G, O, R, B) {
        (self.green, self.orange, self.red, self.blue)
    }
}
