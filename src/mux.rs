#![deny(unsafe_code)]

use core::fmt::{Display, Formatter};

use embedded_hal::digital::v2::{OutputPin, PinState};

pub const CHANNEL_COUNT: u8 = 4;

/// One of the four sensors behind the multiplexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT as usize] =
        [Channel(0), Channel(1), Channel(2), Channel(3)];

    pub const fn new(index: u8) -> Option<Self> {
        if index < CHANNEL_COUNT {
            Some(Channel(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    // Wraps from the last channel to the first.
    pub const fn next(self) -> Self {
        Channel((self.0 + 1) % CHANNEL_COUNT)
    }

    /// Levels of the (A, B) select lines: A carries the high bit, B the low
    /// bit of the channel index.
    pub fn select_lines(self) -> (PinState, PinState) {
        let line_a = PinState::from(self.0 & 0b10 != 0);
        let line_b = PinState::from(self.0 & 0b01 != 0);

        (line_a, line_b)
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Drives the two multiplexer select lines.
pub struct ChannelSelector<A, B> {
    line_a: A,
    line_b: B,
    current: Option<Channel>,
}

impl<A, B, E> ChannelSelector<A, B>
where
    A: OutputPin<Error = E>,
    B: OutputPin<Error = E>,
{
    pub fn new(line_a: A, line_b: B) -> Self {
        ChannelSelector {
            line_a,
            line_b,
            current: None,
        }
    }

    // Takes effect before the next measurement. Selecting the current
    // channel again is harmless.
    pub fn select(&mut self, channel: Channel) -> Result<(), E> {
        let (line_a, line_b) = channel.select_lines();

        self.line_a.set_state(line_a)?;
        self.line_b.set_state(line_b)?;
        self.current = Some(channel);

        Ok(())
    }

    pub fn current(&self) -> Option<Channel> {
        self.current
    }

    pub fn release(self) -> (A, B) {
        (self.line_a, self.line_b)
    }
}
