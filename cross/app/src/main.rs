#![deny(unsafe_code)]
#![no_std]
#![no_main]

mod board;
mod echo;
mod error;
mod system_time;

use panic_probe as _;

use crate::board::Board;
use crate::error::Error;

use cortex_m_rt::entry;
use fugit::MicrosDurationU32;
use hcsr04_mux::{Channel, MeasurementState, Reading};
use rtt_target::rprintln;
use rtt_target::rtt_init_print;
use stm32f1xx_hal::pac;

// Pause after every channel.
const CHANNEL_PAUSE: MicrosDurationU32 = MicrosDurationU32::secs(1);

static STATE: MeasurementState = MeasurementState::new();

fn range_channel(board: &mut Board, channel: Channel) -> Result<Reading, Error> {
    board.selector.select(channel)?;
    let reading = board.sonar.measure()?;
    board.leds.show(reading)?;

    rprintln!("[{}] {}", channel, reading.centimeters() as i32);

    Ok(reading)
}

#[entry]
fn main() -> ! {
    rtt_init_print!();

    let cp = pac::CorePeripherals::take().unwrap();
    let dp = pac::Peripherals::take().unwrap();

    let mut board = Board::new(cp, dp, &STATE).unwrap();
    rprintln!(
        "worst case cycle {} us",
        board.sonar.config().worst_case_cycle().ticks()
    );

    let mut channel = Channel::ALL[0];
    loop {
        range_channel(&mut board, channel).unwrap();
        board.delay.delay(CHANNEL_PAUSE);
        channel = channel.next();
    }
}
