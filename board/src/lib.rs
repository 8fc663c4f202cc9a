#![no_std]
#![deny(unsafe_code)]

use stm32f1xx_hal::gpio::{Floating, Input, Output, PushPull};
use stm32f1xx_hal::gpio::{PA0, PB0, PB12, PB13, PB6, PB7, PB8, PB9};

// Must be TIM2_CH1: both capture channels of TIM2 are taken by PWM input.
pub type Echo = PA0<Input<Floating>>;
pub type Trigger = PB0<Output<PushPull>>;

pub type MuxSelectA = PB12<Output<PushPull>>;
pub type MuxSelectB = PB13<Output<PushPull>>;

pub type LedGreen = PB6<Output<PushPull>>;
pub type LedOrange = PB7<Output<PushPull>>;
pub type LedRed = PB8<Output<PushPull>>;
pub type LedBlue = PB9<Output<PushPull>>;
