#![deny(unsafe_code)]

use crate::echo::EchoTimer;
use crate::error::Error;
use crate::system_time::Ticker;

use board::{Echo, LedBlue, LedGreen, LedOrange, LedRed, MuxSelectA, MuxSelectB, Trigger};
use cortex_m::peripheral::NVIC;
use hcsr04_mux::{ChannelSelector, Config, Indicators, MeasurementState};
use rtt_target::rprintln;
use stm32f1xx_hal::pac::{self, Interrupt};
use stm32f1xx_hal::prelude::*;
use stm32f1xx_hal::timer::SysDelay;

// Only the upper four bits count on this core. Lower value preempts.
const ECHO_PRIORITY: u8 = 0x10;
const TICK_PRIORITY: u8 = 0x20;

pub type Sonar = hcsr04_mux::Sonar<'static, Trigger, Ticker, EchoTimer>;
pub type Selector = ChannelSelector<MuxSelectA, MuxSelectB>;
pub type Leds = Indicators<LedGreen, LedOrange, LedRed, LedBlue>;

pub struct Board {
    pub sonar: Sonar,
    pub selector: Selector,
    pub leds: Leds,
    pub delay: SysDelay,
}

impl Board {
    pub fn new(
        cp: pac::CorePeripherals,
        dp: pac::Peripherals,
        state: &'static MeasurementState,
    ) -> Result<Self, Error> {
        let mut nvic = cp.NVIC;

        // Freeze both timers while the core is halted by the probe.
        dp.DBGMCU.cr.modify(|_, w| {
            w.dbg_tim2_stop().set_bit();
            w.dbg_tim3_stop().set_bit()
        });
        dp.RCC
            .apb1enr
            .modify(|_, w| w.tim2en().enabled().tim3en().enabled());

        // Configure the clock.
        let mut flash = dp.FLASH.constrain();
        let rcc = dp.RCC.constrain();
        let clocks = rcc
            .cfgr
            .sysclk(64.MHz())
            .pclk1(32.MHz())
            .freeze(&mut flash.acr);
        rprintln!("timer clock {} Hz", clocks.pclk1_tim().raw());

        // Acquire the GPIO peripherals.
        let mut gpioa = dp.GPIOA.split();
        let mut gpiob = dp.GPIOB.split();

        // TIM2 samples PA0 directly, the pin only has to stay an input.
        let _echo: Echo = gpioa.pa0.into_floating_input(&mut gpioa.crl);
        let trigger = gpiob.pb0.into_push_pull_output(&mut gpiob.crl);

        let select_a = gpiob.pb12.into_push_pull_output(&mut gpiob.crh);
        let select_b = gpiob.pb13.into_push_pull_output(&mut gpiob.crh);
        let selector = ChannelSelector::new(select_a, select_b);

        let green = gpiob.pb6.into_push_pull_output(&mut gpiob.crl);
        let orange = gpiob.pb7.into_push_pull_output(&mut gpiob.crl);
        let red = gpiob.pb8.into_push_pull_output(&mut gpiob.crh);
        let blue = gpiob.pb9.into_push_pull_output(&mut gpiob.crh);
        let leds = Indicators::new(green, orange, red, blue)?;

        let mut config = Config::default();
        config.validate()?;
        let (accumulator, echo) = state
            .split(config.tick)
            .ok_or(Error::AlreadyInitialized)?;

        let ticker = Ticker::new(dp.TIM3, &clocks, accumulator)?;
        let echo_timer = EchoTimer::new(dp.TIM2, &clocks, echo)?;
        config.capture_tick = echo_timer.capture_tick();
        rprintln!("capture tick {} us", config.capture_tick);

        let sonar = Sonar::new(state, trigger, ticker, echo_timer, config)?;
        unmask_timer_interrupts(&mut nvic);

        let delay = cp.SYST.delay(&clocks);

        Ok(Board {
            sonar,
            selector,
            leds,
            delay,
        })
    }
}

#[allow(unsafe_code)]
fn unmask_timer_interrupts(nvic: &mut NVIC) {
    // Both handlers only touch state behind critical sections.
    unsafe {
        nvic.set_priority(Interrupt::TIM2, ECHO_PRIORITY);
        nvic.set_priority(Interrupt::TIM3, TICK_PRIORITY);
        NVIC::unmask(Interrupt::TIM2);
        NVIC::unmask(Interrupt::TIM3);
    }
}
