#![deny(unsafe_code)]

use crate::error::Error;

use core::cell::RefCell;
use critical_section::Mutex;
use hcsr04_mux::{Accumulator, TickTimer};
use stm32f1xx_hal::pac::{self, interrupt};
use stm32f1xx_hal::rcc::Clocks;

pub const HZ_PER_MHZ: u32 = 1_000_000;

struct TickSource {
    tim: pac::TIM3,
    accumulator: Accumulator<'static>,
}

// Shared between the foreground Ticker and the TIM3 handler.
static TICK: Mutex<RefCell<Option<TickSource>>> = Mutex::new(RefCell::new(None));

// Prescaler that makes an APB1 timer count at 1 MHz.
pub fn prescaler_1mhz(clocks: &Clocks) -> Result<u16, Error> {
    let timer_mhz = clocks.pclk1_tim().raw() / HZ_PER_MHZ;

    Ok(u16::try_from(timer_mhz.saturating_sub(1))?)
}

fn with_source<F>(f: F)
where
    F: FnOnce(&mut TickSource),
{
    critical_section::with(|cs| {
        if let Some(source) = TICK.borrow_ref_mut(cs).as_mut() {
            f(source);
        }
    });
}

// SR flags are rc_w0. Writing 1 leaves a flag alone, so no flag set
// between a read and a write can be lost.
fn clear_update_flag(tim: &pac::TIM3) {
    tim.sr.write(|w| {
        w.cc1if().set_bit();
        w.cc2if().set_bit();
        w.cc3if().set_bit();
        w.cc4if().set_bit();
        w.tif().set_bit();
        w.cc1of().set_bit();
        w.cc2of().set_bit();
        w.cc3of().set_bit();
        w.cc4of().set_bit();
        w.uif().clear_bit()
    });
}

/// TIM3 as the elapsed-time accumulator clock.
pub struct Ticker {
    _private: (),
}

impl Ticker {
    // Count at 1 MHz and overflow once per accumulator period.
    pub fn new(
        tim: pac::TIM3,
        clocks: &Clocks,
        accumulator: Accumulator<'static>,
    ) -> Result<Self, Error> {
        let period_us = accumulator.period().ticks();
        let psc = prescaler_1mhz(clocks)?;
        let arr = u16::try_from(period_us.saturating_sub(1))?;

        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.psc.write(|w| w.psc().bits(psc));
        tim.arr.write(|w| w.arr().bits(arr));
        // Load PSC now instead of at the first overflow.
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.reset();
        tim.dier.modify(|_, w| w.uie().set_bit());

        critical_section::with(|cs| {
            TICK.borrow(cs)
                .replace(Some(TickSource { tim, accumulator }));
        });

        Ok(Ticker { _private: () })
    }
}

impl TickTimer for Ticker {
    fn start(&mut self) {
        with_source(|source| {
            source.tim.cnt.reset();
            clear_update_flag(&source.tim);
            source.tim.cr1.modify(|_, w| w.cen().set_bit());
        });
    }

    fn stop(&mut self) {
        with_source(|source| {
            source.tim.cr1.modify(|_, w| w.cen().clear_bit());
            // A pending update must not reach the next wait.
            clear_update_flag(&source.tim);
        });
    }
}

#[interrupt]
fn TIM3() {
    with_source(|source| {
        if source.tim.sr.read().uif().bit_is_set() {
            clear_update_flag(&source.tim);
            source.accumulator.tick();
        }
    });
}
