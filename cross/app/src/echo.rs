#![deny(unsafe_code)]

use crate::error::Error;
use crate::system_time::{prescaler_1mhz, HZ_PER_MHZ};

use core::cell::RefCell;
use critical_section::Mutex;
use hcsr04_mux::{CaptureTimer, EchoCapture};
use num::rational::Ratio;
use stm32f1xx_hal::pac::{self, interrupt};
use stm32f1xx_hal::rcc::Clocks;

struct CaptureSource {
    tim: pac::TIM2,
    echo: EchoCapture<'static>,
}

static CAPTURE: Mutex<RefCell<Option<CaptureSource>>> = Mutex::new(RefCell::new(None));

fn with_source<F>(f: F)
where
    F: FnOnce(&mut CaptureSource),
{
    critical_section::with(|cs| {
        if let Some(source) = CAPTURE.borrow_ref_mut(cs).as_mut() {
            f(source);
        }
    });
}

// SR flags are rc_w0, write 1 to the ones that must survive.
fn clear_capture_flags(tim: &pac::TIM2) {
    tim.sr.write(|w| {
        w.uif().set_bit();
        w.cc3if().set_bit();
        w.cc4if().set_bit();
        w.tif().set_bit();
        w.cc3of().set_bit();
        w.cc4of().set_bit();
        w.cc1if().clear_bit();
        w.cc2if().clear_bit();
        w.cc1of().clear_bit();
        w.cc2of().clear_bit()
    });
}

/// TIM2 in PWM input mode on TI1 (PA0).
///
/// CCR2 latches the counter on the rising echo edge and CCR1 on the falling
/// one. The falling edge also resets the counter through the slave
/// controller, so only CCR1 - CCR2 is meaningful.
pub struct EchoTimer {
    capture_tick: Ratio<u32>,
}

impl EchoTimer {
    pub fn new(
        tim: pac::TIM2,
        clocks: &Clocks,
        echo: EchoCapture<'static>,
    ) -> Result<Self, Error> {
        let psc = prescaler_1mhz(clocks)?;
        let counter_hz = clocks.pclk1_tim().raw() / (u32::from(psc) + 1);
        let capture_tick = Ratio::new(HZ_PER_MHZ, counter_hz);

        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.psc.write(|w| w.psc().bits(psc));
        tim.arr.write(|w| w.arr().bits(u16::MAX));

        // Both channels sample TI1.
        tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti1());
        // CC1 on the falling edge, CC2 on the rising edge.
        tim.ccer.modify(|_, w| {
            w.cc1p().set_bit();
            w.cc2p().clear_bit();
            w.cc1e().set_bit();
            w.cc2e().set_bit()
        });
        tim.smcr.modify(|_, w| w.ts().ti1fp1().sms().reset_mode());

        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.reset();

        critical_section::with(|cs| {
            CAPTURE.borrow(cs).replace(Some(CaptureSource { tim, echo }));
        });

        Ok(EchoTimer { capture_tick })
    }

    /// Microseconds per capture counter tick.
    pub fn capture_tick(&self) -> Ratio<u32> {
        self.capture_tick
    }
}

impl CaptureTimer for EchoTimer {
    fn reset_counter(&mut self) {
        with_source(|source| source.tim.cnt.reset());
    }

    fn start(&mut self) {
        with_source(|source| {
            // Edges seen while disarmed belong to nobody.
            clear_capture_flags(&source.tim);
            source.tim.dier.modify(|_, w| w.cc1ie().set_bit());
            source.tim.cr1.modify(|_, w| w.cen().set_bit());
        });
    }

    fn stop(&mut self) {
        with_source(|source| {
            source.tim.cr1.modify(|_, w| w.cen().clear_bit());
            source.tim.dier.modify(|_, w| w.cc1ie().clear_bit());
        });
    }
}

#[interrupt]
fn TIM2() {
    with_source(|source| {
        if source.tim.sr.read().cc1if().bit_is_set() {
            // Reading CCR1 clears CC1IF.
            let falling = u32::from(source.tim.ccr1.read().bits());
            let rising = u32::from(source.tim.ccr2.read().bits());
            source.echo.capture(falling, rising);
        }
    });
}
