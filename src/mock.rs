// Simulated hardware for host tests. Interrupts fire synchronously from
// the busy-wait relax hook, so simulated time only moves while the
// foreground is spinning on a running tick timer.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::v2::OutputPin;
use fugit::MicrosDurationU32;

use crate::capture::{CaptureTimer, EchoCapture};
use crate::state::MeasurementState;
use crate::stopwatch::{Accumulator, TickTimer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinFault;

#[derive(Clone, Copy, Debug)]
struct EchoPlan {
    delay_us: u32,
    width_ticks: u32,
}

struct Sim<'s> {
    accumulator: Accumulator<'s>,
    echo: EchoCapture<'s>,
    tick_us: u32,
    now_us: u32,
    ticker_running: bool,
    ticker_starts: u32,
    capture_running: bool,
    capture_resets: u32,
    trigger_edges: Vec<(Level, u32)>,
    last_fall_us: Option<u32>,
    echo_plan: Option<EchoPlan>,
    echoes_delivered: u32,
}

impl<'s> Sim<'s> {
    fn tick(&mut self) {
        self.now_us += self.tick_us;
        self.accumulator.tick();

        if let (Some(plan), Some(fall)) = (self.echo_plan, self.last_fall_us) {
            if self.capture_running && self.now_us >= fall + plan.delay_us {
                // Counter value at the rising edge is arbitrary.
                self.echo.capture(250 + plan.width_ticks, 250);
                self.echo_plan = None;
                self.echoes_delivered += 1;
            }
        }
    }
}

pub struct SimBus<'s> {
    sim: RefCell<Sim<'s>>,
}

impl<'s> SimBus<'s> {
    pub fn new(state: &'s MeasurementState, tick: MicrosDurationU32) -> Self {
        let (accumulator, echo) = state.split(tick).unwrap();

        SimBus {
            sim: RefCell::new(Sim {
                accumulator,
                echo,
                tick_us: tick.ticks(),
                now_us: 0,
                ticker_running: false,
                ticker_starts: 0,
                capture_running: false,
                capture_resets: 0,
                trigger_edges: Vec::new(),
                last_fall_us: None,
                echo_plan: None,
                echoes_delivered: 0,
            }),
        }
    }

    // Echo ends `delay` after the next falling trigger edge.
    pub fn schedule_echo(&self, delay: MicrosDurationU32, width_ticks: u32) {
        self.sim.borrow_mut().echo_plan = Some(EchoPlan {
            delay_us: delay.ticks(),
            width_ticks,
        });
    }

    // Fire the capture interrupt right now, armed or not.
    pub fn inject_echo(&self, width_ticks: u32) {
        self.sim.borrow_mut().echo.capture(width_ticks, 0);
    }

    // Fire ticks as if the timer had been running for `duration`.
    pub fn advance(&self, duration: MicrosDurationU32) {
        let mut sim = self.sim.borrow_mut();
        let ticks = duration.ticks() / sim.tick_us;
        for _ in 0..ticks {
            sim.tick();
        }
    }

    pub fn now(&self) -> u32 {
        self.sim.borrow().now_us
    }

    pub fn trigger_edges(&self) -> Vec<(Level, u32)> {
        self.sim.borrow().trigger_edges.clone()
    }

    pub fn ticker_running(&self) -> bool {
        self.sim.borrow().ticker_running
    }

    pub fn ticker_starts(&self) -> u32 {
        self.sim.borrow().ticker_starts
    }

    pub fn capture_running(&self) -> bool {
        self.sim.borrow().capture_running
    }

    pub fn capture_resets(&self) -> u32 {
        self.sim.borrow().capture_resets
    }

    pub fn echoes_delivered(&self) -> u32 {
        self.sim.borrow().echoes_delivered
    }

    fn relax(&self) {
        let mut sim = self.sim.borrow_mut();
        if sim.ticker_running {
            sim.tick();
        }
    }

    fn trigger_edge(&self, level: Level) {
        let mut sim = self.sim.borrow_mut();
        let now = sim.now_us;
        let was_high = matches!(sim.trigger_edges.last(), Some((Level::High, _)));

        match level {
            Level::High => sim.last_fall_us = None,
            Level::Low if was_high => sim.last_fall_us = Some(now),
            Level::Low => {}
        }
        sim.trigger_edges.push((level, now));
    }
}

#[derive(Clone)]
pub struct TestPin<'b, 's> {
    level: Rc<Cell<Level>>,
    writes: Rc<Cell<u32>>,
    bus: Option<&'b SimBus<'s>>,
    broken: bool,
}

impl<'b, 's> TestPin<'b, 's> {
    pub fn new() -> Self {
        TestPin {
            level: Rc::new(Cell::new(Level::Low)),
            writes: Rc::new(Cell::new(0)),
            bus: None,
            broken: false,
        }
    }

    pub fn broken() -> Self {
        TestPin {
            broken: true,
            ..Self::new()
        }
    }

    pub fn trigger(bus: &'b SimBus<'s>) -> Self {
        TestPin {
            bus: Some(bus),
            ..Self::new()
        }
    }

    pub fn level(&self) -> Level {
        self.level.get()
    }

    pub fn is_high(&self) -> bool {
        self.level.get() == Level::High
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    fn write(&mut self, level: Level) -> Result<(), PinFault> {
        if self.broken {
            return Err(PinFault);
        }

        self.level.set(level);
        self.writes.set(self.writes.get() + 1);
        if let Some(bus) = self.bus {
            bus.trigger_edge(level);
        }

        Ok(())
    }
}

impl<'b, 's> OutputPin for TestPin<'b, 's> {
    type Error = PinFault;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(Level::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(Level::High)
    }
}

pub struct SimTicker<'b, 's> {
    bus: &'b SimBus<'s>,
}

impl<'b, 's> SimTicker<'b, 's> {
    pub fn new(bus: &'b SimBus<'s>) -> Self {
        SimTicker { bus }
    }
}

impl<'b, 's> TickTimer for SimTicker<'b, 's> {
    fn start(&mut self) {
        let mut sim = self.bus.sim.borrow_mut();
        sim.ticker_running = true;
        sim.ticker_starts += 1;
    }

    fn stop(&mut self) {
        self.bus.sim.borrow_mut().ticker_running = false;
    }

    fn relax(&mut self) {
        self.bus.relax();
    }
}

pub struct SimCapture<'b, 's> {
    bus: &'b SimBus<'s>,
}

impl<'b, 's> SimCapture<'b, 's> {
    pub fn new(bus: &'b SimBus<'s>) -> Self {
        SimCapture { bus }
    }
}

impl<'b, 's> CaptureTimer for SimCapture<'b, 's> {
    fn reset_counter(&mut self) {
        self.bus.sim.borrow_mut().capture_resets += 1;
    }

    fn start(&mut self) {
        self.bus.sim.borrow_mut().capture_running = true;
    }

    fn stop(&mut self) {
        self.bus.sim.borrow_mut().capture_running = false;
    }
}

// Pin that can never fail, like the ones on the target.
pub struct InfalliblePin(pub TestPin<'static, 'static>);

impl OutputPin for InfalliblePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low().ok();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high().ok();
        Ok(())
    }
}
