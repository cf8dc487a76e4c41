//! Test and helper mocks for roller_core.
//!
//! Spy devices append to a shared `EventLog`, so a test can assert on the
//! exact order of line writes, PWM calls and feedback transfers after the
//! devices have been moved into a `HardwareContext`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use roller_traits::{FeedbackBus, OutputLine, PwmOutput};

use crate::hardware::{DriveLines, HardwareContext};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Line { name: &'static str, high: bool },
    PwmConfigure { name: &'static str, hz: f64 },
    PwmStart { name: &'static str, duty: f64 },
    PwmStop { name: &'static str },
    Transfer([u8; 3]),
    Release,
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<Event>>>,
    fail_on: Rc<Cell<Option<&'static str>>>,
}

impl EventLog {
    fn push(&self, e: Event) {
        self.events.borrow_mut().push(e);
    }

    fn check(&self, name: &'static str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_on.get() == Some(name) {
            return Err(Box::new(std::io::Error::other(format!("{name} failed"))));
        }
        Ok(())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Everything except feedback transfers.
    pub fn drive_events(&self) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| !matches!(e, Event::Transfer(_)))
            .cloned()
            .collect()
    }

    pub fn transfers(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Transfer(_)))
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Make the device called `name` fail from now on ("feedback" for the bus).
    pub fn fail_on(&self, name: &'static str) {
        self.fail_on.set(Some(name));
    }
}

pub struct SpyLine {
    name: &'static str,
    log: EventLog,
}

impl OutputLine for SpyLine {
    fn write(&mut self, high: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.check(self.name)?;
        self.log.push(Event::Line {
            name: self.name,
            high,
        });
        Ok(())
    }
}

pub struct SpyPwm {
    name: &'static str,
    log: EventLog,
}

impl PwmOutput for SpyPwm {
    fn configure(
        &mut self,
        frequency_hz: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.check(self.name)?;
        self.log.push(Event::PwmConfigure {
            name: self.name,
            hz: frequency_hz,
        });
        Ok(())
    }
    fn start(&mut self, duty_percent: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.check(self.name)?;
        self.log.push(Event::PwmStart {
            name: self.name,
            duty: duty_percent,
        });
        Ok(())
    }
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.check(self.name)?;
        self.log.push(Event::PwmStop { name: self.name });
        Ok(())
    }
}

/// Feedback bus answering each channel with a fixed composed value.
pub struct ScriptedFeedback {
    raw: Rc<Cell<[u16; 4]>>,
    log: EventLog,
}

impl ScriptedFeedback {
    /// Handle for changing readings after the bus is moved into a context.
    pub fn positions(&self) -> Rc<Cell<[u16; 4]>> {
        self.raw.clone()
    }
}

impl FeedbackBus for ScriptedFeedback {
    fn transfer(
        &mut self,
        frame: [u8; 3],
    ) -> Result<[u8; 3], Box<dyn std::error::Error + Send + Sync>> {
        self.log.check("feedback")?;
        self.log.push(Event::Transfer(frame));
        let channel = usize::from(frame[1] >> 6);
        let [hi, lo] = self.raw.get()[channel].to_be_bytes();
        Ok([0x00, hi, lo])
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.push(Event::Release);
        Ok(())
    }
}

pub type SpyHardware = HardwareContext<SpyLine, SpyPwm, ScriptedFeedback>;

/// Spy rig answering `raw` on the feedback bus.
///
/// Returns the context, its event log, and a handle to the simulated positions.
pub fn spy_hardware(raw: [u16; 4]) -> (SpyHardware, EventLog, Rc<Cell<[u16; 4]>>) {
    let log = EventLog::default();
    let line = |name| SpyLine {
        name,
        log: log.clone(),
    };
    let lines = DriveLines {
        brakes: [line("brake0"), line("brake1"), line("brake2"), line("brake3")],
        motor_select: line("motor_select"),
        driver_select: line("driver_select"),
    };
    let inward = SpyPwm {
        name: "inward",
        log: log.clone(),
    };
    let outward = SpyPwm {
        name: "outward",
        log: log.clone(),
    };
    let feedback = ScriptedFeedback {
        raw: Rc::new(Cell::new(raw)),
        log: log.clone(),
    };
    let positions = feedback.positions();
    (
        HardwareContext::new(lines, inward, outward, feedback),
        log,
        positions,
    )
}
