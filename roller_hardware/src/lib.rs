pub mod error;
#[cfg(feature = "hardware")]
pub mod rpi;

pub use error::HwError;
use roller_traits::{FeedbackBus, OutputLine, PwmOutput};
use std::cell::Cell;
use std::rc::Rc;

/// Physical wiring of the shared drive bus, BCM numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    /// Rotational output (drives outward).
    pub clw: u8,
    /// Counter-rotational output (drives inward).
    pub ccw: u8,
    /// Brake line per channel, indexed by channel.
    pub brakes: [u8; 4],
    pub motor_select: u8,
    pub driver_select: u8,
}

impl Default for PinMap {
    fn default() -> Self {
        // Header pins 16/18/40/37/35/33/36/38 of the reference rig.
        Self {
            clw: 23,
            ccw: 24,
            brakes: [21, 26, 19, 13],
            motor_select: 16,
            driver_select: 20,
        }
    }
}

/// SPI settings for the feedback ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiSettings {
    pub bus: u8,
    pub slave_select: u8,
    pub clock_hz: u32,
}

impl Default for SpiSettings {
    fn default() -> Self {
        Self {
            bus: 0,
            slave_select: 0,
            clock_hz: 5000,
        }
    }
}

/// Simulated output line; the level is shared with any probe taken from it.
pub struct SimulatedLine {
    name: String,
    level: Rc<Cell<bool>>,
}

impl SimulatedLine {
    pub fn new(name: impl Into<String>) -> Self {
        SimulatedLine {
            name: name.into(),
            level: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    /// Handle that observes this line's level after it has been moved elsewhere.
    pub fn probe(&self) -> Rc<Cell<bool>> {
        self.level.clone()
    }
}

impl OutputLine for SimulatedLine {
    fn write(&mut self, high: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::trace!(line = %self.name, high, "sim line write");
        self.level.set(high);
        Ok(())
    }
}

/// Simulated PWM output.
pub struct SimulatedPwm {
    name: String,
    frequency_hz: Cell<f64>,
    duty: Rc<Cell<Option<f64>>>,
}

impl SimulatedPwm {
    pub fn new(name: impl Into<String>) -> Self {
        SimulatedPwm {
            name: name.into(),
            frequency_hz: Cell::new(0.0),
            duty: Rc::new(Cell::new(None)),
        }
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz.get()
    }

    pub fn is_running(&self) -> bool {
        self.duty.get().is_some()
    }

    /// Handle observing the running duty cycle (`None` when stopped).
    pub fn probe(&self) -> Rc<Cell<Option<f64>>> {
        self.duty.clone()
    }
}

impl PwmOutput for SimulatedPwm {
    fn configure(
        &mut self,
        frequency_hz: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.frequency_hz.set(frequency_hz);
        Ok(())
    }
    fn start(&mut self, duty_percent: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(
            output = %self.name,
            frequency_hz = self.frequency_hz.get(),
            duty_percent,
            "sim pwm start"
        );
        self.duty.set(Some(duty_percent));
        Ok(())
    }
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(output = %self.name, "sim pwm stop");
        self.duty.set(None);
        Ok(())
    }
}

/// Simulated potentiometer ADC answering the 3-byte single-ended read frame.
pub struct SimulatedFeedback {
    raw: [u16; 4],
    released: bool,
}

impl SimulatedFeedback {
    pub fn new(raw: [u16; 4]) -> Self {
        SimulatedFeedback {
            raw,
            released: false,
        }
    }

    pub fn set_raw(&mut self, channel: usize, value: u16) {
        if let Some(slot) = self.raw.get_mut(channel) {
            *slot = value;
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Default for SimulatedFeedback {
    fn default() -> Self {
        Self::new([2048; 4])
    }
}

impl FeedbackBus for SimulatedFeedback {
    fn transfer(
        &mut self,
        frame: [u8; 3],
    ) -> Result<[u8; 3], Box<dyn std::error::Error + Send + Sync>> {
        if self.released {
            return Err(Box::new(HwError::Released));
        }
        if frame[0] != 0x06 || frame[2] != 0x00 {
            return Err(Box::new(HwError::Spi(format!(
                "unexpected frame {frame:02x?}"
            ))));
        }
        let channel = match frame[1] {
            0x00 => 0,
            0x40 => 1,
            0x80 => 2,
            0xC0 => 3,
            other => {
                return Err(Box::new(HwError::Spi(format!(
                    "unexpected channel select byte {other:#04x}"
                ))));
            }
        };
        let [hi, lo] = self.raw[channel].to_be_bytes();
        tracing::trace!(channel, raw = self.raw[channel], "sim feedback read");
        Ok([0x00, hi, lo])
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.released = true;
        Ok(())
    }
}

/// Complete simulated rig: every line of `PinMap` plus the feedback ADC.
pub struct SimulatedRig {
    pub brakes: [SimulatedLine; 4],
    pub motor_select: SimulatedLine,
    pub driver_select: SimulatedLine,
    /// Counter-rotational output.
    pub ccw: SimulatedPwm,
    /// Rotational output.
    pub clw: SimulatedPwm,
    pub feedback: SimulatedFeedback,
}

impl SimulatedRig {
    pub fn new(raw: [u16; 4]) -> Self {
        SimulatedRig {
            brakes: [
                SimulatedLine::new("brake0"),
                SimulatedLine::new("brake1"),
                SimulatedLine::new("brake2"),
                SimulatedLine::new("brake3"),
            ],
            motor_select: SimulatedLine::new("motor_select"),
            driver_select: SimulatedLine::new("driver_select"),
            ccw: SimulatedPwm::new("ccw"),
            clw: SimulatedPwm::new("clw"),
            feedback: SimulatedFeedback::new(raw),
        }
    }
}

impl Default for SimulatedRig {
    fn default() -> Self {
        Self::new([2048; 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x00, 0)]
    #[case(0x40, 1)]
    #[case(0x80, 2)]
    #[case(0xC0, 3)]
    fn feedback_answers_each_channel(#[case] sel: u8, #[case] channel: usize) {
        let mut fb = SimulatedFeedback::new([0x0102, 0x0304, 0x0506, 0x0708]);
        let resp = fb.transfer([0x06, sel, 0x00]).unwrap();
        let expected = [0x0102u16, 0x0304, 0x0506, 0x0708][channel].to_be_bytes();
        assert_eq!(resp, [0x00, expected[0], expected[1]]);
    }

    #[test]
    fn feedback_rejects_unknown_select_byte() {
        let mut fb = SimulatedFeedback::default();
        assert!(fb.transfer([0x06, 0x20, 0x00]).is_err());
    }

    #[test]
    fn released_feedback_refuses_transfers() {
        let mut fb = SimulatedFeedback::default();
        fb.release().unwrap();
        assert!(fb.is_released());
        let err = fb.transfer([0x06, 0x00, 0x00]).unwrap_err();
        assert!(err.to_string().contains("released"));
    }

    #[test]
    fn line_probe_tracks_level() {
        let mut line = SimulatedLine::new("brake0");
        let probe = line.probe();
        line.set_high().unwrap();
        assert!(probe.get());
        line.set_low().unwrap();
        assert!(!line.is_high());
    }

    #[test]
    fn pwm_start_stop() {
        let mut pwm = SimulatedPwm::new("clw");
        pwm.configure(500.0).unwrap();
        pwm.start(50.0).unwrap();
        assert!(pwm.is_running());
        assert_eq!(pwm.frequency_hz(), 500.0);
        pwm.stop().unwrap();
        assert!(!pwm.is_running());
    }
}
