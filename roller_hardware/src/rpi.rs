//! Raspberry Pi backend: GPIO outputs with software PWM, MCP320x-style ADC on SPI.

use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use roller_traits::{FeedbackBus, OutputLine, PwmOutput};
use tracing::{debug, trace};

use crate::error::{HwError, Result};
use crate::{PinMap, SpiSettings};

pub struct RpiLine {
    pin: OutputPin,
}

impl OutputLine for RpiLine {
    fn write(&mut self, high: bool) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        trace!(pin = self.pin.pin(), high, "gpio write");
        if high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

pub struct RpiPwm {
    pin: OutputPin,
    frequency_hz: f64,
}

impl PwmOutput for RpiPwm {
    fn configure(
        &mut self,
        frequency_hz: f64,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    fn start(
        &mut self,
        duty_percent: f64,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!(
            pin = self.pin.pin(),
            frequency_hz = self.frequency_hz,
            duty_percent,
            "pwm start"
        );
        self.pin
            .set_pwm_frequency(self.frequency_hz, duty_percent / 100.0)
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(())
    }

    fn stop(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!(pin = self.pin.pin(), "pwm stop");
        self.pin
            .clear_pwm()
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        self.pin.set_low();
        Ok(())
    }
}

pub struct RpiFeedback {
    spi: Option<Spi>,
}

impl FeedbackBus for RpiFeedback {
    fn transfer(
        &mut self,
        frame: [u8; 3],
    ) -> std::result::Result<[u8; 3], Box<dyn std::error::Error + Send + Sync>> {
        let spi = self.spi.as_ref().ok_or(HwError::Released)?;
        let mut read = [0u8; 3];
        spi.transfer(&mut read, &frame)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        trace!(tx = ?frame, rx = ?read, "spi transfer");
        Ok(read)
    }

    fn release(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.spi.take().is_some() {
            debug!("spi handle released");
        }
        Ok(())
    }
}

/// Every device of the rig, opened on the local GPIO/SPI controllers.
pub struct RpiRig {
    pub brakes: [RpiLine; 4],
    pub motor_select: RpiLine,
    pub driver_select: RpiLine,
    /// Counter-rotational output.
    pub ccw: RpiPwm,
    /// Rotational output.
    pub clw: RpiPwm,
    pub feedback: RpiFeedback,
}

impl RpiRig {
    pub fn open(pins: &PinMap, spi: &SpiSettings) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let out = |pin: u8| -> Result<OutputPin> {
            Ok(gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(format!("pin {pin}: {e}")))?
                .into_output_low())
        };
        let line = |pin: u8| -> Result<RpiLine> { Ok(RpiLine { pin: out(pin)? }) };
        let pwm = |pin: u8| -> Result<RpiPwm> {
            Ok(RpiPwm {
                pin: out(pin)?,
                frequency_hz: 0.0,
            })
        };

        let rig = RpiRig {
            brakes: [
                line(pins.brakes[0])?,
                line(pins.brakes[1])?,
                line(pins.brakes[2])?,
                line(pins.brakes[3])?,
            ],
            motor_select: line(pins.motor_select)?,
            driver_select: line(pins.driver_select)?,
            ccw: pwm(pins.ccw)?,
            clw: pwm(pins.clw)?,
            feedback: RpiFeedback {
                spi: Some(open_spi(spi)?),
            },
        };
        debug!(?pins, ?spi, "rig opened");
        Ok(rig)
    }
}

fn open_spi(settings: &SpiSettings) -> Result<Spi> {
    let bus = match settings.bus {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        other => {
            return Err(HwError::Unsupported {
                what: "spi bus",
                value: u32::from(other),
            });
        }
    };
    let ss = match settings.slave_select {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        other => {
            return Err(HwError::Unsupported {
                what: "spi slave select",
                value: u32::from(other),
            });
        }
    };
    Spi::new(bus, ss, settings.clock_hz, Mode::Mode0).map_err(|e| HwError::Spi(e.to_string()))
}
