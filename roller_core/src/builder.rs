//! Type-state builder for `Roller`.
//!
//! `build()` is only available once hardware has been supplied;
//! `try_build()` is always available and reports the missing part instead.
//! Building drives every output low before the engine accepts a command.

use std::marker::PhantomData;

use roller_traits::{Clock, FeedbackBus, MonotonicClock, OutputLine, PwmOutput};

use crate::calibration::CalibrationTable;
use crate::config::{MotorSpeed, SamplerCfg};
use crate::dispatcher::Roller;
use crate::drive::DriveController;
use crate::error::{BuildError, Result, RollerError};
use crate::hardware::HardwareContext;
use crate::sampler::PositionSampler;

pub struct Missing;
pub struct Set;

pub struct RollerBuilder<L, P, B, C = MonotonicClock, H = Missing>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    hw: Option<HardwareContext<L, P, B>>,
    calibration: CalibrationTable,
    speed: MotorSpeed,
    sampler: SamplerCfg,
    clock: C,
    _h: PhantomData<H>,
}

impl<L, P, B> RollerBuilder<L, P, B>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    pub fn new() -> Self {
        Self {
            hw: None,
            calibration: CalibrationTable::empty(),
            speed: MotorSpeed::default(),
            sampler: SamplerCfg::default(),
            clock: MonotonicClock::new(),
            _h: PhantomData,
        }
    }
}

impl<L, P, B> Default for RollerBuilder<L, P, B>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<L, P, B, C> RollerBuilder<L, P, B, C, Missing>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    pub fn with_hardware(self, hw: HardwareContext<L, P, B>) -> RollerBuilder<L, P, B, C, Set> {
        RollerBuilder {
            hw: Some(hw),
            calibration: self.calibration,
            speed: self.speed,
            sampler: self.sampler,
            clock: self.clock,
            _h: PhantomData,
        }
    }
}

impl<L, P, B, C, H> RollerBuilder<L, P, B, C, H>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    /// Soft limits. Without this every move is permitted.
    pub fn with_calibration(mut self, table: CalibrationTable) -> Self {
        self.calibration = table;
        self
    }

    pub fn with_speed(mut self, speed: MotorSpeed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_sampler(mut self, cfg: SamplerCfg) -> Self {
        self.sampler = cfg;
        self
    }

    /// Replace the clock used for drive waits and settle delays.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> RollerBuilder<L, P, B, C2, H> {
        RollerBuilder {
            hw: self.hw,
            calibration: self.calibration,
            speed: self.speed,
            sampler: self.sampler,
            clock,
            _h: PhantomData,
        }
    }

    /// Validate and build, reporting a missing hardware context as an error.
    pub fn try_build(self) -> Result<Roller<L, P, B, C>> {
        let Some(mut hw) = self.hw else {
            return Err(RollerError::Build(BuildError::MissingHardware));
        };
        if self.sampler.samples == 0 {
            return Err(RollerError::Config("sampler samples must be >= 1".into()));
        }
        if !(self.sampler.gain.is_finite() && self.sampler.gain > 0.0) {
            return Err(RollerError::Config(
                "sampler gain must be a finite value > 0".into(),
            ));
        }
        hw.reset()?;
        tracing::info!(
            speed_hz = self.speed.hz(),
            calibrated = self.calibration.is_enabled(),
            samples = self.sampler.samples,
            "roller ready"
        );
        Ok(Roller {
            hw,
            drive: DriveController::new(self.speed),
            sampler: PositionSampler::new(self.sampler),
            calibration: self.calibration,
            clock: self.clock,
        })
    }
}

impl<L, P, B, C> RollerBuilder<L, P, B, C, Set>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    pub fn build(self) -> Result<Roller<L, P, B, C>> {
        self.try_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{SpyLine, SpyPwm, ScriptedFeedback, spy_hardware};

    #[test]
    fn try_build_without_hardware_fails() {
        let err = RollerBuilder::<SpyLine, SpyPwm, ScriptedFeedback>::new()
            .try_build()
            .err()
            .expect("missing hardware");
        assert_eq!(err, RollerError::Build(BuildError::MissingHardware));
    }

    #[test]
    fn zero_samples_rejected() {
        let (hw, _log, _pos) = spy_hardware([0; 4]);
        let cfg = SamplerCfg {
            samples: 0,
            ..SamplerCfg::default()
        };
        let res = Roller::builder().with_hardware(hw).with_sampler(cfg).build();
        assert!(matches!(res, Err(RollerError::Config(_))));
    }
}
