//! Timed drive state machine.
//!
//! `Idle -> Selecting -> Driving -> Braking -> Idle`
//!
//! A move selects its channel, energizes exactly one direction output at 50 %
//! duty for the requested duration (blocking on the clock), then stops the
//! output and drops the brake. A denied limit check returns straight to `Idle`
//! without touching any line. A device fault leaves the controller where it
//! failed; it then refuses further moves until the caller tears down.

use std::time::Duration;

use roller_traits::{Clock, FeedbackBus, OutputLine, PwmOutput};
use tracing::{debug, info, warn};

use crate::calibration::LimitDecision;
use crate::channel::Channel;
use crate::command::Direction;
use crate::config::MotorSpeed;
use crate::error::{Result, RollerError};
use crate::hardware::HardwareContext;
use crate::hw_error::device;
use crate::selector;
use crate::status::MoveOutcome;

pub const DUTY_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveState {
    Idle,
    Selecting,
    Driving,
    Braking,
}

#[derive(Debug)]
pub struct DriveController {
    state: DriveState,
    speed: MotorSpeed,
}

impl DriveController {
    pub fn new(speed: MotorSpeed) -> Self {
        Self {
            state: DriveState::Idle,
            speed,
        }
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn speed(&self) -> MotorSpeed {
        self.speed
    }

    /// Run one move on `channel`, given the limit decision taken for it.
    pub fn run<L, P, B, C>(
        &mut self,
        hw: &mut HardwareContext<L, P, B>,
        clock: &C,
        channel: Channel,
        direction: Direction,
        duration: Duration,
        decision: LimitDecision,
    ) -> Result<MoveOutcome>
    where
        L: OutputLine,
        P: PwmOutput,
        B: FeedbackBus,
        C: Clock,
    {
        if self.state != DriveState::Idle {
            return Err(RollerError::State(format!(
                "drive controller busy ({:?})",
                self.state
            )));
        }
        if let LimitDecision::Denied(reason) = decision {
            warn!(
                channel = channel.index(),
                direction = %direction,
                reason = %reason,
                "move denied by soft limit"
            );
            return Ok(MoveOutcome::Denied(reason));
        }

        self.state = DriveState::Selecting;
        selector::engage(hw, channel)?;

        self.state = DriveState::Driving;
        let out = hw.output(direction);
        out.configure(f64::from(self.speed.hz()))
            .map_err(device("configure pwm frequency"))?;
        out.start(DUTY_PERCENT).map_err(device("start drive"))?;
        info!(
            channel = channel.index(),
            direction = %direction,
            duration_s = duration.as_secs_f64(),
            "driving"
        );
        let started = clock.now();
        clock.sleep(duration);

        self.state = DriveState::Braking;
        hw.output(direction)
            .stop()
            .map_err(device("stop drive"))?;
        selector::disengage(hw, channel)?;
        debug!(
            channel = channel.index(),
            elapsed_ms = clock.ms_since(started),
            "braked"
        );

        self.state = DriveState::Idle;
        Ok(MoveOutcome::Moved)
    }
}
