//! The engine: parse, check, drive and report, one command at a time.

use std::time::Duration;

use roller_traits::{Clock, FeedbackBus, MonotonicClock, OutputLine, PwmOutput};
use tracing::{debug, info};

use crate::builder::RollerBuilder;
use crate::calibration::{CalibrationTable, LimitDecision};
use crate::channel::{Channel, Target};
use crate::command::{Command, Direction, parse};
use crate::config::MotorSpeed;
use crate::drive::{DriveController, DriveState};
use crate::error::{ExecError, Result, RollerError};
use crate::hardware::HardwareContext;
use crate::sampler::{PositionSampler, Snapshot};
use crate::status::MoveOutcome;

/// One channel's part of a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMove {
    pub channel: Channel,
    pub direction: Direction,
    pub duration: Duration,
    pub outcome: MoveOutcome,
}

/// Everything a command did, in execution order, and the positions afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub command: Command,
    pub moves: Vec<ChannelMove>,
    pub snapshot: Snapshot,
}

pub struct Roller<L, P, B, C = MonotonicClock>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    pub(crate) hw: HardwareContext<L, P, B>,
    pub(crate) drive: DriveController,
    pub(crate) sampler: PositionSampler,
    pub(crate) calibration: CalibrationTable,
    pub(crate) clock: C,
}

impl<L, P, B> Roller<L, P, B, MonotonicClock>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    /// Start building a Roller.
    pub fn builder() -> RollerBuilder<L, P, B> {
        RollerBuilder::new()
    }
}

impl<L, P, B, C> Roller<L, P, B, C>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    /// Parse and dispatch one command line.
    ///
    /// Format and duration errors come back as `ExecError::Recoverable` with
    /// nothing touched; anything else that fails is fatal.
    pub fn execute(&mut self, line: &str) -> std::result::Result<DispatchReport, ExecError> {
        let command = parse(line)?;
        Ok(self.dispatch(&command)?)
    }

    /// Run a parsed command and take a snapshot of all four channels.
    ///
    /// Pair targets move their channels in order, each limit-checked on its
    /// own; a denial on one does not stop the other.
    pub fn dispatch(&mut self, command: &Command) -> Result<DispatchReport> {
        if self.hw.is_released() {
            return Err(RollerError::State("hardware already torn down".into()));
        }
        match command.target {
            Target::Poll => debug!("poll"),
            target => info!(
                target = target.code(),
                direction = %command.direction,
                duration_s = command.duration.as_secs_f64(),
                "dispatch"
            ),
        }
        let mut moves = Vec::with_capacity(command.target.channels().len());
        for &channel in command.target.channels() {
            let outcome = self.move_channel(channel, command.direction, command.duration)?;
            moves.push(ChannelMove {
                channel,
                direction: command.direction,
                duration: command.duration,
                outcome,
            });
        }
        let snapshot = self.snapshot()?;
        Ok(DispatchReport {
            command: *command,
            moves,
            snapshot,
        })
    }

    /// Limit-check and drive a single channel.
    pub fn move_channel(
        &mut self,
        channel: Channel,
        direction: Direction,
        duration: Duration,
    ) -> Result<MoveOutcome> {
        let decision = if self.calibration.is_enabled() {
            let bus = self.hw.feedback_mut()?;
            let raw = self.sampler.read_averaged(bus, &self.clock, channel)?;
            let decision = self.calibration.check(channel, direction, raw);
            debug!(channel = channel.index(), raw, ?decision, "limit check");
            decision
        } else {
            LimitDecision::Allowed
        };
        self.drive
            .run(&mut self.hw, &self.clock, channel, direction, duration, decision)
    }

    /// Read every channel; averaged whenever soft limits are active.
    pub fn snapshot(&mut self) -> Result<Snapshot> {
        let averaged = self.calibration.is_enabled();
        let bus = self.hw.feedback_mut()?;
        let raw = self.sampler.read_all(bus, &self.clock, averaged)?;
        let distance = self.calibration.distances(&raw);
        info!(
            raw0 = raw[0],
            raw1 = raw[1],
            raw2 = raw[2],
            raw3 = raw[3],
            "positions"
        );
        Ok(Snapshot { raw, distance })
    }

    /// Force every output low and release the feedback bus. Safe to call twice.
    pub fn shutdown(&mut self) -> Result<()> {
        self.hw.teardown()
    }

    pub fn drive_state(&self) -> DriveState {
        self.drive.state()
    }

    pub fn speed(&self) -> MotorSpeed {
        self.drive.speed()
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }
}
