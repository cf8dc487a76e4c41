//! Exclusive ownership of the rig's outputs and feedback bus.
//!
//! The drive pair, select lines and PWM frequency are shared by all four
//! channels; holding them in one context makes every access go through a
//! single `&mut` borrow.

use roller_traits::{FeedbackBus, OutputLine, PwmOutput};

use crate::command::Direction;
use crate::error::{Result, RollerError};
use crate::hw_error::device;

/// Brake and select outputs.
pub struct DriveLines<L> {
    /// Indexed by channel.
    pub brakes: [L; 4],
    pub motor_select: L,
    pub driver_select: L,
}

pub struct HardwareContext<L, P, B>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    pub(crate) lines: DriveLines<L>,
    /// Counter-rotational output.
    pub(crate) inward: P,
    /// Rotational output.
    pub(crate) outward: P,
    pub(crate) feedback: B,
    released: bool,
}

impl<L, P, B> HardwareContext<L, P, B>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    pub fn new(lines: DriveLines<L>, inward: P, outward: P, feedback: B) -> Self {
        Self {
            lines,
            inward,
            outward,
            feedback,
            released: false,
        }
    }

    /// The PWM output that moves the actuator in `direction`.
    #[inline]
    pub(crate) fn output(&mut self, direction: Direction) -> &mut P {
        match direction {
            Direction::Inward => &mut self.inward,
            Direction::Outward => &mut self.outward,
        }
    }

    pub(crate) fn feedback_mut(&mut self) -> Result<&mut B> {
        if self.released {
            return Err(RollerError::State("hardware already torn down".into()));
        }
        Ok(&mut self.feedback)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Drive every output low. Stops at the first failure.
    pub fn reset(&mut self) -> Result<()> {
        if self.released {
            return Err(RollerError::State("hardware already torn down".into()));
        }
        self.inward.stop().map_err(device("stop inward output"))?;
        self.outward.stop().map_err(device("stop outward output"))?;
        for brake in self.lines.brakes.iter_mut() {
            brake.set_low().map_err(device("brake low"))?;
        }
        self.lines
            .motor_select
            .set_low()
            .map_err(device("motor select low"))?;
        self.lines
            .driver_select
            .set_low()
            .map_err(device("driver select low"))?;
        tracing::debug!("outputs reset low");
        Ok(())
    }

    /// Best-effort teardown: every output low, then release the feedback bus.
    ///
    /// Every step is attempted even if an earlier one fails; failures are
    /// logged and the first one is returned. Idempotent.
    pub fn teardown(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let mut first: Option<RollerError> = None;
        let mut note = |r: Result<()>| {
            if let Err(e) = r {
                tracing::error!(error = %e, "teardown step failed");
                first.get_or_insert(e);
            }
        };
        note(self.inward.stop().map_err(device("stop inward output")));
        note(self.outward.stop().map_err(device("stop outward output")));
        for brake in self.lines.brakes.iter_mut() {
            note(brake.set_low().map_err(device("brake low")));
        }
        note(
            self.lines
                .motor_select
                .set_low()
                .map_err(device("motor select low")),
        );
        note(
            self.lines
                .driver_select
                .set_low()
                .map_err(device("driver select low")),
        );
        note(self.feedback.release().map_err(device("release feedback bus")));
        tracing::info!(clean = first.is_none(), "hardware torn down");
        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<L, P, B> Drop for HardwareContext<L, P, B>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!("hardware context dropped without teardown; forcing outputs low");
            let _ = self.teardown();
        }
    }
}
