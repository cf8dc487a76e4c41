//! Channel selection on the shared drive bus.

use roller_traits::{FeedbackBus, OutputLine, PwmOutput};

use crate::channel::{Channel, ChannelWiring};
use crate::error::Result;
use crate::hardware::HardwareContext;
use crate::hw_error::device;

/// Route the drive pair to `channel` and raise its brake line (drive engaged).
pub fn engage<L, P, B>(hw: &mut HardwareContext<L, P, B>, channel: Channel) -> Result<ChannelWiring>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    let w = channel.wiring();
    hw.lines
        .driver_select
        .write(w.driver_select)
        .map_err(device("driver select"))?;
    hw.lines
        .motor_select
        .write(w.motor_select)
        .map_err(device("motor select"))?;
    hw.lines.brakes[w.brake]
        .set_high()
        .map_err(device("brake high"))?;
    tracing::debug!(
        channel = channel.index(),
        driver_select = w.driver_select,
        motor_select = w.motor_select,
        "channel selected"
    );
    Ok(w)
}

/// Lower `channel`'s brake line (drive cut). Select lines are left as they are.
pub fn disengage<L, P, B>(hw: &mut HardwareContext<L, P, B>, channel: Channel) -> Result<()>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    hw.lines.brakes[channel.wiring().brake]
        .set_low()
        .map_err(device("brake low"))
}
