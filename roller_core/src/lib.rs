#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core actuator control logic (hardware-agnostic).
//!
//! This crate drives four linear actuators that share one drive pair and one
//! feedback converter. All hardware interactions go through the
//! `roller_traits::OutputLine`, `PwmOutput` and `FeedbackBus` traits.
//!
//! ## Architecture
//!
//! - **Commands**: the `XDY` grammar (`command` module)
//! - **Positions**: single and averaged potentiometer reads (`sampler` module)
//! - **Limits**: two-point calibration and directional soft limits (`calibration` module)
//! - **Selection**: the fixed channel wiring table (`channel`, `selector` modules)
//! - **Motion**: the timed drive state machine (`drive` module)
//! - **Dispatch**: `Roller`, built with `RollerBuilder`, runs one command at a
//!   time and reports a snapshot after each
//!
//! Everything is single-threaded and blocking: a drive holds the caller for
//! its full duration.

pub mod builder;
pub mod calibration;
pub mod channel;
pub mod command;
pub mod config;
pub mod conversions;
pub mod dispatcher;
pub mod drive;
pub mod error;
pub mod hardware;
pub mod hw_error;
pub mod mocks;
pub mod sampler;
pub mod selector;
pub mod status;

pub use builder::RollerBuilder;
pub use calibration::{
    CalibrationEntry, CalibrationPoint, CalibrationTable, LimitDecision, LimitReason,
};
pub use channel::{Channel, Target};
pub use command::{COMMAND_FORMAT_HELP, Command, Direction, parse};
pub use config::{MotorSpeed, SamplerCfg};
pub use dispatcher::{ChannelMove, DispatchReport, Roller};
pub use drive::DriveState;
pub use error::{BuildError, CommandError, ExecError, Result, RollerError};
pub use hardware::{DriveLines, HardwareContext};
pub use sampler::Snapshot;
pub use status::MoveOutcome;
