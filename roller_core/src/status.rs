//! Per-channel move outcome reported by the drive controller.

use crate::calibration::LimitReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Drive energized for the full duration, then braked.
    Moved,
    /// Soft limit refused the move; no line was touched.
    Denied(LimitReason),
}
