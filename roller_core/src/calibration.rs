//! Two-point potentiometer calibration and directional soft limits.
//!
//! Each channel maps raw ADC counts to physical distance with the affine
//! function through its two calibration points:
//!
//!   distance = (x2 - x1) / (y2 - y1) * (raw - y1) + x1
//!
//! where `(x, y)` are the `(distance, raw)` points in stored order. Limits are
//! configured as distances and projected into raw space once, so the per-move
//! decision compares the raw reading directly.

use std::fmt;

use crate::channel::Channel;
use crate::command::Direction;
use crate::error::{Result, RollerError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    pub distance: f64,
    pub raw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationEntry {
    p1: CalibrationPoint,
    p2: CalibrationPoint,
    limit_inside: f64,
    limit_outside: f64,
}

impl CalibrationEntry {
    pub fn new(
        p1: CalibrationPoint,
        p2: CalibrationPoint,
        limit_inside: f64,
        limit_outside: f64,
    ) -> Result<Self> {
        let finite = [p1.distance, p1.raw, p2.distance, p2.raw, limit_inside, limit_outside]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(RollerError::CalibrationMalformed(
                "calibration values must be finite".into(),
            ));
        }
        if p1.raw == p2.raw {
            return Err(RollerError::CalibrationMalformed(
                "calibration points share a raw value".into(),
            ));
        }
        if p1.distance == p2.distance {
            return Err(RollerError::CalibrationMalformed(
                "calibration points share a distance".into(),
            ));
        }
        Ok(Self {
            p1,
            p2,
            limit_inside,
            limit_outside,
        })
    }

    pub fn limit_inside(&self) -> f64 {
        self.limit_inside
    }

    pub fn limit_outside(&self) -> f64 {
        self.limit_outside
    }

    /// Distance per raw count. Positive when the reading grows as the actuator extends.
    #[inline]
    pub fn slope(&self) -> f64 {
        (self.p2.distance - self.p1.distance) / (self.p2.raw - self.p1.raw)
    }

    #[inline]
    pub fn raw_to_distance(&self, raw: f64) -> f64 {
        self.slope() * (raw - self.p1.raw) + self.p1.distance
    }

    #[inline]
    pub fn distance_to_raw(&self, distance: f64) -> f64 {
        let raw_per_distance = (self.p2.raw - self.p1.raw) / (self.p2.distance - self.p1.distance);
        raw_per_distance * (distance - self.p1.distance) + self.p1.raw
    }

    /// Raw reading at which inward motion stops being permitted.
    pub fn inside_boundary_raw(&self) -> f64 {
        self.distance_to_raw(self.limit_inside)
    }

    /// Raw reading at which outward motion stops being permitted.
    pub fn outside_boundary_raw(&self) -> f64 {
        self.distance_to_raw(self.limit_outside)
    }

    /// Decide whether `direction` is permitted from `raw`.
    ///
    /// Inward travel decreases distance. With a positive slope that means the
    /// reading falls, so the inside boundary is reached at `raw <= boundary`;
    /// a negative slope mirrors both comparisons.
    pub fn check(&self, direction: Direction, raw: u16) -> LimitDecision {
        let raw = f64::from(raw);
        let rising = self.slope() > 0.0;
        match direction {
            Direction::Inward => {
                let b = self.inside_boundary_raw();
                let reached = if rising { raw <= b } else { raw >= b };
                if reached {
                    return LimitDecision::Denied(LimitReason::InsideReached);
                }
            }
            Direction::Outward => {
                let b = self.outside_boundary_raw();
                let reached = if rising { raw >= b } else { raw <= b };
                if reached {
                    return LimitDecision::Denied(LimitReason::OutsideReached);
                }
            }
        }
        LimitDecision::Allowed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitReason {
    InsideReached,
    OutsideReached,
}

impl fmt::Display for LimitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitReason::InsideReached => f.write_str("limit_inside reached"),
            LimitReason::OutsideReached => f.write_str("limit_outside reached"),
        }
    }
}

/// Outcome of a limit check. A denial is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    Allowed,
    Denied(LimitReason),
}

impl LimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LimitDecision::Allowed)
    }
}

/// Per-channel calibration: either absent for every channel or present for all four.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationTable {
    entries: Option<[CalibrationEntry; 4]>,
}

impl CalibrationTable {
    /// No calibration: every move is permitted.
    pub fn empty() -> Self {
        Self { entries: None }
    }

    pub fn complete(entries: [CalibrationEntry; 4]) -> Self {
        Self {
            entries: Some(entries),
        }
    }

    /// Whether soft limits are active.
    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn entry(&self, channel: Channel) -> Option<&CalibrationEntry> {
        self.entries.as_ref().map(|e| &e[channel.index()])
    }

    pub fn check(&self, channel: Channel, direction: Direction, raw: u16) -> LimitDecision {
        check(channel, direction, raw, self)
    }

    /// Physical distance for each channel's reading, when calibrated.
    pub fn distances(&self, raw: &[u16; 4]) -> Option<[f64; 4]> {
        let entries = self.entries.as_ref()?;
        Some(std::array::from_fn(|i| {
            entries[i].raw_to_distance(f64::from(raw[i]))
        }))
    }
}

/// Limit check for one channel against the table.
pub fn check(
    channel: Channel,
    direction: Direction,
    raw: u16,
    table: &CalibrationTable,
) -> LimitDecision {
    match table.entry(channel) {
        None => LimitDecision::Allowed,
        Some(entry) => entry.check(direction, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(distance: f64, raw: f64) -> CalibrationPoint {
        CalibrationPoint { distance, raw }
    }

    fn rising() -> CalibrationEntry {
        // 10 mm at raw 500, 90 mm at raw 3700
        CalibrationEntry::new(pt(10.0, 500.0), pt(90.0, 3700.0), 10.0, 90.0).unwrap()
    }

    fn falling() -> CalibrationEntry {
        // Reading drops as the actuator extends.
        CalibrationEntry::new(pt(0.0, 4000.0), pt(100.0, 0.0), 10.0, 90.0).unwrap()
    }

    #[test]
    fn projects_limits_into_raw_space() {
        let e = rising();
        assert!((e.inside_boundary_raw() - 500.0).abs() < 1e-9);
        assert!((e.outside_boundary_raw() - 3700.0).abs() < 1e-9);
        assert!((e.raw_to_distance(2100.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn inward_denied_past_inside_limit() {
        let e = rising();
        assert_eq!(
            e.check(Direction::Inward, 480),
            LimitDecision::Denied(LimitReason::InsideReached)
        );
        assert_eq!(
            e.check(Direction::Inward, 500),
            LimitDecision::Denied(LimitReason::InsideReached)
        );
        assert_eq!(e.check(Direction::Inward, 501), LimitDecision::Allowed);
        assert_eq!(e.check(Direction::Outward, 480), LimitDecision::Allowed);
    }

    #[test]
    fn outward_denied_past_outside_limit() {
        let e = rising();
        assert_eq!(
            e.check(Direction::Outward, 3700),
            LimitDecision::Denied(LimitReason::OutsideReached)
        );
        assert_eq!(e.check(Direction::Outward, 3699), LimitDecision::Allowed);
        assert_eq!(e.check(Direction::Inward, 4095), LimitDecision::Allowed);
    }

    #[test]
    fn negative_slope_mirrors_comparisons() {
        let e = falling();
        // 10 mm -> raw 3600, 90 mm -> raw 400
        assert_eq!(
            e.check(Direction::Inward, 3700),
            LimitDecision::Denied(LimitReason::InsideReached)
        );
        assert_eq!(e.check(Direction::Inward, 3500), LimitDecision::Allowed);
        assert_eq!(
            e.check(Direction::Outward, 300),
            LimitDecision::Denied(LimitReason::OutsideReached)
        );
        assert_eq!(e.check(Direction::Outward, 500), LimitDecision::Allowed);
    }

    #[test]
    fn rejects_degenerate_points() {
        assert!(matches!(
            CalibrationEntry::new(pt(0.0, 100.0), pt(10.0, 100.0), 1.0, 9.0),
            Err(RollerError::CalibrationMalformed(_))
        ));
        assert!(matches!(
            CalibrationEntry::new(pt(5.0, 100.0), pt(5.0, 200.0), 1.0, 9.0),
            Err(RollerError::CalibrationMalformed(_))
        ));
        assert!(CalibrationEntry::new(pt(0.0, 0.0), pt(1.0, 1.0), f64::NAN, 9.0).is_err());
    }

    #[test]
    fn empty_table_reports_no_distances() {
        assert_eq!(CalibrationTable::empty().distances(&[1, 2, 3, 4]), None);
    }

    fn entry_strategy() -> impl Strategy<Value = CalibrationEntry> {
        (
            -500.0f64..500.0,
            0.0f64..4095.0,
            -500.0f64..500.0,
            0.0f64..4095.0,
        )
            .prop_filter("distinct points", |(x1, y1, x2, y2)| {
                (x1 - x2).abs() > 1e-3 && (y1 - y2).abs() > 1e-3
            })
            .prop_map(|(x1, y1, x2, y2)| {
                CalibrationEntry::new(pt(x1, y1), pt(x2, y2), x1.min(x2), x1.max(x2))
                    .expect("filtered points are valid")
            })
    }

    proptest! {
        #[test]
        fn distance_round_trips(e in entry_strategy(), d in -1000.0f64..1000.0) {
            let back = e.raw_to_distance(e.distance_to_raw(d));
            prop_assert!((back - d).abs() <= 1e-5 * (1.0 + d.abs()));
        }

        #[test]
        fn empty_table_allows_everything(ch in 0u8..4, inward in any::<bool>(), raw in 0u16..=4095) {
            let dir = if inward { Direction::Inward } else { Direction::Outward };
            let channel = Channel::new(ch).unwrap();
            prop_assert_eq!(check(channel, dir, raw, &CalibrationTable::empty()), LimitDecision::Allowed);
        }

        #[test]
        fn inward_denial_is_monotonic(e in entry_strategy(), a in 0u16..=4095, b in 0u16..=4095) {
            // Moving further past the inside boundary never turns a denial into a permit.
            let (near, far) = if e.slope() > 0.0 { (a.max(b), a.min(b)) } else { (a.min(b), a.max(b)) };
            if !e.check(Direction::Inward, near).is_allowed() {
                prop_assert!(!e.check(Direction::Inward, far).is_allowed());
            }
        }
    }
}
