//! Conversions from `roller_config` file types to engine types.

use std::time::Duration;

use crate::calibration::{CalibrationEntry, CalibrationPoint, CalibrationTable};
use crate::config::{MotorSpeed, SamplerCfg};
use crate::error::RollerError;

// ── Sampler ──────────────────────────────────────────────────────────────────

impl From<&roller_config::FeedbackCfg> for SamplerCfg {
    fn from(c: &roller_config::FeedbackCfg) -> Self {
        Self {
            samples: c.samples,
            settle: Duration::from_millis(c.settle_ms),
            gain: c.gain,
        }
    }
}

// ── Motor speed ──────────────────────────────────────────────────────────────

impl TryFrom<&roller_config::MotorCfg> for MotorSpeed {
    type Error = RollerError;

    fn try_from(c: &roller_config::MotorCfg) -> Result<Self, Self::Error> {
        MotorSpeed::new(c.speed_hz)
    }
}

// ── Calibration ──────────────────────────────────────────────────────────────

impl TryFrom<&roller_config::ChannelCalibration> for CalibrationEntry {
    type Error = RollerError;

    fn try_from(c: &roller_config::ChannelCalibration) -> Result<Self, Self::Error> {
        let [(d1, r1), (d2, r2)] = c.cal_points;
        CalibrationEntry::new(
            CalibrationPoint {
                distance: d1,
                raw: r1,
            },
            CalibrationPoint {
                distance: d2,
                raw: r2,
            },
            c.limit_inside,
            c.limit_outside,
        )
    }
}

impl TryFrom<&roller_config::CalibrationFile> for CalibrationTable {
    type Error = RollerError;

    /// All four channels or nothing.
    fn try_from(file: &roller_config::CalibrationFile) -> Result<Self, Self::Error> {
        let channels = file
            .validated()
            .map_err(|e| RollerError::CalibrationMalformed(format!("{e:#}")))?;
        let [c0, c1, c2, c3] = &channels;
        let entries = [
            CalibrationEntry::try_from(c0)?,
            CalibrationEntry::try_from(c1)?,
            CalibrationEntry::try_from(c2)?,
            CalibrationEntry::try_from(c3)?,
        ];
        Ok(CalibrationTable::complete(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;

    const FULL: &str = r#"
[mot0]
limit_inside = 10.0
limit_outside = 90.0
cal_points = [[0.0, 100.0], [100.0, 4100.0]]
[mot1]
limit_inside = 10.0
limit_outside = 90.0
cal_points = [[0.0, 100.0], [100.0, 4100.0]]
[mot2]
limit_inside = 5.0
limit_outside = 50.0
cal_points = [[0.0, 4000.0], [60.0, 400.0]]
[mot3]
limit_inside = 10.0
limit_outside = 90.0
cal_points = [[0.0, 100.0], [100.0, 4100.0]]
"#;

    #[test]
    fn complete_file_enables_limits() {
        let file = roller_config::load_calibration_toml(FULL).unwrap();
        let table = CalibrationTable::try_from(&file).unwrap();
        assert!(table.is_enabled());
        let e2 = table.entry(Channel::ALL[2]).unwrap();
        assert!(e2.slope() < 0.0);
        assert!((e2.inside_boundary_raw() - 3700.0).abs() < 1e-9);
    }

    #[test]
    fn missing_channel_is_malformed() {
        let partial = FULL.split("[mot2]").next().unwrap();
        let file = roller_config::load_calibration_toml(partial).unwrap();
        match CalibrationTable::try_from(&file) {
            Err(RollerError::CalibrationMalformed(msg)) => assert!(msg.contains("mot2")),
            other => panic!("expected CalibrationMalformed, got {other:?}"),
        }
    }

    #[test]
    fn feedback_cfg_maps_settle_to_duration() {
        let cfg = roller_config::FeedbackCfg {
            settle_ms: 25,
            gain: 0.5,
            ..Default::default()
        };
        let s = SamplerCfg::from(&cfg);
        assert_eq!(s.settle, Duration::from_millis(25));
        assert_eq!(s.samples, 20);
        assert!((s.gain - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn oversized_speed_is_clamped() {
        let m = roller_config::MotorCfg { speed_hz: 9000 };
        assert_eq!(MotorSpeed::try_from(&m).unwrap().hz(), MotorSpeed::MAX_HZ);
    }
}
