#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration-file parsing for the actuator rig.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `CalibrationFile` holds the per-motor soft limits and two-point sensor
//!   calibration; `CalibrationFile::validated` rejects partial tables.
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Upper bound for the shared PWM frequency; larger requests are clamped.
pub const MAX_MOTOR_SPEED_HZ: u32 = 1200;

/// Calibration keys, indexed by channel.
pub const MOTOR_KEYS: [&str; 4] = ["mot0", "mot1", "mot2", "mot3"];

/// Output pins, BCM numbering.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Pins {
    /// Rotational output (outward).
    pub clw: u8,
    /// Counter-rotational output (inward).
    pub ccw: u8,
    /// Brake line per channel.
    pub brakes: [u8; 4],
    pub motor_select: u8,
    pub driver_select: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            clw: 23,
            ccw: 24,
            brakes: [21, 26, 19, 13],
            motor_select: 16,
            driver_select: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MotorCfg {
    /// PWM frequency shared by both direction outputs.
    pub speed_hz: u32,
}

impl Default for MotorCfg {
    fn default() -> Self {
        Self { speed_hz: 500 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedbackCfg {
    pub spi_bus: u8,
    pub spi_slave_select: u8,
    pub spi_clock_hz: u32,
    /// Reads averaged per channel when soft limits are active.
    pub samples: usize,
    /// Delay before an averaged batch (ms).
    pub settle_ms: u64,
    /// Multiplier applied to the composed reading before clipping.
    pub gain: f32,
}

impl Default for FeedbackCfg {
    fn default() -> Self {
        Self {
            spi_bus: 0,
            spi_slave_select: 0,
            spi_clock_hz: 5000,
            samples: 20,
            settle_ms: 10,
            gain: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub pins: Pins,
    #[serde(default)]
    pub motor: MotorCfg,
    #[serde(default)]
    pub feedback: FeedbackCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        let p = &self.pins;
        let all = [
            p.clw,
            p.ccw,
            p.brakes[0],
            p.brakes[1],
            p.brakes[2],
            p.brakes[3],
            p.motor_select,
            p.driver_select,
        ];
        let mut seen = HashSet::new();
        for pin in all {
            if !seen.insert(pin) {
                eyre::bail!("pins: pin {pin} is assigned more than once");
            }
        }

        // Motor
        if self.motor.speed_hz == 0 {
            eyre::bail!("motor.speed_hz must be > 0");
        }

        // Feedback
        if self.feedback.spi_bus > 6 {
            eyre::bail!("feedback.spi_bus must be in 0..=6");
        }
        if self.feedback.spi_slave_select > 2 {
            eyre::bail!("feedback.spi_slave_select must be in 0..=2");
        }
        if self.feedback.spi_clock_hz == 0 {
            eyre::bail!("feedback.spi_clock_hz must be > 0");
        }
        if self.feedback.samples == 0 {
            eyre::bail!("feedback.samples must be >= 1");
        }
        if self.feedback.settle_ms > 1000 {
            eyre::bail!("feedback.settle_ms is unreasonably large (>1s)");
        }
        if !(self.feedback.gain.is_finite() && self.feedback.gain > 0.0) {
            eyre::bail!("feedback.gain must be a finite value > 0");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

/// One `motN` table of the calibration file, as written.
///
/// Every field is optional at parse time so a missing sub-key is reported by
/// name instead of as a generic deserialization failure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MotorCalibration {
    pub limit_inside: Option<f64>,
    pub limit_outside: Option<f64>,
    /// `[distance, raw]` pairs; exactly two are required.
    pub cal_points: Option<Vec<Vec<f64>>>,
}

/// Calibration file schema.
///
/// Example:
/// [mot0]
/// limit_inside = 10.0
/// limit_outside = 90.0
/// cal_points = [[0.0, 100.0], [100.0, 4100.0]]
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(transparent)]
pub struct CalibrationFile(pub BTreeMap<String, MotorCalibration>);

/// A complete, checked calibration entry for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCalibration {
    pub limit_inside: f64,
    pub limit_outside: f64,
    /// Two `(distance, raw)` points in file order.
    pub cal_points: [(f64, f64); 2],
}

impl CalibrationFile {
    /// Check that `mot0..mot3` are all present and complete, returning them by channel.
    pub fn validated(&self) -> eyre::Result<[ChannelCalibration; 4]> {
        let mut out = [ChannelCalibration {
            limit_inside: 0.0,
            limit_outside: 0.0,
            cal_points: [(0.0, 0.0); 2],
        }; 4];
        for (slot, key) in out.iter_mut().zip(MOTOR_KEYS) {
            let Some(m) = self.0.get(key) else {
                eyre::bail!("calibration is missing required key {key}");
            };
            *slot = validate_motor(key, m)?;
        }
        Ok(out)
    }
}

fn validate_motor(key: &str, m: &MotorCalibration) -> eyre::Result<ChannelCalibration> {
    let Some(limit_inside) = m.limit_inside else {
        eyre::bail!("calibration {key} is missing limit_inside");
    };
    let Some(limit_outside) = m.limit_outside else {
        eyre::bail!("calibration {key} is missing limit_outside");
    };
    let Some(points) = m.cal_points.as_ref() else {
        eyre::bail!("calibration {key} is missing cal_points");
    };
    if !limit_inside.is_finite() || !limit_outside.is_finite() {
        eyre::bail!("calibration {key} limits must be finite numbers");
    }
    if points.len() != 2 {
        eyre::bail!(
            "calibration {key} cal_points must hold exactly two [distance, raw] pairs, got {}",
            points.len()
        );
    }
    let mut pairs = [(0.0, 0.0); 2];
    for (i, (pair, slot)) in points.iter().zip(pairs.iter_mut()).enumerate() {
        let [distance, raw] = pair.as_slice() else {
            eyre::bail!("calibration {key} cal_points[{i}] must be a [distance, raw] pair");
        };
        if !distance.is_finite() || !raw.is_finite() {
            eyre::bail!("calibration {key} cal_points[{i}] must be finite numbers");
        }
        *slot = (*distance, *raw);
    }
    if pairs[0].1 == pairs[1].1 {
        eyre::bail!("calibration {key} cal_points have equal raw values (degenerate slope)");
    }
    Ok(ChannelCalibration {
        limit_inside,
        limit_outside,
        cal_points: pairs,
    })
}

pub fn load_calibration_toml(s: &str) -> eyre::Result<CalibrationFile> {
    toml::from_str::<CalibrationFile>(s).map_err(|e| eyre::eyre!("parse calibration TOML: {e}"))
}

pub fn load_calibration_file(path: &Path) -> eyre::Result<CalibrationFile> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("open calibration file {:?}: {}", path, e))?;
    load_calibration_toml(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().expect("defaults are valid");
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = load_toml("").expect("parse");
        assert_eq!(cfg.motor.speed_hz, 500);
        assert_eq!(cfg.feedback.samples, 20);
        assert_eq!(cfg.pins, Pins::default());
    }
}
