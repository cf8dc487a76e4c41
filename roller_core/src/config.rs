//! Runtime configuration types for the engine.
//!
//! These are separate from the TOML-deserialized config in `roller_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

use crate::error::{Result, RollerError};

/// Position sampler configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerCfg {
    /// Reads averaged per channel when soft limits are active.
    pub samples: usize,
    /// Delay before an averaged batch.
    pub settle: Duration,
    /// Multiplier applied to the composed reading before clipping.
    pub gain: f32,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            samples: 20,
            settle: Duration::from_millis(10),
            gain: 1.0,
        }
    }
}

/// PWM frequency shared by both direction outputs. Fixed once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorSpeed(u32);

impl MotorSpeed {
    pub const MAX_HZ: u32 = roller_config::MAX_MOTOR_SPEED_HZ;

    /// Clamp to `MAX_HZ`; zero is rejected.
    pub fn new(hz: u32) -> Result<Self> {
        if hz == 0 {
            return Err(RollerError::Config("motor speed must be > 0 Hz".into()));
        }
        if hz > Self::MAX_HZ {
            tracing::warn!(
                requested_hz = hz,
                max_hz = Self::MAX_HZ,
                "motor speed above bound; clamping"
            );
            return Ok(Self(Self::MAX_HZ));
        }
        Ok(Self(hz))
    }

    #[inline]
    pub fn hz(self) -> u32 {
        self.0
    }
}

impl Default for MotorSpeed {
    fn default() -> Self {
        Self(500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_clamped_to_bound() {
        assert_eq!(MotorSpeed::new(5000).unwrap().hz(), 1200);
        assert_eq!(MotorSpeed::new(1200).unwrap().hz(), 1200);
        assert_eq!(MotorSpeed::new(300).unwrap().hz(), 300);
    }

    #[test]
    fn zero_speed_is_rejected() {
        assert!(matches!(MotorSpeed::new(0), Err(RollerError::Config(_))));
    }
}
