//! Potentiometer position sampling over the feedback bus.
//!
//! A single read sends `[0x06, sel, 0x00]` and composes the reply's bytes 1..=2
//! big-endian. Readings are scaled by the configured gain and clipped to the
//! sensor range; out-of-range values are never reported as errors.
//!
//! Averaged reads (used whenever soft limits are active) wait a short settle
//! delay, take `samples` reads and truncate the mean. A failed transfer aborts
//! the read; nothing is retried.

use roller_traits::{Clock, FeedbackBus};

use crate::channel::Channel;
use crate::config::SamplerCfg;
use crate::error::Result;
use crate::hw_error::device;

pub const RAW_MAX: u16 = 4095;
/// Start bit + single-ended mode of the read frame.
pub const ADC_READ_COMMAND: u8 = 0x06;

/// Read frame for one channel.
#[inline]
pub fn read_frame(channel: Channel) -> [u8; 3] {
    [ADC_READ_COMMAND, channel.adc_select(), 0x00]
}

/// Compose, scale and clip a reply.
pub fn decode(resp: [u8; 3], gain: f32) -> u16 {
    let composed = u16::from_be_bytes([resp[1], resp[2]]);
    let scaled = (f64::from(composed) * f64::from(gain)).trunc();
    clip(scaled)
}

#[inline]
fn clip(value: f64) -> u16 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(RAW_MAX) {
        RAW_MAX
    } else {
        value as u16
    }
}

/// Raw readings of all four channels, plus distances when calibrated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub raw: [u16; 4],
    pub distance: Option<[f64; 4]>,
}

#[derive(Debug, Clone, Default)]
pub struct PositionSampler {
    cfg: SamplerCfg,
}

impl PositionSampler {
    pub fn new(cfg: SamplerCfg) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> &SamplerCfg {
        &self.cfg
    }

    /// One transfer, no averaging.
    pub fn read<B: FeedbackBus>(&self, bus: &mut B, channel: Channel) -> Result<u16> {
        let resp = bus
            .transfer(read_frame(channel))
            .map_err(device("feedback transfer"))?;
        let raw = decode(resp, self.cfg.gain);
        tracing::trace!(channel = channel.index(), raw, "position read");
        Ok(raw)
    }

    /// Settle, then the truncated mean of `samples` reads.
    pub fn read_averaged<B: FeedbackBus, C: Clock>(
        &self,
        bus: &mut B,
        clock: &C,
        channel: Channel,
    ) -> Result<u16> {
        clock.sleep(self.cfg.settle);
        self.mean(bus, channel)
    }

    /// Every channel in order. `averaged` selects the denoised variant with one
    /// settle delay before the whole batch.
    pub fn read_all<B: FeedbackBus, C: Clock>(
        &self,
        bus: &mut B,
        clock: &C,
        averaged: bool,
    ) -> Result<[u16; 4]> {
        let mut out = [0u16; 4];
        if averaged {
            clock.sleep(self.cfg.settle);
        }
        for (slot, channel) in out.iter_mut().zip(Channel::ALL) {
            *slot = if averaged {
                self.mean(bus, channel)?
            } else {
                self.read(bus, channel)?
            };
        }
        Ok(out)
    }

    fn mean<B: FeedbackBus>(&self, bus: &mut B, channel: Channel) -> Result<u16> {
        let n = self.cfg.samples.max(1);
        let mut sum: u64 = 0;
        for _ in 0..n {
            sum += u64::from(self.read(bus, channel)?);
        }
        // Mean of values <= RAW_MAX always fits.
        let mean = (sum / n as u64) as u16;
        tracing::debug!(channel = channel.index(), samples = n, raw = mean, "averaged read");
        Ok(mean)
    }
}
