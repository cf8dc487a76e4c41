//! Hardware assembly: config mapping and backend selection.

use eyre::WrapErr;
use roller_core::{DriveLines, HardwareContext};
use roller_hardware::{PinMap, SimulatedFeedback, SimulatedLine, SimulatedPwm, SimulatedRig, SpiSettings};

use crate::cli::SIM_RAW_ENV;

pub type SimHardware = HardwareContext<SimulatedLine, SimulatedPwm, SimulatedFeedback>;

#[cfg_attr(not(feature = "hardware"), allow(dead_code))]
pub fn pin_map(p: &roller_config::Pins) -> PinMap {
    PinMap {
        clw: p.clw,
        ccw: p.ccw,
        brakes: p.brakes,
        motor_select: p.motor_select,
        driver_select: p.driver_select,
    }
}

#[cfg_attr(not(feature = "hardware"), allow(dead_code))]
pub fn spi_settings(f: &roller_config::FeedbackCfg) -> SpiSettings {
    SpiSettings {
        bus: f.spi_bus,
        slave_select: f.spi_slave_select,
        clock_hz: f.spi_clock_hz,
    }
}

/// Simulated positions from the environment, mid-stroke when unset.
pub fn sim_raw_from_env() -> eyre::Result<[u16; 4]> {
    match std::env::var(SIM_RAW_ENV) {
        Ok(s) => parse_sim_raw(&s).wrap_err_with(|| format!("{SIM_RAW_ENV}={s:?}")),
        Err(_) => Ok([2048; 4]),
    }
}

fn parse_sim_raw(s: &str) -> eyre::Result<[u16; 4]> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<u16>())
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("expected four comma-separated integers")?;
    let raw: [u16; 4] = values
        .try_into()
        .map_err(|v: Vec<u16>| eyre::eyre!("expected four values, got {}", v.len()))?;
    Ok(raw)
}

/// Counter-rotational output drives inward, rotational drives outward.
pub fn open_sim(raw: [u16; 4]) -> SimHardware {
    let rig = SimulatedRig::new(raw);
    tracing::info!(?raw, "using simulated rig");
    HardwareContext::new(
        DriveLines {
            brakes: rig.brakes,
            motor_select: rig.motor_select,
            driver_select: rig.driver_select,
        },
        rig.ccw,
        rig.clw,
        rig.feedback,
    )
}

#[cfg(feature = "hardware")]
pub type RpiHardware = HardwareContext<
    roller_hardware::rpi::RpiLine,
    roller_hardware::rpi::RpiPwm,
    roller_hardware::rpi::RpiFeedback,
>;

#[cfg(feature = "hardware")]
pub fn open_rpi(cfg: &roller_config::Config) -> Result<RpiHardware, roller_core::RollerError> {
    let pins = pin_map(&cfg.pins);
    let spi = spi_settings(&cfg.feedback);
    let rig = roller_hardware::rpi::RpiRig::open(&pins, &spi)
        .map_err(|e| roller_core::hw_error::map_hw_error("open rig", &e))?;
    tracing::info!(?pins, ?spi, "using raspberry pi rig");
    Ok(HardwareContext::new(
        DriveLines {
            brakes: rig.brakes,
            motor_select: rig.motor_select,
            driver_select: rig.driver_select,
        },
        rig.ccw,
        rig.clw,
        rig.feedback,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_four_values() {
        assert_eq!(parse_sim_raw("1, 2,3 ,4095").unwrap(), [1, 2, 3, 4095]);
    }

    #[rstest]
    #[case("1,2,3")]
    #[case("1,2,3,4,5")]
    #[case("a,b,c,d")]
    #[case("")]
    fn rejects_malformed(#[case] s: &str) {
        assert!(parse_sim_raw(s).is_err());
    }

    #[test]
    fn pins_map_through() {
        let p = pin_map(&roller_config::Pins::default());
        assert_eq!(p, PinMap::default());
    }
}
