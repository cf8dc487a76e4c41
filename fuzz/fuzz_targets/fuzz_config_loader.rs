#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Rig config: parse and validation errors are fine, panics are not.
    if let Ok(cfg) = roller_config::load_toml(data) {
        let _ = cfg.validate();
    }

    // Calibration file: anything validated must also build a limit table or
    // be rejected as malformed, never panic.
    if let Ok(file) = roller_config::load_calibration_toml(data) {
        if let Ok(table) = roller_core::CalibrationTable::try_from(&file) {
            for ch in roller_core::Channel::ALL {
                let _ = table.check(ch, roller_core::Direction::Inward, 0);
                let _ = table.check(ch, roller_core::Direction::Outward, 4095);
            }
        }
    }
});
