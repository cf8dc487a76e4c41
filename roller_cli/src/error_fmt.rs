//! Human-readable error descriptions and structured JSON error formatting.

use roller_core::error::{BuildError, RollerError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(re) = err.downcast_ref::<RollerError>() {
        return match re {
            RollerError::CalibrationMalformed(msg) => format!(
                "What happened: The calibration file was rejected ({msg}).\nLikely causes: A missing mot0..mot3 table, a missing limit_inside/limit_outside/cal_points key, or cal_points without exactly two [distance, raw] pairs.\nHow to fix: Complete every motN table and rerun. No output was driven."
            ),
            RollerError::Device(msg) => format!(
                "What happened: A hardware operation failed ({msg}).\nLikely causes: Wrong pin numbers, missing GPIO/SPI permissions, or a disconnected ADC.\nHow to fix: Check [pins] and [feedback] in the config and that SPI is enabled. Outputs were forced low."
            ),
            RollerError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file or the flag, then rerun."
            ),
            RollerError::State(msg) => format!(
                "What happened: The controller refused the request ({msg}).\nLikely causes: A previous move failed part way, or the rig was already torn down.\nHow to fix: Restart the program."
            ),
            RollerError::Build(BuildError::MissingHardware) => {
                "What happened: No hardware was provided to the controller.\nLikely causes: The rig failed to open or was not wired into the builder.\nHow to fix: Check the hardware backend, or rerun with --sim.".to_string()
            }
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("parse config toml") || lower.contains("read config") {
        return format!(
            "What happened: The config file could not be loaded ({msg}).\nLikely causes: Wrong path or a TOML syntax error.\nHow to fix: Check the --config path and the file contents; see etc/roller_config.toml."
        );
    }

    if lower.starts_with("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Duplicate pins or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 calibration, 4 device, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<RollerError>() {
        Some(RollerError::CalibrationMalformed(_)) => 3,
        Some(RollerError::Device(_)) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<RollerError>() {
        Some(RollerError::CalibrationMalformed(_)) => "CalibrationMalformed",
        Some(RollerError::Device(_)) => "Device",
        Some(RollerError::Config(_)) => "Config",
        Some(RollerError::State(_)) => "State",
        Some(RollerError::Build(_)) => "Build",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_errors_exit_3() {
        let err = eyre::Report::new(RollerError::CalibrationMalformed("missing mot2".into()));
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("missing mot2"));
    }

    #[test]
    fn device_errors_exit_4_with_json_reason() {
        let err = eyre::Report::new(RollerError::Device("feedback transfer: bus gone".into()));
        assert_eq!(exit_code_for_error(&err), 4);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Device");
    }

    #[test]
    fn untyped_errors_exit_1() {
        let err = eyre::eyre!("pins: pin 5 is assigned more than once")
            .wrap_err("invalid configuration");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("Duplicate pins"));
    }
}
