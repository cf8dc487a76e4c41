//! Calibration files are fully checked before any hardware is involved.

use roller_core::{CalibrationTable, Channel, Direction, LimitDecision, RollerError};

fn motor(key: &str) -> String {
    format!(
        "[{key}]\nlimit_inside = 10.0\nlimit_outside = 90.0\ncal_points = [[10.0, 500.0], [90.0, 3700.0]]\n"
    )
}

fn table_from(text: &str) -> Result<CalibrationTable, RollerError> {
    let file = roller_config::load_calibration_toml(text)
        .map_err(|e| RollerError::CalibrationMalformed(e.to_string()))?;
    CalibrationTable::try_from(&file)
}

#[test]
fn missing_mot2_is_malformed() {
    let text = [motor("mot0"), motor("mot1"), motor("mot3")].concat();
    match table_from(&text) {
        Err(RollerError::CalibrationMalformed(msg)) => assert!(msg.contains("mot2"), "{msg}"),
        other => panic!("expected CalibrationMalformed, got {other:?}"),
    }
}

#[test]
fn three_points_are_malformed() {
    let text = [motor("mot0"), motor("mot1"), motor("mot2"), motor("mot3")]
        .concat()
        .replacen(
            "[[10.0, 500.0], [90.0, 3700.0]]",
            "[[10.0, 500.0], [50.0, 2100.0], [90.0, 3700.0]]",
            1,
        );
    assert!(matches!(
        table_from(&text),
        Err(RollerError::CalibrationMalformed(_))
    ));
}

#[test]
fn complete_file_builds_limits_for_every_channel() {
    let text = [motor("mot0"), motor("mot1"), motor("mot2"), motor("mot3")].concat();
    let table = table_from(&text).expect("valid table");
    for ch in Channel::ALL {
        assert!(matches!(
            table.check(ch, Direction::Inward, 480),
            LimitDecision::Denied(_)
        ));
        assert_eq!(table.check(ch, Direction::Outward, 480), LimitDecision::Allowed);
    }
}
