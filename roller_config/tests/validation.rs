use roller_config::load_toml;
use rstest::rstest;

#[test]
fn accepts_full_config() {
    let toml = r#"
[pins]
clw = 23
ccw = 24
brakes = [21, 26, 19, 13]
motor_select = 16
driver_select = 20

[motor]
speed_hz = 800

[feedback]
spi_bus = 0
spi_slave_select = 0
spi_clock_hz = 5000
samples = 20
settle_ms = 10
gain = 0.6667

[logging]
file = "roller.log"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.motor.speed_hz, 800);
    assert!((cfg.feedback.gain - 0.6667).abs() < 1e-6);
}

#[test]
fn speed_above_bound_is_not_a_validation_error() {
    // Clamping to the bound happens when the engine is built.
    let cfg = load_toml("[motor]\nspeed_hz = 5000\n").expect("parse TOML");
    cfg.validate().expect("over-bound speed is clamped later");
}

#[rstest]
#[case("[motor]\nspeed_hz = 0\n", "motor.speed_hz must be > 0")]
#[case("[feedback]\nsamples = 0\n", "feedback.samples must be >= 1")]
#[case("[feedback]\ngain = 0.0\n", "feedback.gain")]
#[case("[feedback]\nspi_bus = 9\n", "feedback.spi_bus")]
#[case("[feedback]\nspi_clock_hz = 0\n", "feedback.spi_clock_hz")]
#[case("[feedback]\nsettle_ms = 5000\n", "settle_ms is unreasonably large")]
#[case("[pins]\nclw = 16\n", "assigned more than once")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn rejects_wrong_brake_count_at_parse_time() {
    let toml = "[pins]\nbrakes = [21, 26, 19]\n";
    assert!(load_toml(toml).is_err());
}
