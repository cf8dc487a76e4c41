use std::fs;

use roller_config::{load_calibration_file, load_calibration_toml};
use rstest::rstest;
use tempfile::tempdir;

const COMPLETE: &str = r#"
[mot0]
limit_inside = 10.0
limit_outside = 90.0
cal_points = [[0.0, 100], [100.0, 4100]]

[mot1]
limit_inside = 5
limit_outside = 95
cal_points = [[0, 4000], [100, 0]]

[mot2]
limit_inside = 10.0
limit_outside = 90.0
cal_points = [[0.0, 0.0], [50.0, 2000.0]]

[mot3]
limit_inside = 10.0
limit_outside = 90.0
cal_points = [[0.0, 0.0], [50.0, 2000.0]]
"#;

#[rstest]
fn complete_table_validates_in_channel_order() {
    let file = load_calibration_toml(COMPLETE).expect("parse");
    let entries = file.validated().expect("complete table");
    assert_eq!(entries[0].cal_points, [(0.0, 100.0), (100.0, 4100.0)]);
    assert_eq!(entries[1].limit_inside, 5.0);
    assert_eq!(entries[1].cal_points[1], (100.0, 0.0));
}

#[rstest]
fn missing_motor_key_is_rejected() {
    let text = COMPLETE.replace("[mot2]", "[spare]");
    let file = load_calibration_toml(&text).expect("parse");
    let err = file.validated().expect_err("mot2 missing");
    assert!(format!("{err}").contains("mot2"));
}

#[rstest]
#[case("limit_inside = 10.0\n", "", "limit_inside")]
#[case("limit_outside = 90.0\n", "", "limit_outside")]
#[case(
    "cal_points = [[0.0, 100], [100.0, 4100]]\n",
    "",
    "cal_points"
)]
#[case(
    "cal_points = [[0.0, 100], [100.0, 4100]]\n",
    "cal_points = [[0.0, 100]]\n",
    "exactly two"
)]
#[case(
    "cal_points = [[0.0, 100], [100.0, 4100]]\n",
    "cal_points = [[0.0, 100], [100.0, 4100], [50.0, 2100]]\n",
    "exactly two"
)]
#[case(
    "cal_points = [[0.0, 100], [100.0, 4100]]\n",
    "cal_points = [[0.0, 100], [100.0]]\n",
    "[distance, raw] pair"
)]
#[case(
    "cal_points = [[0.0, 100], [100.0, 4100]]\n",
    "cal_points = [[0.0, 100], [100.0, 100]]\n",
    "equal raw values"
)]
fn malformed_mot0_is_rejected(#[case] from: &str, #[case] to: &str, #[case] needle: &str) {
    let text = COMPLETE.replacen(from, to, 1);
    assert_ne!(text, COMPLETE, "fixture replacement must apply");
    let file = load_calibration_toml(&text).expect("parse");
    let err = file.validated().expect_err("should reject");
    let msg = format!("{err}");
    assert!(msg.contains("mot0"), "{msg}");
    assert!(msg.contains(needle), "expected {needle:?} in {msg}");
}

#[rstest]
fn empty_file_is_not_a_complete_table() {
    let file = load_calibration_toml("").expect("parse");
    assert!(file.validated().is_err());
}

#[rstest]
fn loads_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.toml");
    fs::write(&path, COMPLETE).unwrap();
    let file = load_calibration_file(&path).expect("load");
    assert!(file.validated().is_ok());
}

#[rstest]
fn missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = load_calibration_file(&path).expect_err("absent file");
    assert!(format!("{err}").contains("absent.toml"));
}
