use std::time::Duration;

use proptest::prelude::*;
use roller_core::{Channel, CommandError, Direction, Target, parse};

proptest! {
    #[test]
    fn integer_commands_parse_exactly(ch in 0u8..4, dir in "[IiOo]", secs in 0u32..100_000) {
        let token = format!("{ch}{dir}{secs}");
        let cmd = parse(&token).unwrap();
        prop_assert_eq!(cmd.target, Target::Single(Channel::new(ch).unwrap()));
        let want = if dir.eq_ignore_ascii_case("i") { Direction::Inward } else { Direction::Outward };
        prop_assert_eq!(cmd.direction, want);
        prop_assert_eq!(cmd.duration, Duration::from_secs(u64::from(secs)));
    }

    #[test]
    fn fractional_commands_parse_to_nearest_duration(ch in 0u8..4, dir in "[IiOo]", millis in 0u32..1_000_000) {
        let secs = f64::from(millis) / 1000.0;
        let token = format!("{ch}{dir}{secs:.3}");
        let cmd = parse(&token).unwrap();
        let got = cmd.duration.as_secs_f64();
        prop_assert!((got - secs).abs() < 1e-6, "{token} -> {got}");
    }

    #[test]
    fn unknown_targets_are_format_errors(code in "[4-6a-zA-Z]", rest in "[IiOo][0-9]{1,3}") {
        let token = format!("{code}{rest}");
        prop_assert!(matches!(parse(&token), Err(CommandError::InvalidFormat(_))));
    }

    #[test]
    fn parse_never_panics(s in "\\PC{0,12}") {
        let _ = parse(&s);
    }
}
