#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(cmd) = roller_core::parse(data) {
        // Anything accepted re-derives from its leading digit.
        assert_eq!(
            data.chars().next().and_then(|c| c.to_digit(10)),
            Some(u32::from(cmd.target.code()))
        );
    }
});
