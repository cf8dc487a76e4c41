#![cfg(feature = "hardware")]

use roller_hardware::rpi::RpiRig;
use roller_hardware::{PinMap, SpiSettings};
use roller_traits::{FeedbackBus, OutputLine};

// NOTE: These tests only work on a Raspberry Pi with GPIO and SPI0 enabled.
// They exercise open/read/release without asserting on the wired positions.

#[test]
fn rig_opens_and_reads_channel_zero() {
    let mut rig = RpiRig::open(&PinMap::default(), &SpiSettings::default()).expect("open rig");
    let resp = rig.feedback.transfer([0x06, 0x00, 0x00]).expect("spi transfer");
    assert_eq!(resp.len(), 3);
    rig.brakes[0].set_low().expect("brake low");
}

#[test]
fn released_bus_refuses_transfers() {
    let mut rig = RpiRig::open(&PinMap::default(), &SpiSettings::default()).expect("open rig");
    rig.feedback.release().expect("release");
    let err = rig
        .feedback
        .transfer([0x06, 0x00, 0x00])
        .expect_err("released bus should refuse");
    assert!(err.to_string().contains("released"));
}
