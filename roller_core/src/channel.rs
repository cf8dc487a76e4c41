//! Channels, command targets and the fixed channel wiring table.

use std::fmt;

/// A physical actuator, 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
    pub const ALL: [Channel; 4] = [Channel(0), Channel(1), Channel(2), Channel(3)];

    pub const fn new(index: u8) -> Option<Self> {
        if index < 4 { Some(Channel(index)) } else { None }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Select lines and brake for this channel.
    #[inline]
    pub const fn wiring(self) -> ChannelWiring {
        WIRING[self.0 as usize]
    }

    /// Channel-select byte of the ADC read frame (0x00, 0x40, 0x80, 0xC0).
    #[inline]
    pub const fn adc_select(self) -> u8 {
        self.0 << 6
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Line levels that route the shared drive pair to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelWiring {
    pub driver_select: bool,
    pub motor_select: bool,
    /// Index into the brake lines.
    pub brake: usize,
}

const WIRING: [ChannelWiring; 4] = [
    ChannelWiring {
        driver_select: false,
        motor_select: false,
        brake: 0,
    },
    ChannelWiring {
        driver_select: false,
        motor_select: true,
        brake: 1,
    },
    ChannelWiring {
        driver_select: true,
        motor_select: false,
        brake: 2,
    },
    ChannelWiring {
        driver_select: true,
        motor_select: true,
        brake: 3,
    },
];

/// What a command addresses: one channel, a fixed pair, or nothing (poll).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Single(Channel),
    Pair([Channel; 2]),
    Poll,
}

pub const GROUP_LOW: u8 = 7;
pub const GROUP_HIGH: u8 = 8;
pub const POLL: u8 = 9;

impl Target {
    /// Decode the leading digit of a command.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0..=3 => Channel::new(code).map(Target::Single),
            GROUP_LOW => Some(Target::Pair([Channel(0), Channel(1)])),
            GROUP_HIGH => Some(Target::Pair([Channel(2), Channel(3)])),
            POLL => Some(Target::Poll),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Target::Single(ch) => ch.0,
            Target::Pair([first, _]) if first.0 == 0 => GROUP_LOW,
            Target::Pair(_) => GROUP_HIGH,
            Target::Poll => POLL,
        }
    }

    /// Channels to drive, in execution order.
    pub fn channels(&self) -> &[Channel] {
        match self {
            Target::Single(ch) => std::slice::from_ref(ch),
            Target::Pair(pair) => pair,
            Target::Poll => &[],
        }
    }
}
