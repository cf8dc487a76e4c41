//! Command grammar: `XDY`.
//!
//! - `X`: one digit, channel 0..=3, group 7 (channels 0+1), group 8 (2+3) or 9 (poll only)
//! - `D`: `I`/`i` for inward, `O`/`o` for outward
//! - `Y`: duration in seconds, integer or fractional, everything after the first two characters

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::channel::Target;
use crate::error::CommandError;

/// Operator help printed after a format error.
pub const COMMAND_FORMAT_HELP: &str = "Command format incorrect. Format is XDY, where X is the channel number 0, 1, 2 or 3 \
(7 = channels 0 and 1, 8 = channels 2 and 3, 9 = read positions only), D is either I for in or O for out \
and Y is the duration in seconds (int or float)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Counter-rotational output.
    Inward,
    /// Rotational output.
    Outward,
}

impl Direction {
    fn from_marker(c: char) -> Option<Self> {
        match c {
            'I' | 'i' => Some(Direction::Inward),
            'O' | 'o' => Some(Direction::Outward),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inward => "inward",
            Direction::Outward => "outward",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated action descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub target: Target,
    pub direction: Direction,
    pub duration: Duration,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse one command token. Pure; the token is not trimmed.
pub fn parse(token: &str) -> Result<Command, CommandError> {
    if token.chars().count() < 3 {
        return Err(CommandError::InvalidFormat(format!(
            "{token:?} is shorter than 3 characters"
        )));
    }
    let mut chars = token.chars();
    let (Some(first), Some(second)) = (chars.next(), chars.next()) else {
        return Err(CommandError::InvalidFormat(format!("{token:?} is incomplete")));
    };

    let target = first
        .to_digit(10)
        .and_then(|d| u8::try_from(d).ok())
        .and_then(Target::from_code)
        .ok_or_else(|| {
            CommandError::InvalidFormat(format!("{first:?} is not a channel (0-3, 7, 8, 9)"))
        })?;
    let direction = Direction::from_marker(second).ok_or_else(|| {
        CommandError::InvalidFormat(format!("{second:?} is not a direction (I or O)"))
    })?;
    let duration = parse_seconds(chars.as_str())?;

    Ok(Command {
        target,
        direction,
        duration,
    })
}

/// Integer first, then fractional. Negative or non-finite values are rejected.
fn parse_seconds(s: &str) -> Result<Duration, CommandError> {
    if let Ok(whole) = s.parse::<i64>() {
        return u64::try_from(whole)
            .map(Duration::from_secs)
            .map_err(|_| CommandError::InvalidDuration(format!("{s:?} is negative")));
    }
    let secs = s
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidDuration(format!("{s:?} is not a number")))?;
    if !secs.is_finite() {
        return Err(CommandError::InvalidDuration(format!("{s:?} is not finite")));
    }
    if secs < 0.0 {
        return Err(CommandError::InvalidDuration(format!("{s:?} is negative")));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| CommandError::InvalidDuration(format!("{s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use rstest::rstest;

    fn ch(i: u8) -> Channel {
        Channel::new(i).unwrap()
    }

    #[test]
    fn single_channel_integer_seconds() {
        let cmd = parse("0I2").unwrap();
        assert_eq!(cmd.target, Target::Single(ch(0)));
        assert_eq!(cmd.direction, Direction::Inward);
        assert_eq!(cmd.duration, Duration::from_secs(2));
    }

    #[test]
    fn group_fractional_seconds() {
        let cmd = parse("7O1.5").unwrap();
        assert_eq!(cmd.target, Target::Pair([ch(0), ch(1)]));
        assert_eq!(cmd.direction, Direction::Outward);
        assert_eq!(cmd.duration, Duration::from_millis(1500));
    }

    #[test]
    fn suffix_is_not_truncated() {
        assert_eq!(parse("3o12").unwrap().duration, Duration::from_secs(12));
        assert_eq!(parse("2i0.25").unwrap().duration, Duration::from_millis(250));
    }

    #[test]
    fn zero_duration_is_legal() {
        assert_eq!(parse("1I0").unwrap().duration, Duration::ZERO);
    }

    #[rstest]
    #[case("")]
    #[case("0I")]
    #[case("4I2")]
    #[case("6O1")]
    #[case("xI2")]
    #[case(" 0I2")]
    #[case("0X2")]
    #[case("0 2")]
    #[case("10I2")]
    fn format_errors(#[case] token: &str) {
        assert!(matches!(parse(token), Err(CommandError::InvalidFormat(_))));
    }

    #[rstest]
    #[case("0Iabc")]
    #[case("0I-1")]
    #[case("0I-0.5")]
    #[case("0I ")]
    #[case("0Inan")]
    #[case("0Iinf")]
    #[case("0I2 ")]
    fn duration_errors(#[case] token: &str) {
        assert!(matches!(parse(token), Err(CommandError::InvalidDuration(_))));
    }

    #[test]
    fn from_str_matches_parse() {
        let cmd: Command = "9I5".parse().unwrap();
        assert_eq!(cmd.target, Target::Poll);
    }
}
