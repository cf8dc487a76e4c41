//! Command execution surfaces: one-shot, interactive, poll and self-check.
//!
//! Interrupts are observed only between commands; a drive in progress always
//! runs to completion first.

use std::io::{BufRead, Write};

use crossbeam_channel::{Receiver, select};
use roller_core::{
    COMMAND_FORMAT_HELP, CommandError, DispatchReport, ExecError, MoveOutcome, Roller, Snapshot,
};
use roller_traits::{Clock, FeedbackBus, OutputLine, PwmOutput};
use serde_json::json;

pub const BANNER: &str = "Roller: four-channel actuator control";
pub const PROMPT: &str = "Enter command or ctrl-C to abort-->";
pub const CANCELLED: &str = "User input cancelled. Aborting...";

/// How a session ended, short of a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Done,
    /// At least one token was rejected by the parser.
    Rejected,
    /// End of input or ctrl-C.
    Interrupted,
}

impl Exit {
    pub fn code(self) -> i32 {
        match self {
            Exit::Done | Exit::Interrupted => 0,
            Exit::Rejected => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    pub json: bool,
}

impl Reporter {
    pub fn dispatched(&self, token: &str, report: &DispatchReport) {
        if self.json {
            let moves: Vec<_> = report
                .moves
                .iter()
                .map(|m| match m.outcome {
                    MoveOutcome::Moved => json!({
                        "channel": m.channel.index(),
                        "direction": m.direction.as_str(),
                        "duration_s": m.duration.as_secs_f64(),
                        "outcome": "moved",
                    }),
                    MoveOutcome::Denied(reason) => json!({
                        "channel": m.channel.index(),
                        "direction": m.direction.as_str(),
                        "duration_s": m.duration.as_secs_f64(),
                        "outcome": "denied",
                        "reason": reason.to_string(),
                    }),
                })
                .collect();
            println!(
                "{}",
                json!({
                    "command": token,
                    "target": report.command.target.code(),
                    "moves": moves,
                    "raw": report.snapshot.raw,
                    "distance": report.snapshot.distance,
                })
            );
            return;
        }
        for m in &report.moves {
            let outcome = match m.outcome {
                MoveOutcome::Moved => "moved".to_string(),
                MoveOutcome::Denied(reason) => format!("denied ({reason})"),
            };
            println!(
                "channel {} {} {:.3}s: {outcome}",
                m.channel,
                m.direction,
                m.duration.as_secs_f64()
            );
        }
        self.positions(&report.snapshot);
    }

    pub fn positions(&self, snap: &Snapshot) {
        if self.json {
            println!("{}", json!({ "raw": snap.raw, "distance": snap.distance }));
            return;
        }
        let cols: Vec<String> = (0..4)
            .map(|i| match snap.distance {
                Some(d) => format!("{i}={} ({:.2})", snap.raw[i], d[i]),
                None => format!("{i}={}", snap.raw[i]),
            })
            .collect();
        println!("positions: {}", cols.join(" "));
    }

    pub fn rejected(&self, token: &str, err: &CommandError) {
        if self.json {
            println!(
                "{}",
                json!({ "command": token, "rejected": err.to_string() })
            );
            return;
        }
        println!("{err}");
        if matches!(err, CommandError::InvalidFormat(_)) {
            println!("{COMMAND_FORMAT_HELP}");
        }
    }

    /// End of input or ctrl-C. `eof` breaks the dangling prompt line.
    pub fn cancelled(&self, eof: bool) {
        if self.json {
            println!("{}", json!({ "event": "cancelled" }));
            return;
        }
        if eof {
            println!();
        }
        println!("{CANCELLED}");
    }
}

/// Dispatch one token, reporting recoverable errors. `Ok(false)` means rejected.
fn step<L, P, B, C>(
    roller: &mut Roller<L, P, B, C>,
    token: &str,
    out: &Reporter,
) -> eyre::Result<bool>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    match roller.execute(token) {
        Ok(report) => {
            out.dispatched(token, &report);
            Ok(true)
        }
        Err(ExecError::Recoverable(e)) => {
            tracing::warn!(command = token, error = %e, "command rejected");
            out.rejected(token, &e);
            Ok(false)
        }
        Err(ExecError::Fatal(e)) => Err(e.into()),
    }
}

/// Run `tokens` in order. Rejected tokens are reported and skipped.
pub fn run_commands<L, P, B, C>(
    roller: &mut Roller<L, P, B, C>,
    tokens: &[String],
    interrupts: &Receiver<()>,
    out: &Reporter,
) -> eyre::Result<Exit>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    let mut rejected = false;
    for token in tokens {
        if interrupts.try_recv().is_ok() {
            out.cancelled(false);
            return Ok(Exit::Interrupted);
        }
        rejected |= !step(roller, token.trim(), out)?;
    }
    Ok(if rejected { Exit::Rejected } else { Exit::Done })
}

/// Lines from stdin on a helper thread; `None` marks end of input.
fn spawn_stdin_reader() -> eyre::Result<Receiver<Option<String>>> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut lines = stdin.lock().lines();
            loop {
                let next = match lines.next() {
                    Some(Ok(line)) => Some(line),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        None
                    }
                    None => None,
                };
                let eof = next.is_none();
                if tx.send(next).is_err() || eof {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Read-eval loop until end of input or ctrl-C.
pub fn shell<L, P, B, C>(
    roller: &mut Roller<L, P, B, C>,
    interrupts: &Receiver<()>,
    out: &Reporter,
) -> eyre::Result<Exit>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    let lines = spawn_stdin_reader()?;
    if !out.json {
        println!("{BANNER}");
    }
    loop {
        if interrupts.try_recv().is_ok() {
            out.cancelled(false);
            return Ok(Exit::Interrupted);
        }
        if !out.json {
            print!("{PROMPT}");
            std::io::stdout().flush()?;
        }
        let line = select! {
            recv(lines) -> msg => msg.ok().flatten(),
            recv(interrupts) -> _ => None,
        };
        let Some(line) = line else {
            out.cancelled(true);
            return Ok(Exit::Interrupted);
        };
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        step(roller, token, out)?;
    }
}

pub fn poll<L, P, B, C>(roller: &mut Roller<L, P, B, C>, out: &Reporter) -> eyre::Result<Exit>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    let snap = roller.snapshot()?;
    out.positions(&snap);
    Ok(Exit::Done)
}

/// The rig was already re-initialised by the builder; read every channel and
/// tear down, reporting any fault.
pub fn self_check<L, P, B, C>(
    roller: &mut Roller<L, P, B, C>,
    out: &Reporter,
) -> eyre::Result<Exit>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
    C: Clock,
{
    let snap = roller.snapshot()?;
    roller.shutdown()?;
    let speed_hz = roller.speed().hz();
    let limits = roller.calibration().is_enabled();
    if out.json {
        println!(
            "{}",
            json!({
                "self_check": "ok",
                "raw": snap.raw,
                "speed_hz": speed_hz,
                "soft_limits": limits,
            })
        );
    } else {
        out.positions(&snap);
        let limits = if limits { "on" } else { "off" };
        println!("self-check ok (speed {speed_hz} Hz, soft limits {limits})");
    }
    Ok(Exit::Done)
}
