mod cli;
mod error_fmt;
mod rig;
mod session;

use std::path::Path;

use clap::Parser;
use crossbeam_channel::Receiver;
use eyre::{Result, WrapErr};
use roller_core::{CalibrationTable, HardwareContext, MotorSpeed, Roller, RollerError, SamplerCfg};
use roller_traits::{FeedbackBus, OutputLine, PwmOutput};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::session::{Exit, Reporter};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    match real_main(cli) {
        Ok(exit) => std::process::exit(exit.code()),
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            std::process::exit(exit_code_for_error(&e));
        }
    }
}

fn real_main(cli: Cli) -> Result<Exit> {
    color_eyre::install()?;

    let cfg = load_config(cli.config.as_deref())?;
    cfg.validate().wrap_err("invalid configuration")?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    // Calibration is checked before any hardware is opened.
    let calibration = match &cli.calibration {
        Some(path) => load_calibration(path)?,
        None => CalibrationTable::empty(),
    };
    let mut motor = cfg.motor.clone();
    if let Some(hz) = cli.speed {
        motor.speed_hz = hz;
    }
    let speed = MotorSpeed::try_from(&motor)?;
    let sampler = SamplerCfg::from(&cfg.feedback);
    let interrupts = install_interrupt_handler()?;
    let out = Reporter { json: cli.json };

    let engine = Engine {
        calibration,
        speed,
        sampler,
    };
    open_and_run(&cfg, cli.sim, engine, &cli.cmd, &interrupts, &out)
}

/// Engine settings resolved from config, flags and the calibration file.
struct Engine {
    calibration: CalibrationTable,
    speed: MotorSpeed,
    sampler: SamplerCfg,
}

#[cfg(feature = "hardware")]
fn open_and_run(
    cfg: &roller_config::Config,
    sim: bool,
    engine: Engine,
    cmd: &Commands,
    interrupts: &Receiver<()>,
    out: &Reporter,
) -> Result<Exit> {
    if sim {
        let hw = rig::open_sim(rig::sim_raw_from_env()?);
        return run_on(hw, engine, cmd, interrupts, out);
    }
    let hw = rig::open_rpi(cfg)?;
    run_on(hw, engine, cmd, interrupts, out)
}

#[cfg(not(feature = "hardware"))]
fn open_and_run(
    _cfg: &roller_config::Config,
    sim: bool,
    engine: Engine,
    cmd: &Commands,
    interrupts: &Receiver<()>,
    out: &Reporter,
) -> Result<Exit> {
    if !sim {
        tracing::info!("built without hardware support; using the simulated rig");
    }
    let hw = rig::open_sim(rig::sim_raw_from_env()?);
    run_on(hw, engine, cmd, interrupts, out)
}

/// Build the engine on `hw`, run the subcommand, then tear down whatever happened.
fn run_on<L, P, B>(
    hw: HardwareContext<L, P, B>,
    engine: Engine,
    cmd: &Commands,
    interrupts: &Receiver<()>,
    out: &Reporter,
) -> Result<Exit>
where
    L: OutputLine,
    P: PwmOutput,
    B: FeedbackBus,
{
    let mut roller = Roller::builder()
        .with_hardware(hw)
        .with_calibration(engine.calibration)
        .with_speed(engine.speed)
        .with_sampler(engine.sampler)
        .build()?;

    let result = match cmd {
        Commands::Run { commands } => session::run_commands(&mut roller, commands, interrupts, out),
        Commands::Shell => session::shell(&mut roller, interrupts, out),
        Commands::Poll => session::poll(&mut roller, out),
        Commands::SelfCheck => session::self_check(&mut roller, out),
    };
    let teardown = roller.shutdown();
    let exit = result?;
    teardown?;
    Ok(exit)
}

fn load_config(path: Option<&Path>) -> Result<roller_config::Config> {
    let (path, explicit) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG), false),
    };
    if !explicit && !path.exists() {
        return Ok(roller_config::Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    roller_config::load_toml(&text).wrap_err_with(|| format!("parse config TOML {}", path.display()))
}

fn load_calibration(path: &Path) -> Result<CalibrationTable> {
    let file = roller_config::load_calibration_file(path)
        .map_err(|e| RollerError::CalibrationMalformed(format!("{e:#}")))?;
    let table = CalibrationTable::try_from(&file)?;
    tracing::info!(path = %path.display(), "calibration loaded; soft limits active");
    Ok(table)
}

/// Ctrl-C is turned into a message so it is only acted on between commands.
fn install_interrupt_handler() -> Result<Receiver<()>> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })
    .wrap_err("install ctrl-C handler")?;
    Ok(rx)
}

fn init_tracing(json: bool, level: Option<&str>, logging: &roller_config::Logging) -> Result<()> {
    let level = level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let file = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(filter)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
