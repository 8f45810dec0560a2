//! Drawer TUI binary.
//!
//! Opens a storefront page with a slide-out navigation menu. Closing the menu
//! runs the exit transitions on timers and dismisses it once every one of
//! them has reported completion.

use std::{fs::File, path::PathBuf, sync::Mutex, time::Duration};

use clap::{Parser, ValueEnum};
use drawer_core::{MenuConfig, MenuController, SignalPolicy, Timeline, TransitionId};
use drawer_tui::{Runtime, TerminalDriver, TerminalOptions, terminal};
use tracing_subscriber::EnvFilter;

/// Counting policy selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Each transition counts once per close.
    PerSource,
    /// Every signal counts.
    Counted,
}

impl From<Policy> for SignalPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::PerSource => Self::PerSource,
            Policy::Counted => Self::Counted,
        }
    }
}

/// Slide-out menu demo.
#[derive(Parser, Debug)]
#[command(name = "drawer-tui", version, about)]
struct Args {
    /// Multiply every transition delay and duration by this factor.
    #[arg(long, default_value_t = 1.0, value_parser = parse_speed)]
    speed: f64,

    /// How completion signals are counted.
    #[arg(long, value_enum, default_value_t = Policy::PerSource)]
    policy: Policy,

    /// Exit transition (by position) whose runner never reports completion.
    /// May be repeated.
    #[arg(long = "drop-transition", value_name = "ID", value_parser = parse_transition)]
    drop_transition: Vec<u8>,

    /// Redraw interval in milliseconds.
    #[arg(long, default_value_t = 33, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,

    /// Write logs to this file. The terminal is owned by the UI, so nothing
    /// is logged without it.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn parse_speed(value: &str) -> Result<f64, String> {
    let speed: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(format!("speed must be a positive number, got {value}"))
    }
}

fn parse_transition(value: &str) -> Result<u8, String> {
    let id: u8 = value.parse().map_err(|e| format!("{e}"))?;
    let count = Timeline::exit_default().len();
    if usize::from(id) < count {
        Ok(id)
    } else {
        Err(format!("exit transitions are numbered 0 to {}, got {id}", count - 1))
    }
}

impl Args {
    fn menu_config(&self) -> MenuConfig {
        let defaults = MenuConfig::with_policy(self.policy.into());
        MenuConfig {
            exit: defaults.exit.scaled(self.speed),
            entry: defaults.entry.scaled(self.speed),
            ..defaults
        }
    }

    fn terminal_options(&self) -> TerminalOptions {
        TerminalOptions {
            frame_interval: Duration::from_millis(self.frame_ms),
            dropped: self.drop_transition.iter().copied().map(TransitionId::new).collect(),
        }
    }
}

fn init_logging(path: Option<&PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let menu = MenuController::new(args.menu_config())?;
    tracing::info!(expected = menu.config().expected(), policy = ?menu.config().policy, "starting");

    terminal::install_panic_hook();
    let driver = TerminalDriver::new(args.terminal_options())?;
    let mut runtime = Runtime::new(driver, menu);
    runtime.run().await?;

    Ok(())
}
