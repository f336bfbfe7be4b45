//! jtop - version 0.1.0
//!
//! Interactive terminal process monitor with tracing logging.
//! This is the main entry point that resolves configuration, starts the
//! dashboard and handles subcommands.

mod commands;
mod startup_checks;

use anyhow::Context;
use clap::Parser;
use std::fmt::Display;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tokio::sync::mpsc::unbounded_channel;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

use commands::{command_check, command_snapshot};
use jtop::cli::{Args, Commands, ConfigFormat};
use jtop::config::{resolve_config, show_config, Settings};
use jtop::input::spawn_input_thread;
use jtop::monitor::{Monitor, DEFAULT_PROC_ROOT};
use jtop::scheduler::Scheduler;
use jtop::ui::TerminalUi;
use startup_checks::StartupError;

/// Invalid flags or config file.
const EXIT_CONFIG: u8 = 1;
/// No usable terminal.
const EXIT_TERMINAL: u8 = 2;
/// Unrecoverable failure while running.
const EXIT_RUNTIME: u8 = 3;

/// Prints one diagnostic line and yields the exit status.
fn fail(code: u8, err: impl Display) -> ExitCode {
    eprintln!("jtop: {}", err);
    ExitCode::from(code)
}

/// Initializes tracing to the configured log file.
///
/// The dashboard owns the terminal, so there is no console output; without a
/// log file logging stays disabled.
fn setup_logging(settings: &Settings) -> anyhow::Result<()> {
    let Some(path) = &settings.log_file else {
        return Ok(());
    };
    if settings.log_level == LevelFilter::OFF {
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(settings.log_level)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Logging initialized with level: {}", settings.log_level);
    Ok(())
}

/// Runs the interactive dashboard until the user quits.
async fn run_dashboard(settings: Settings) -> ExitCode {
    let proc_root = Path::new(DEFAULT_PROC_ROOT);
    if let Err(e) = startup_checks::validate_requirements(proc_root) {
        error!("Startup validation failed: {}", e);
        let code = match e {
            StartupError::NotATerminal => EXIT_TERMINAL,
            _ => EXIT_RUNTIME,
        };
        return fail(code, e);
    }

    let ui = match TerminalUi::new() {
        Ok(ui) => ui,
        Err(e) => return fail(EXIT_TERMINAL, format!("cannot initialize terminal: {}", e)),
    };

    let (tx, rx) = unbounded_channel();
    if let Err(e) = spawn_input_thread(tx) {
        // restore the terminal before reporting
        drop(ui);
        return fail(EXIT_TERMINAL, format!("cannot start input thread: {}", e));
    }

    let monitor = Monitor::new(settings.whitelist);
    let mut scheduler = Scheduler::new(monitor, ui, settings.view, settings.delay);
    let result = scheduler.run(rx).await;
    drop(scheduler);

    match result {
        Ok(()) => {
            info!("jtop exiting normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Event loop failed: {}", e);
            fail(EXIT_RUNTIME, e)
        }
    }
}

/// Main application entry point.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => return fail(EXIT_CONFIG, e),
    };

    if args.show_config {
        let format = args.config_format.unwrap_or(ConfigFormat::Yaml);
        return match show_config(&config, format) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(EXIT_CONFIG, e),
        };
    }

    // check reports configuration problems itself
    if let Some(Commands::Check) = args.command {
        return match command_check(Path::new(DEFAULT_PROC_ROOT), &config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(EXIT_CONFIG, e),
        };
    }

    let settings = match Settings::from_config(&config) {
        Ok(settings) => settings,
        Err(e) => return fail(EXIT_CONFIG, e),
    };

    if args.check_config {
        println!("✅ Configuration is valid");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = setup_logging(&settings) {
        return fail(EXIT_CONFIG, format!("{:#}", e));
    }

    if let Some(Commands::Snapshot { iterations }) = args.command {
        let mut monitor = Monitor::new(settings.whitelist.clone());
        return match command_snapshot(&mut monitor, &settings.view, settings.delay, iterations)
            .await
        {
            Ok(table) => {
                print!("{}", table);
                ExitCode::SUCCESS
            }
            Err(e) => fail(EXIT_RUNTIME, format!("{:#}", e)),
        };
    }

    run_dashboard(settings).await
}
