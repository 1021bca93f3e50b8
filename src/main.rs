//! LinWisp - a simple AI assistant for the Linux desktop
//!
//! Run `linwisp` to type a prompt, `linwisp --record` to speak one, or
//! `linwisp --tray` to live in the system tray.

use clap::Parser;
use linwisp::app::{self, Options, RunStatus, Services};
use linwisp::cli::Cli;
use linwisp::config::AppPaths;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Ctrl-C ends the session cleanly with status 0
#[cfg(unix)]
extern "C" fn on_sigint(_: libc::c_int) {
    const MESSAGE: &[u8] = b"\nExiting LinWisp. Goodbye!\n";
    // Only async-signal-safe calls here
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            MESSAGE.as_ptr() as *const libc::c_void,
            MESSAGE.len(),
        );
        libc::_exit(0);
    }
}

#[cfg(unix)]
fn install_sigint_handler() {
    let handler = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only calls async-signal-safe functions
    if unsafe { libc::signal(libc::SIGINT, handler) } == libc::SIG_ERR {
        tracing::warn!("Failed to install Ctrl-C handler");
    }
}

#[cfg(not(unix))]
fn install_sigint_handler() {}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("linwisp={},warn", log_level))),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = Options::from(&cli);
    if options.console_interrupts() {
        install_sigint_handler();
    }

    let paths = match AppPaths::discover(cli.config.as_deref()) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            return ExitCode::from(RunStatus::Failure.code() as u8);
        }
    };
    tracing::debug!("Config file: {}", paths.config_file.display());

    let mut services = Services::system(paths);
    let status = app::run_cli(&options, &mut services);

    ExitCode::from(status.code() as u8)
}
