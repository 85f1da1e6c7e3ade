//! `sonar`: ultrasonic presence detector CLI.

mod cli;
mod error_fmt;
mod logging;
mod monitor;

use clap::Parser;
use cli::{Cli, Commands};
use eyre::{Result, WrapErr};
use sonar_config::Config;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() {
    // Parse first so --help/--version and usage errors keep clap's own output and exit code.
    let cli = Cli::parse();
    let _ = color_eyre::install();

    if let Err(e) = real_main(&cli) {
        if cli.json {
            eprintln!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        tracing::error!(error = %e, "command failed");
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn real_main(cli: &Cli) -> Result<()> {
    let cfg = load_config(&cli.config)?;
    let _log_guard = logging::init(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match &cli.cmd {
        Commands::Run { cycles, trace } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
                .wrap_err("install Ctrl-C handler")?;
            monitor::run(&cfg, *cycles, trace.as_deref(), cli.json, &shutdown)?;
            Ok(())
        }
        Commands::SelfCheck => monitor::self_check(&cfg, cli.json),
    }
}

/// Read and validate the config; a missing file means stock defaults.
fn load_config(path: &Path) -> Result<Config> {
    let context = || format!("{} in {}", error_fmt::CONFIG_CONTEXT, path.display());
    let cfg = match std::fs::read_to_string(path) {
        Ok(text) => sonar_config::load_toml(&text).wrap_err_with(context)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => return Err(e).wrap_err_with(context),
    };
    cfg.validate().wrap_err_with(context)?;
    Ok(cfg)
}
