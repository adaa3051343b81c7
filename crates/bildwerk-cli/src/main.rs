// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — deterministic raster transforms from the command line.
//
// Entry point. Initialises logging, loads the processing configuration and
// dispatches the requested subcommand.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use bildwerk_core::{BildwerkError, ProcessorConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "bildwerk", version, about = "Rotate, resize, denoise, binarize, deskew and join images")]
struct Cli {
    /// JSON configuration file; defaults apply when it is missing or invalid
    #[arg(long, global = true, default_value = "bildwerk.json")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json);

    tracing::info!(command = ?cli.command, "Bildwerk starting");
    let config = ProcessorConfig::load_or_default(&cli.config);

    match commands::run(&cli.command, &config) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log_failure(&err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only the result line.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn log_failure(err: &BildwerkError) {
    match err {
        BildwerkError::InvalidInput { path } | BildwerkError::InvalidOutput { path } => {
            tracing::error!(kind = err.kind(), path = %path.display(), "{err}");
        }
        BildwerkError::Processing { op, .. } | BildwerkError::InvalidParameter { op, .. } => {
            tracing::error!(kind = err.kind(), op, "{err}");
        }
        _ => tracing::error!(kind = err.kind(), "{err}"),
    }
}
