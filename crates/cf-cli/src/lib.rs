use std::ffi::OsString;

use cf_core::FlowError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod commands;
mod error_map;
mod models;
mod payload_store;
mod source_loader;

pub(crate) use cli_args::{Cli, Mode, NavigateArgs, NormalizeArgs, SimulateArgs, ValidateArgs};
pub(crate) use error_map::{
    emit_error, map_cli_json_write, map_cli_out_write, map_cli_roster_invalid,
    map_cli_roster_read, map_cli_source_path, map_cli_source_read,
};
pub(crate) use models::{BreadcrumbView, NavigationResult, ScriptCheck};
pub(crate) use payload_store::write_payload;
pub(crate) use source_loader::{
    load_roster, read_payload_file, read_payloads_from_dir, resolve_scripts_dir,
    resolve_source_file, DirectoryScriptFetcher,
};

const LOG_ENV: &str = "CF_LOG";

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    init_tracing();
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

/// Logs go to stderr so stdout stays a line protocol. Repeated calls are no-ops.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<i32, FlowError> {
    match cli.command {
        Mode::Validate(args) => commands::run_validate(args),
        Mode::Normalize(args) => commands::run_normalize(args),
        Mode::Simulate(args) => commands::run_simulate(args),
        Mode::Navigate(args) => commands::run_navigate(args),
    }
}
