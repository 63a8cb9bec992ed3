use clap::Parser;
use std::process::ExitCode;
use xgen_mixin::cli::{run_cli, Cli};
use xgen_mixin::logging::{init_logging_with_config, LogConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose && std::env::var_os("XGEN_LOG_LEVEL").is_none() {
        log_config.log_level = "debug".to_string();
    }
    if let Err(err) = init_logging_with_config(&log_config) {
        eprintln!("warning: {err:#}");
    }

    match run_cli(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
