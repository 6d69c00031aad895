use std::process::ExitCode;

use env_logger::{Builder, Env};
use log::{error, info};

use xfade::Config;

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            info!("loading configuration from {}", path.to_string_lossy());
            Config::load(&path)
        }
        None => Ok(Config::default()),
    };

    match config.and_then(xfade::run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
