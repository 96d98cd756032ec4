mod args;
mod collect;
mod config;
mod date;
mod error;
mod execute;
mod extract;
mod naming;
mod utils;
mod verify;

use anyhow::{Context, Result};
use args::Args;
use collect::Maildir;
use config::Config;
use env_logger::Env;
use execute::Summary;
use log::{error, info};
use std::fs;
use std::process;

fn main() {
    let config = Config::from(Args::parse_args());

    let log_level = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let code = match do_main(&config) {
        Ok(summary) => {
            info!("{}", summary);
            info!("processing complete");
            summary.exit_code()
        }
        Err(err) => {
            error!("{:#}", err);
            error::exit_code_for(&err)
        }
    };
    process::exit(code);
}

fn do_main(config: &Config) -> Result<Summary> {
    info!("Opening maildir {}", config.maildir.display());
    let mailbox = Maildir::open(&config.maildir).context("cannot open mailbox")?;

    fs::create_dir_all(&config.dest_root)
        .map_err(|source| error::Error::CreateDir {
            path: config.dest_root.clone(),
            source,
        })
        .context("cannot prepare destination")?;

    info!("Sorting attachments into {}", config.dest_root.display());
    let summary = execute::process_mailbox(config, &mailbox).context("cannot list mailbox")?;
    Ok(summary)
}
