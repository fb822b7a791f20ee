#![warn(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness
)]

use std::{env, process};

use anyhow::Result;
use cli::{
    CliAction::{Run, ShowHelp, ShowVersion},
    RunOptions, parse, show_help, show_version,
    util::print_error_info,
};
use cnxt::Colorize as _;
use config::{Settings, SettingsError, load_file};
use consts::{ACCESS_TOKEN_ENV, LOG_ENV, VERSION};
use gcperr_lib::{GcpError, client};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod consts;
mod report;
mod sdk;

#[tokio::main]
async fn main() {
    #[cfg(windows)]
    cnxt::control::set_virtual_terminal(true);

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    println!(
        "{} {}\n",
        "gcperr".bright_cyan(),
        format!("v{VERSION}").bright_green()
    );

    let Some(action) = parse() else {
        process::exit(1);
    };

    match action {
        ShowHelp => show_help(),
        ShowVersion => show_version(),
        Run(options) => {
            if let Err(e) = run(options).await {
                error!(error = %e, "run failed");
                println!("{} {:#}", "Error:".bright_red(), e);
                process::exit(1);
            }
        }
    }
}

async fn run(run_options: RunOptions) -> Result<()> {
    let RunOptions {
        api,
        options,
        config,
    } = run_options;

    let file = load_file(config.as_deref())?;
    let settings = match Settings::resolve(
        api,
        options.or(file),
        env::var(ACCESS_TOKEN_ENV).ok(),
    ) {
        Ok(settings) => settings,
        Err(e) => {
            // The missing option belongs after the last argument
            let help = match &e {
                SettingsError::MissingOption(key) => {
                    format!("Add `--{key} <value>` or set it in the configuration file")
                }
                SettingsError::MissingToken => {
                    "Run `gcloud auth print-access-token` to get one".to_string()
                }
            };
            print_error_info(&[env::args().count()], &e.to_string(), Some(&help));
            process::exit(1);
        }
    };

    let client = client::new()?;
    match sdk::run(&client, &settings).await {
        Ok(()) => {
            info!(%api, "call succeeded");
            println!("{}", "The call succeeded, there is no error to explain".bright_green());
        }
        Err(e) => {
            let gerr = GcpError::new(e);
            for line in report::explain(&gerr, api.client_kind(), true) {
                println!("{line}");
            }
        }
    }
    Ok(())
}
