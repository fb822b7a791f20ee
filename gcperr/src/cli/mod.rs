pub mod util;

use std::{env::args, path::PathBuf};

use cnxt::Colorize;

use crate::{
    cli::util::{HELP_ARGS, help_print_subcommand, print_error_info},
    config::{DEFAULT_CONFIG_FILE, DEFAULT_OBJECT, DEFAULT_ZONE, Options},
    consts::{
        ACCESS_TOKEN_ENV, EXE_NAME, LOG_ENV, TARGET_ARCH_DISPLAY,
        TARGET_OS_DISPLAY, VERSION,
    },
    sdk::Api,
};

#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    ShowHelp,
    ShowVersion,
    Run(RunOptions),
}

#[derive(Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub api: Api,
    pub options: Options,
    /// Explicit `--config` path.
    pub config: Option<PathBuf>,
}

/// A command line mistake, located by its argument position (the first
/// argument after the executable being 1).
#[derive(Debug, PartialEq, Eq)]
pub struct ArgError {
    pub position: usize,
    pub message: String,
    pub help: Option<String>,
}

impl ArgError {
    fn new(position: usize, message: impl Into<String>, help: Option<String>) -> Self {
        Self {
            position,
            message: message.into(),
            help,
        }
    }
}

pub fn parse() -> Option<CliAction> {
    let args: Vec<String> = args().skip(1).collect();
    match parse_args(&args) {
        Ok(action) => Some(action),
        Err(e) => {
            print_error_info(&[e.position], &e.message, e.help.as_deref());
            None
        }
    }
}

pub fn parse_args(args: &[String]) -> Result<CliAction, ArgError> {
    let Some(command) = args.first() else {
        return Ok(CliAction::ShowHelp);
    };

    match command.as_str() {
        arg if HELP_ARGS.contains(&arg) => {
            no_more_args(args).map(|()| CliAction::ShowHelp)
        }
        "version" => no_more_args(args).map(|()| CliAction::ShowVersion),
        name => Api::from_name(name).map_or_else(
            || {
                Err(ArgError::new(
                    1,
                    "This is not a valid command",
                    Some(format!("Type `{} help` for help", *EXE_NAME)),
                ))
            },
            |api| parse_run(api, &args[1..]),
        ),
    }
}

fn no_more_args(args: &[String]) -> Result<(), ArgError> {
    if args.len() == 1 {
        Ok(())
    } else {
        Err(ArgError::new(
            2,
            "This command does not support more parameters",
            Some("Remove extra parameters and try again".to_string()),
        ))
    }
}

/// Parse `--key value` pairs following the API name.
fn parse_run(api: Api, args: &[String]) -> Result<CliAction, ArgError> {
    let mut options = Options::default();
    let mut config = None;

    let mut i = 0;
    while i < args.len() {
        // Position of args[i] on the command line
        let position = i + 2;
        let Some(key) = args[i].strip_prefix("--") else {
            return Err(ArgError::new(
                position,
                "Expected an option starting with `--`",
                Some(format!("Type `{} help` for the list of options", *EXE_NAME)),
            ));
        };

        let value = match args.get(i + 1) {
            Some(value) if !value.starts_with("--") => value.clone(),
            _ => {
                return Err(ArgError::new(
                    position + 1,
                    format!("Missing value for `--{key}`"),
                    Some(format!("Add a value after `--{key}`")),
                ));
            }
        };

        if key == "config" {
            config = Some(PathBuf::from(value));
        } else if let Some(slot) = options.slot(key) {
            *slot = Some(value);
        } else {
            return Err(ArgError::new(
                position,
                "This is not a valid option",
                Some(format!(
                    "Valid options: --{}, --config",
                    Options::KEYS.join(", --")
                )),
            ));
        }
        i += 2;
    }

    Ok(CliAction::Run(RunOptions {
        api,
        options,
        config,
    }))
}

// Show the main help message
pub fn show_help() {
    let mut help: Vec<String> = Vec::new();
    help.push(format!(
        "{} {} {} {}\n",
        "Usage:".bright_green(),
        EXE_NAME.bright_cyan(),
        "[command]".bright_yellow(),
        "[--option value]...".bright_blue(),
    ));

    help.push(format!("{}", "Available commands:".bright_green()));
    for api in Api::ALL {
        help.push(help_print_subcommand(api.name(), api.description()));
    }
    help.push(help_print_subcommand("version", "Show version information"));
    help.push(help_print_subcommand("help", "Show this help message"));

    help.push(format!("\n{}", "Options:".bright_green()));
    let options: [(&str, String); 11] = [
        ("--project <id>", "Project of the resources".into()),
        ("--zone <zone>", format!("Compute Engine zone, default {DEFAULT_ZONE}")),
        ("--bucket <name>", "Cloud Storage bucket".into()),
        ("--object <name>", format!("Cloud Storage object, default {DEFAULT_OBJECT}")),
        ("--topic <name>", "Pub/Sub topic to create".into()),
        ("--quota-project <id>", "Project billed for the Pub/Sub calls".into()),
        ("--scope <scope>", "Cloud Asset analysis scope, e.g. projects/123".into()),
        ("--resource <name>", "Full resource name to analyze".into()),
        ("--identity <member>", "Identity to analyze, e.g. user:me@example.com".into()),
        ("--token <token>", format!("Access token, default from {ACCESS_TOKEN_ENV}")),
        ("--config <file>", format!("TOML file with the options, default {DEFAULT_CONFIG_FILE}")),
    ];
    for (option, description) in &options {
        help.push(help_print_subcommand(option, description));
    }

    help.push(format!("\n{}:", "Examples".bright_green()));
    help.push(format!(
        "   {} {} {}",
        EXE_NAME.bright_cyan(),
        "pubsub".bright_magenta(),
        "--project my-project --topic my-topic".bright_yellow()
    ));
    help.push(format!(
        "   {}",
        "List topics of `my-project`, then create `my-topic`".bright_magenta()
    ));

    help.push(format!("\n{}:", "Environment".bright_green()));
    help.push(format!(
        "   {}  {}",
        "GOOGLE_ENABLE_ERROR_DETAIL".bright_cyan(),
        "Render error details by default".bright_white()
    ));
    help.push(format!(
        "   {}  {}",
        LOG_ENV.bright_cyan(),
        "Log filter, default `warn`".bright_white()
    ));

    for line in help {
        println!("{line}");
    }
}

pub fn show_version() {
    println!(
        "{} {} {} {} {}",
        EXE_NAME.bright_cyan(),
        format!("v{VERSION}").bright_green(),
        "-".bright_white(),
        TARGET_OS_DISPLAY.bright_magenta(),
        TARGET_ARCH_DISPLAY.bright_yellow()
    );
}
