use std::env::args;

use cnxt::Colorize as _;
use unicode_width::UnicodeWidthStr as _;

use crate::consts::EXE_NAME;

pub const HELP_ARGS: [&str; 3] = ["help", "--help", "-h"];

/// Print error information with highlighted arguments and suggestions.
///
/// `error_arg_nums` are positions in the command line, the executable
/// being 0.
pub fn print_error_info(
    error_arg_nums: &[usize],
    error: &str,
    help: Option<&str>,
) {
    let args: Vec<String> = args().skip(1).collect();
    for line in format_error_info(&args, error_arg_nums, error, help) {
        println!("{line}");
    }
}

/// Build the lines of [`print_error_info`] for the arguments `args`
/// (without the executable).
pub fn format_error_info(
    args: &[String],
    error_arg_nums: &[usize],
    error: &str,
    help: Option<&str>,
) -> Vec<String> {
    let mut content = Vec::new();
    content.push(format!("{}", "Command line argument error".bright_red().bold()));

    content.push(format!(
        "{} {} {}",
        ">".bright_cyan(),
        EXE_NAME.as_str().bright_green(),
        args.iter()
            .enumerate()
            .map(|(i, arg)| {
                if error_arg_nums.contains(&(i + 1)) {
                    arg.bright_cyan().to_string()
                } else {
                    arg.to_string()
                }
            })
            .collect::<Vec<String>>()
            .join(" "),
    ));

    // "> " + executable name, then one space before every argument
    let mut carets_line = " ".repeat(2 + EXE_NAME.as_str().width());
    let mut end_of_error = carets_line.len();
    for (i, arg) in args.iter().enumerate() {
        carets_line.push(' ');
        let mark = if error_arg_nums.contains(&(i + 1)) { '^' } else { ' ' };
        carets_line.extend(std::iter::repeat_n(mark, arg.width()));
        if mark == '^' {
            end_of_error = carets_line.len();
        }
    }
    // Point past the end of the line when the missing argument is the next one
    if error_arg_nums.iter().any(|n| *n > args.len()) {
        carets_line.push_str(" ^");
        end_of_error = carets_line.len();
    }
    carets_line.truncate(end_of_error);

    content.push(format!("{} = {}", carets_line, error.bright_yellow()));

    if let Some(help) = help {
        content.push(format!(
            "{}+ {}",
            " ".repeat(end_of_error + 1),
            help.bright_green()
        ));
    }

    content
}

/// Format one line of a help listing.
pub fn help_print_subcommand(subcommand: &str, description: &str) -> String {
    let reserve_space = 40usize.saturating_sub(subcommand.width()).max(1);
    let is_help = subcommand == "help";
    format!(
        "   {}{}{}",
        subcommand.bright_cyan().bright_black_if(is_help),
        " ".repeat(reserve_space),
        description.bright_black_if(is_help)
    )
}
