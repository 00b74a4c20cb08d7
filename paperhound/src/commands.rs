use clap::{arg, command};
use paperhound_core::config::COOKIE_ENV;
use paperhound_core::export::DEFAULT_OUTPUT;
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("paperhound")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("paperhound")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner, progress bar and summary report")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("scrape")
                .about(
                    "Page through every configured category of the exam archive and export all \
                listings to a single file.",
                )
                .arg(
                    arg!(--"config" <PATH>)
                        .required(false)
                        .help("Pipeline config file (TOML or JSON): site, selectors, categories"),
                )
                .arg(
                    arg!(--"cookie" <COOKIE>)
                        .required(false)
                        .help("Session cookie sent with every request")
                        .env(COOKIE_ENV)
                        .hide_env_values(true),
                )
                .arg(
                    arg!(--"base-url" <URL>)
                        .required(false)
                        .help("Listing endpoint; tag and paged query parameters are appended")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"link-base" <PREFIX>)
                        .required(false)
                        .help("Prefix prepended to every extracted link"),
                )
                .arg(
                    arg!(-c --"category" <NAME>)
                        .required(false)
                        .help("Only scrape this category (name or tag). Repeatable.")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Output file, overwritten on each run")
                        .default_value(DEFAULT_OUTPUT),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format (default: from the output extension, else xlsx)")
                        .value_parser(["xlsx", "csv", "jsonl"]),
                )
                .arg(
                    arg!(--"delay-ms" <MILLIS>)
                        .required(false)
                        .help("Pause after every page request, in milliseconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    arg!(--"stop-on-empty")
                        .required(false)
                        .help("End a category at the first page without listings")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("categories")
                .about("List the configured categories and their page bounds")
                .arg(
                    arg!(--"config" <PATH>)
                        .required(false)
                        .help("Pipeline config file (TOML or JSON)"),
                ),
        )
}
