use colored::Colorize;
use paperhound::command_argument_builder;
use paperhound::handlers::{handle_categories, handle_scrape};
use paperhound::logging::init_tracing;
use paperhound_core::print_banner;
use tracing::debug;

#[tokio::main]
async fn main() {
    // Values already present in the environment take precedence over .env
    dotenvy::dotenv().ok();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(quiet);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("scrape", primary_command)) => handle_scrape(primary_command, quiet).await,
        Some(("categories", primary_command)) => handle_categories(primary_command),
        // No subcommand provided, just show the banner
        None => Ok(()),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        debug!("{:?}", e);
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
