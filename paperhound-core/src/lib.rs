pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod report;

use colored::Colorize;

pub use error::{CoreError, Result};

pub fn print_banner() {
    println!(
        "{}",
        r#"
                                   __                              __
    ____  ____ _____  ___  _____/ /_  ____  __  ______  ____/ /
   / __ \/ __ `/ __ \/ _ \/ ___/ __ \/ __ \/ / / / __ \/ __  /
  / /_/ / /_/ / /_/ /  __/ /  / / / / /_/ / /_/ / / / / /_/ /
 / .___/\__,_/ .___/\___/_/  /_/ /_/\____/\__,_/_/ /_/\__,_/
/_/         /_/
"#
        .bright_cyan()
    );
    println!(
        "  {} {}\n",
        "exam archive scraper".bright_white().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
