pub mod commands;
pub mod handlers;
pub mod logging;

// Re-export commonly used handler functions for convenience
pub use handlers::{ScrapeOptions, load_pipeline_config, resolve_output, run_scrape};

pub use commands::command_argument_builder;
