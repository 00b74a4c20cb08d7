use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use crate::logging::{attach_progress_bar, detach_progress_bar};
use indicatif::{ProgressBar, ProgressStyle};
use paperhound_core::config::{PipelineConfig, load_config_from};
use paperhound_core::export::{ExportFormat, export_records};
use paperhound_core::pipeline::{Pipeline, RunOutput};
use paperhound_core::report::generate_run_report;
use paperhound_scraper::{Category, HttpFetcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Everything `scrape` needs once the command line has been resolved.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub config: PipelineConfig,
    pub categories: Vec<String>,
    pub cookie: Option<String>,
    pub output: PathBuf,
    pub format: ExportFormat,
    pub show_progress: bool,
}

/// Load the pipeline config from `path`, or the built-in defaults when no
/// path is given. `~` is expanded.
pub fn load_pipeline_config(path: Option<&str>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let expanded = PathBuf::from(shellexpand::tilde(path).as_ref());
            load_config_from(&expanded)
                .with_context(|| format!("Failed to load config {}", expanded.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Expand the output path and settle on a format: an explicit format wins,
/// then the file extension, then xlsx.
pub fn resolve_output(output: &str, format: Option<&str>) -> Result<(PathBuf, ExportFormat)> {
    let path = PathBuf::from(shellexpand::tilde(output).as_ref());
    let format = match format {
        Some(name) => {
            ExportFormat::from_str(name).ok_or_else(|| anyhow!("Unknown export format '{}'", name))?
        }
        None => ExportFormat::from_path(&path).unwrap_or(ExportFormat::Xlsx),
    };
    Ok((path, format))
}

pub fn scrape_options_from_matches(sub_matches: &ArgMatches, quiet: bool) -> Result<ScrapeOptions> {
    let mut config =
        load_pipeline_config(sub_matches.get_one::<String>("config").map(String::as_str))?;

    if let Some(base_url) = sub_matches.get_one::<Url>("base-url") {
        config.base_url = base_url.to_string();
    }
    if let Some(link_base) = sub_matches.get_one::<String>("link-base") {
        config.link_base = link_base.clone();
    }
    if let Some(delay) = sub_matches.get_one::<u64>("delay-ms") {
        config.page_delay_ms = *delay;
    }
    if let Some(timeout) = sub_matches.get_one::<u64>("timeout") {
        config.timeout_secs = *timeout;
    }
    if sub_matches.get_flag("stop-on-empty") {
        config.stop_on_empty = true;
    }
    config.validate()?;

    let output = sub_matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or(paperhound_core::export::DEFAULT_OUTPUT);
    let (output, format) = resolve_output(
        output,
        sub_matches.get_one::<String>("format").map(String::as_str),
    )?;

    let categories = sub_matches
        .get_many::<String>("category")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    Ok(ScrapeOptions {
        config,
        categories,
        cookie: sub_matches.get_one::<String>("cookie").cloned(),
        output,
        format,
        show_progress: !quiet,
    })
}

fn progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Scrape every selected category, then export the full record set.
/// Nothing is written unless the whole run succeeds.
pub async fn run_scrape(options: &ScrapeOptions) -> Result<RunOutput> {
    let config = &options.config;
    let categories = config.select_categories(&options.categories)?;

    let fetcher = HttpFetcher::builder(&config.base_url)
        .with_cookie(options.cookie.clone())
        .with_timeout(config.timeout_secs)
        .with_user_agent(config.user_agent.clone())
        .build()
        .context("Failed to set up HTTP client")?;
    if !fetcher.has_cookie() {
        warn!("No session cookie configured, requests are sent unauthenticated");
    }

    let progress = progress_bar(
        PipelineConfig::total_pages(&categories),
        options.show_progress,
    );
    let pb = progress.clone();
    let pipeline = Pipeline::from_config(fetcher, config, categories)?.with_progress_callback(
        Arc::new(move |category: &Category, page: u32| {
            pb.set_message(format!("{} page {}", category.name, page));
            pb.inc(1);
        }),
    );

    attach_progress_bar(&progress);
    let result = pipeline.run().await;
    detach_progress_bar();

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            progress.abandon_with_message("aborted");
            return Err(e).context("Scrape aborted, nothing was exported");
        }
    };
    progress.finish_and_clear();

    export_records(&output.records, &options.output, options.format)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    Ok(output)
}

pub async fn handle_scrape(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let options = scrape_options_from_matches(sub_matches, quiet)?;

    if !quiet {
        let selected = options.config.select_categories(&options.categories)?;
        println!(
            "{} Scraping {} categor{} from {}",
            "→".blue(),
            selected.len().to_string().cyan(),
            if selected.len() == 1 { "y" } else { "ies" },
            options.config.base_url.bright_white()
        );
        println!(
            "{} {} pages, {} ms between pages\n",
            "→".blue(),
            PipelineConfig::total_pages(&selected).to_string().cyan(),
            options.config.page_delay_ms
        );
    }

    let output = run_scrape(&options).await?;

    if !quiet {
        println!(
            "{} Exported {} records to {}\n",
            "✓".green().bold(),
            output.records.len().to_string().cyan(),
            options.output.display().to_string().bright_white()
        );
        print!("{}", generate_run_report(&output));
    }
    Ok(())
}

pub fn handle_categories(sub_matches: &ArgMatches) -> Result<()> {
    let config = load_pipeline_config(sub_matches.get_one::<String>("config").map(String::as_str))?;
    config.validate()?;
    print!("{}", format_category_table(&config.categories));
    Ok(())
}

pub fn format_category_table(categories: &[Category]) -> String {
    let name_width = categories
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("CATEGORY".len());
    let tag_width = categories
        .iter()
        .map(|c| c.tag.len())
        .max()
        .unwrap_or(0)
        .max("TAG".len());

    let mut table = format!(
        "{:<name_width$}  {:<tag_width$}  {:>6}\n",
        "CATEGORY", "TAG", "PAGES"
    );
    for category in categories {
        table.push_str(&format!(
            "{:<name_width$}  {:<tag_width$}  {:>6}\n",
            category.name,
            category.tag,
            category.page_count()
        ));
    }
    table.push_str(&format!(
        "{:<name_width$}  {:<tag_width$}  {:>6}\n",
        "",
        "total",
        PipelineConfig::total_pages(categories)
    ));
    table
}
