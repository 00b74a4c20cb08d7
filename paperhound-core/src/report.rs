// Plain-text run summary printed after export

use crate::pipeline::RunOutput;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

pub fn generate_run_report(output: &RunOutput) -> String {
    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("# Summary:\n");
    report.push_str(&format!(
        "  Started:         {}\n",
        output.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    let duration = output.finished_at - output.started_at;
    report.push_str(&format!("  Duration:        {} seconds\n", duration.num_seconds()));
    report.push_str(&format!("  Pages fetched:   {}\n", output.pages_fetched()));
    report.push_str(&format!("  Records:         {}\n", output.records.len()));
    report.push_str(&format!("  Blocks skipped:  {}\n", output.skipped()));

    let duplicates = output.duplicate_urls();
    if duplicates > 0 {
        report.push_str(&format!(
            "  Duplicate URLs:  {} (kept in export)\n",
            duplicates
        ));
    }

    report.push('\n');
    report.push_str(RULE);
    report.push('\n');

    for stats in &output.stats {
        report.push_str(&format!("## {}\n", stats.name));
        report.push_str(&format!(
            "  {} records from {} pages\n",
            stats.records, stats.pages_fetched
        ));
        if stats.skipped > 0 {
            report.push_str(&format!(
                "  {} of {} blocks skipped (missing title or link)\n",
                stats.skipped, stats.blocks
            ));
        }
        if stats.stopped_early {
            report.push_str("  stopped early on an empty page\n");
        }
        report.push('\n');
    }

    report
}
