//! Stats command implementation

use anyhow::Result;
use std::path::Path;

use voxdesk::stats::StatsRecorder;

/// Print dashboard figures and words per day from the usage directory
pub fn stats_command(usage_dir: &Path, days: u32, json: bool) -> Result<()> {
    let stats = StatsRecorder::new(usage_dir);
    let dashboard = stats.dashboard()?;
    let chart = stats.chart(days, chrono::Local::now().date_naive())?;

    if json {
        let report = serde_json::json!({
            "dashboard": dashboard,
            "daily_words": chart,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Words dictated: {}", dashboard.total_words);
    println!("Average speed:  {} wpm", dashboard.average_speed);
    println!("Time saved:     {:.2} min", dashboard.time_saved);
    println!();
    println!("Last {} days:", chart.len());
    for (day, words) in &chart {
        println!("  {}  {:>6}", day, words);
    }
    Ok(())
}
