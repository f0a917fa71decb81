//! Output Formatting and Display Management
//!
//! Renders analysis results either as colored terminal output or as JSON.
//!
//! ## Terminal Output
//!
//! For every tag (alphabetical) the report shows how often it was recorded, then one
//! line per wanted metric with the baseline and the averages for the day before, the
//! day itself and the day after. Differences from the baseline are colored green when
//! positive and red when negative; averages without data show as `n/a`.
//!
//! ## JSON Output
//!
//! ```json
//! {
//!   "range": { "start_date": "2022-01-01", "end_date": "2022-06-30", "formula": "mean" },
//!   "wanted_scores": { "SLEEP": ["score"], "READY": ["score"], "ACTIVITY": [] },
//!   "tags_days": { "cold": ["2022-01-02"] },
//!   "tags_data": [ { "day": "2022-01-02", "tags": ["cold"], "text": "" } ],
//!   "averages": {
//!     "cold": {
//!       "SLEEP": {
//!         "score": {
//!           "average_all": 80.0,
//!           "offsets": { "-1": { "average": 70.0, "all_diff": -10.0 } }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use crate::analyzer::AnalysisReport;
use crate::models::{MetricAverages, OffsetAverage, TagDayMap, OFFSETS};
use crate::range::RangeQuery;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

pub struct ReportDisplay {
    json_pretty: bool,
}

impl Default for ReportDisplay {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportDisplay {
    pub fn new(json_pretty: bool) -> Self {
        Self { json_pretty }
    }

    pub fn display_report(&self, report: &AnalysisReport, json_output: bool) -> Result<()> {
        if json_output {
            println!("{}", self.to_json(report)?);
            return Ok(());
        }

        print_header("Oura Tag Report", &report.range);
        println!(
            "{} {} tags • {} entries • formula: {}\n",
            "📊".bright_yellow(),
            report.tags_days.len().to_string().bright_white().bold(),
            report.tags_data.len().to_string().bright_white().bold(),
            report.range.formula.to_string().bright_white().bold()
        );

        if report.tags_days.is_empty() {
            println!("No tags found in the selected range.");
            return Ok(());
        }

        for (tag, days) in &report.tags_days {
            println!(
                "{} {} ({} days)",
                "🏷".bright_blue(),
                tag.bright_white().bold(),
                days.len()
            );

            let Some(categories) = report.averages.tags.get(tag) else {
                continue;
            };
            for (category, metrics) in categories {
                for (metric, averages) in metrics {
                    println!(
                        "   {:<32} {}",
                        format!("{}:{}", category, metric).bright_cyan(),
                        format_metric_line(averages)
                    );
                }
            }
            println!();
        }

        Ok(())
    }

    pub fn display_tags(&self, query: &RangeQuery, tags_days: &TagDayMap, json_output: bool) -> Result<()> {
        if json_output {
            let output = serde_json::json!({ "range": query, "tags_days": tags_days });
            println!("{}", self.to_json(&output)?);
            return Ok(());
        }

        print_header("Oura Tags", query);
        println!(
            "{} {} distinct tags\n",
            "📊".bright_yellow(),
            tags_days.len().to_string().bright_white().bold()
        );

        for (tag, days) in tags_days {
            let days: Vec<String> = days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
            println!(
                "{} {} ({}): {}",
                "🏷".bright_blue(),
                tag.bright_white().bold(),
                days.len().to_string().bright_yellow(),
                days.join(", ")
            );
        }

        Ok(())
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let rendered = if self.json_pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.context("Failed to serialize report to JSON")
    }
}

fn print_header(title: &str, query: &RangeQuery) {
    println!("\n{}", "=".repeat(80).bright_cyan());
    println!("{}", title.bright_white().bold());
    println!(
        "{} → {}",
        query.start_date.format("%Y-%m-%d"),
        query.end_date.format("%Y-%m-%d")
    );
    println!("{}", "=".repeat(80).bright_cyan());
}

fn offset_label(offset: i64) -> &'static str {
    match offset {
        -1 => "day before",
        0 => "same day",
        _ => "day after",
    }
}

/// Baseline followed by each offset average and its difference
pub fn format_metric_line(averages: &MetricAverages) -> String {
    let mut parts = vec![format!("baseline {:.2}", averages.average_all)];

    for offset in OFFSETS {
        let entry = averages.offset(offset).copied().unwrap_or(OffsetAverage::ABSENT);
        parts.push(format!("{} {}", offset_label(offset), format_offset(&entry)));
    }

    parts.join(" | ")
}

fn format_offset(entry: &OffsetAverage) -> String {
    match (entry.average, entry.all_diff) {
        (Some(average), Some(diff)) => {
            let diff_text = format!("{:+.2}", diff);
            let diff_colored = if diff > 0.0 {
                diff_text.bright_green()
            } else if diff < 0.0 {
                diff_text.bright_red()
            } else {
                diff_text.normal()
            };
            format!("{:.2} ({})", average, diff_colored)
        }
        _ => "n/a".dimmed().to_string(),
    }
}
