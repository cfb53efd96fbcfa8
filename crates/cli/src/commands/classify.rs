use std::collections::BTreeMap;
use std::path::PathBuf;

use leadgate_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use leadgate_core::pipeline::{BatchOutcome, BatchProcessor};
use leadgate_store::{CsvLeadReader, CsvLeadWriter};
use serde::Serialize;

use super::{load_rules, CommandResult};

const PROBLEM_PREVIEW: usize = 5;
const SAMPLE_ROWS: usize = 10;

#[derive(Debug, Serialize)]
struct ClassifyPayload {
    command: &'static str,
    status: &'static str,
    total: usize,
    role_counts: BTreeMap<String, usize>,
    matched: usize,
    missing: usize,
    unrecognized: usize,
    problems: Vec<String>,
    output: String,
}

pub fn run(input: Option<PathBuf>, output: Option<PathBuf>, json: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions {
        overrides: ConfigOverrides {
            input_csv: input,
            output_csv: output,
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("classify", "config_validation", error.to_string(), 2)
        }
    };

    let rules = match load_rules(&config) {
        Ok(rules) => rules,
        Err(error) => return CommandResult::failure("classify", "rules_table", error, 2),
    };

    let mut reader = CsvLeadReader::new(&config.data.input_csv);
    let mut writer = CsvLeadWriter::new(&config.data.output_csv);

    let outcome = match BatchProcessor::new(rules).run(&mut reader, &mut writer) {
        Ok(outcome) => outcome,
        Err(error) => return CommandResult::failure("classify", "lead_store", error.to_string(), 3),
    };

    tracing::info!(
        total = outcome.summary.total,
        matched = outcome.summary.status_counts.matched,
        missing = outcome.summary.status_counts.missing,
        unrecognized = outcome.summary.status_counts.unrecognized,
        problems = outcome.summary.problems.len(),
        "classification run complete"
    );

    let output_path = config.data.output_csv.display().to_string();
    if json {
        let payload = ClassifyPayload {
            command: "classify",
            status: "ok",
            total: outcome.summary.total,
            role_counts: outcome
                .summary
                .role_counts
                .iter()
                .map(|(role, count)| (role.to_string(), *count))
                .collect(),
            matched: outcome.summary.status_counts.matched,
            missing: outcome.summary.status_counts.missing,
            unrecognized: outcome.summary.status_counts.unrecognized,
            problems: outcome.summary.problems.clone(),
            output: output_path,
        };
        let output = serde_json::to_string(&payload)
            .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"message\":\"{error}\"}}"));
        return CommandResult { exit_code: 0, output };
    }

    CommandResult { exit_code: 0, output: render_report(&outcome, &output_path) }
}

fn render_report(outcome: &BatchOutcome, output_path: &str) -> String {
    let summary = &outcome.summary;
    let mut lines = Vec::new();

    lines.push(format!("classified {} leads -> {output_path}", summary.total));

    if !outcome.records.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "  {:<11} {:<25} {:<17} {}",
            "Lead_ID", "Name", "Source", "Assigned Role"
        ));
        lines.push(format!("  {}", "-".repeat(60)));
        for record in outcome.records.iter().take(SAMPLE_ROWS) {
            lines.push(format!(
                "  {:<11} {:<25} {:<17} {}",
                record.id.as_str(),
                truncate(&record.name, 24),
                truncate(&record.source, 16),
                record.role,
            ));
        }
    }

    lines.push(String::new());
    lines.push("role distribution:".to_string());
    for (role, count) in &summary.role_counts {
        let pct = if summary.total == 0 {
            0.0
        } else {
            (*count as f64 / summary.total as f64) * 100.0
        };
        let bar = "#".repeat((pct / 2.0) as usize);
        lines.push(format!("  {:<20} {:>5} ({pct:>5.1}%)  {bar}", role.to_string(), count));
    }

    lines.push(String::new());
    lines.push(format!(
        "match quality: matched={} missing={} unrecognized={}",
        summary.status_counts.matched,
        summary.status_counts.missing,
        summary.status_counts.unrecognized,
    ));

    if summary.problems.is_empty() {
        lines.push("no data issues found".to_string());
    } else {
        lines.push(format!("data issues found: {}", summary.problems.len()));
        for problem in summary.problems.iter().take(PROBLEM_PREVIEW) {
            lines.push(format!("  - {problem}"));
        }
        if summary.problems.len() > PROBLEM_PREVIEW {
            lines.push(format!("  ... and {} more", summary.problems.len() - PROBLEM_PREVIEW));
        }
    }

    lines.join("\n")
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        value.chars().take(max).collect()
    }
}
