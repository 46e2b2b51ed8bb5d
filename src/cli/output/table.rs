//! Table output formatting for CLI commands
//!
//! Renders similarity matrices and probe measurements using comfy-table.
//! Respects `NO_COLOR` and dumb terminals.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{TaskSnapshot, TaskStatus};
use crate::services::{
    InputCase, InputOutcome, LatencySample, SampleOutcome, SimilarityMatrix, StepMeasurement,
};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format a similarity matrix with run numbers as headers
    pub fn format_similarity_matrix(&self, matrix: &SimilarityMatrix) -> String {
        let mut table = self.create_base_table();

        let mut header = vec![Cell::new("Run").add_attribute(Attribute::Bold)];
        header.extend((1..=matrix.size()).map(|run| {
            Cell::new(run.to_string()).add_attribute(Attribute::Bold)
        }));
        table.set_header(header);

        for (i, row) in matrix.rows().iter().enumerate() {
            let mut cells = vec![Cell::new((i + 1).to_string())];
            cells.extend(row.iter().map(|score| self.score_cell(*score)));
            table.add_row(cells);
        }

        table.to_string()
    }

    /// Format the steps of a scaling ladder
    pub fn format_scaling_steps(&self, steps: &[StepMeasurement], degradation: &[f64]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Concurrency").add_attribute(Attribute::Bold),
            Cell::new("Total (ms)").add_attribute(Attribute::Bold),
            Cell::new("Avg (ms)").add_attribute(Attribute::Bold),
            Cell::new("Accepted").add_attribute(Attribute::Bold),
            Cell::new("Rate limited").add_attribute(Attribute::Bold),
            Cell::new("Failed").add_attribute(Attribute::Bold),
            Cell::new("Degradation").add_attribute(Attribute::Bold),
        ]);

        for (i, step) in steps.iter().enumerate() {
            // The first step has no predecessor to compare with
            let factor = i
                .checked_sub(1)
                .and_then(|prev| degradation.get(prev))
                .map_or_else(|| "-".to_string(), |f| format!("{f:.2}x"));

            let failed_cell = if self.use_colors && step.failed > 0 {
                Cell::new(step.failed.to_string()).fg(Color::Red)
            } else {
                Cell::new(step.failed.to_string())
            };

            table.add_row(vec![
                Cell::new(step.concurrency.to_string()),
                Cell::new(format!("{:.1}", step.total_ms)),
                Cell::new(format!("{:.1}", step.average_ms)),
                Cell::new(step.accepted.to_string()),
                Cell::new(step.rate_limited.to_string()),
                failed_cell,
                Cell::new(factor),
            ]);
        }

        table.to_string()
    }

    /// Format latency samples, flagging slow or failed submissions
    pub fn format_latency_samples(&self, samples: &[LatencySample]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Complexity").add_attribute(Attribute::Bold),
            Cell::new("Latency (ms)").add_attribute(Attribute::Bold),
            Cell::new("Outcome").add_attribute(Attribute::Bold),
        ]);

        for sample in samples {
            let outcome = match &sample.outcome {
                SampleOutcome::Accepted { task_id } => format!("accepted ({task_id})"),
                SampleOutcome::RateLimited => "rate limited".to_string(),
                SampleOutcome::Failed(reason) => format!("failed: {}", super::truncate(reason, 40)),
            };
            let flagged = sample.slow || matches!(sample.outcome, SampleOutcome::Failed(_));

            let latency_cell = if self.use_colors && sample.slow {
                Cell::new(format!("{:.1}", sample.latency_ms)).fg(Color::Red)
            } else if sample.slow {
                Cell::new(format!("{:.1} (slow)", sample.latency_ms))
            } else {
                Cell::new(format!("{:.1}", sample.latency_ms))
            };

            let outcome_cell = if self.use_colors && flagged {
                Cell::new(outcome).fg(Color::Red)
            } else {
                Cell::new(outcome)
            };

            table.add_row(vec![
                Cell::new(sample.name),
                Cell::new(sample.complexity.to_string()),
                latency_cell,
                outcome_cell,
            ]);
        }

        table.to_string()
    }

    pub fn format_input_cases(&self, cases: &[InputCase]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Input").add_attribute(Attribute::Bold),
            Cell::new("Length").add_attribute(Attribute::Bold),
            Cell::new("Outcome").add_attribute(Attribute::Bold),
        ]);

        for case in cases {
            let outcome = match &case.outcome {
                InputOutcome::Accepted { task_id } => format!("accepted ({task_id})"),
                InputOutcome::RateLimited => "rate limited".to_string(),
                InputOutcome::Rejected { status } => format!("rejected ({status})"),
                InputOutcome::ServerError { status } => format!("server error ({status})"),
                InputOutcome::Failed { error } => format!("failed: {}", super::truncate(error, 40)),
            };
            let outcome_cell = match (self.use_colors, case.outcome.is_graceful()) {
                (true, true) => Cell::new(outcome).fg(Color::Green),
                (true, false) => Cell::new(outcome).fg(Color::Red),
                (false, _) => Cell::new(outcome),
            };

            table.add_row(vec![
                Cell::new(case.label),
                Cell::new(case.length),
                outcome_cell,
            ]);
        }

        table.to_string()
    }

    /// Format one status snapshot as a two-column table
    pub fn format_snapshot(&self, snapshot: &TaskSnapshot) -> String {
        let mut table = self.create_base_table();

        let status_cell = if self.use_colors {
            Cell::new(snapshot.status.to_string()).fg(status_color(snapshot.status))
        } else {
            Cell::new(format!("{} {}", status_icon(snapshot.status), snapshot.status))
        };

        table.add_row(vec![
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new(&snapshot.task_id),
        ]);
        table.add_row(vec![Cell::new("Status").add_attribute(Attribute::Bold), status_cell]);
        if let Some(error) = &snapshot.error {
            table.add_row(vec![
                Cell::new("Error").add_attribute(Attribute::Bold),
                Cell::new(error),
            ]);
        }

        table.to_string()
    }

    fn score_cell(&self, score: f64) -> Cell {
        let cell = Cell::new(format!("{score:.3}"));
        if !self.use_colors {
            return cell;
        }
        if score >= 0.8 {
            cell.fg(Color::Green)
        } else if score >= 0.5 {
            cell.fg(Color::Yellow)
        } else {
            cell.fg(Color::Red)
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if terminal supports colors
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check for dumb terminal
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Queued => Color::Blue,
        TaskStatus::Processing => Color::Yellow,
        TaskStatus::Completed => Color::Green,
        TaskStatus::Failed | TaskStatus::NotFound => Color::Red,
        TaskStatus::RateLimited => Color::Magenta,
        TaskStatus::Other => Color::Grey,
    }
}

fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Queued => "○",
        TaskStatus::Processing => "◐",
        TaskStatus::Completed => "✓",
        TaskStatus::Failed => "✗",
        TaskStatus::NotFound => "?",
        TaskStatus::RateLimited => "⏸",
        TaskStatus::Other => "·",
    }
}
