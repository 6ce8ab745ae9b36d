//! Presentation helpers shared by the CLI (the browser page mirrors them in script.js).

use colored::Colorize;
use filter_client::{FilterStatus, Provider};

use super::models::{DomainResult, Filters};

/// Newline-joined URLs the provider reports as unblocked (no trailing newline).
pub fn unblocked_domains(results: &[DomainResult], provider: Provider) -> String {
    results
        .iter()
        .filter(|r| r.is_unblocked_by(provider))
        .map(|r| r.url.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Results table with one status/category column pair per selected provider.
pub struct ResultTable {
    filters: Filters,
}

impl ResultTable {
    pub fn new(filters: Filters) -> Self {
        Self { filters }
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["Domain".to_string()];
        for provider in self.filters.providers() {
            headers.push(format!("{} Status", provider.display_name()));
            headers.push(format!("{} Category", provider.display_name()));
        }
        headers
    }

    pub fn row(&self, result: &DomainResult) -> Vec<String> {
        let mut row = vec![result.url.clone()];
        for provider in self.filters.providers() {
            match result.get(provider) {
                Some(r) => {
                    row.push(r.status.to_string());
                    row.push(if r.category.is_empty() {
                        "N/A".to_string()
                    } else {
                        r.category.clone()
                    });
                }
                None => {
                    row.push("N/A".to_string());
                    row.push("N/A".to_string());
                }
            }
        }
        row
    }

    /// Fixed-width text table. With `color`, statuses are green when
    /// unblocked and red otherwise.
    pub fn render(&self, results: &[DomainResult], color: bool) -> String {
        let headers = self.headers();
        let rows: Vec<Vec<String>> = results.iter().map(|r| self.row(r)).collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&join_padded(&headers, &widths, |_, cell| cell.to_string()));
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );

        for row in &rows {
            out.push('\n');
            out.push_str(&join_padded(row, &widths, |column, padded| {
                if color && is_status_column(column) {
                    colorize_status(padded)
                } else {
                    padded.to_string()
                }
            }));
        }

        out
    }
}

/// Status columns sit at 1, 3, ... (after the domain column).
fn is_status_column(column: usize) -> bool {
    column % 2 == 1
}

fn colorize_status(padded: &str) -> String {
    if padded.trim_end() == FilterStatus::Unblocked.as_str() {
        padded.green().to_string()
    } else {
        padded.red().to_string()
    }
}

fn join_padded(
    cells: &[String],
    widths: &[usize],
    style: impl Fn(usize, &str) -> String,
) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(column, (cell, width))| style(column, &format!("{:<width$}", cell, width = *width)))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
