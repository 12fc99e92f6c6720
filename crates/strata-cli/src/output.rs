//! Tabular output in text, JSON and CSV form.

use colored::Colorize;
use serde_json::{Map as JsonMap, Value as Json};

use crate::cli::OutputFormat;

/// Rows of string cells under a fixed header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => self.render_json(),
            OutputFormat::Csv => self.render_csv(),
        }
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    /// Bordered fixed-width table with a bold header row.
    pub fn render_text(&self) -> String {
        let widths = self.widths();
        let mut separator = String::from("+");
        for width in &widths {
            separator.push_str(&"-".repeat(width + 2));
            separator.push('+');
        }
        separator.push('\n');

        let line = |cells: &[String], bold: bool| {
            let mut out = String::new();
            for (cell, width) in cells.iter().zip(&widths) {
                let padded = format!("{cell:<width$}");
                out.push_str("| ");
                if bold {
                    out.push_str(&padded.bold().to_string());
                } else {
                    out.push_str(&padded);
                }
                out.push(' ');
            }
            out.push_str("|\n");
            out
        };

        let mut out = separator.clone();
        out.push_str(&line(&self.headers, true));
        out.push_str(&separator);
        for row in &self.rows {
            out.push_str(&line(row, false));
        }
        out.push_str(&separator);
        out
    }

    /// One JSON object per row, keyed by header.
    pub fn render_json(&self) -> String {
        let rows: Vec<Json> = self
            .rows
            .iter()
            .map(|row| {
                let object: JsonMap<String, Json> = self
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(h, cell)| (h.clone(), Json::String(cell.clone())))
                    .collect();
                Json::Object(object)
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&Json::Array(rows)).unwrap_or_default();
        out.push('\n');
        out
    }

    pub fn render_csv(&self) -> String {
        let mut out = String::new();
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            let cells: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }
}

/// Quote a CSV field when it is empty or holds a separator, quote or newline.
fn csv_field(cell: &str) -> String {
    if cell.is_empty() {
        "\"\"".to_string()
    } else if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
