//! Rendering helpers shared by the subcommands: pretty JSON for `--json`
//! and a fixed-width text table for the human listings.

use serde::Serialize;
use std::fmt::Write as _;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Column-aligned text table with a dashed rule under the header.
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        self.rows.push(cells);
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }

    /// Each column is sized to its widest cell; the last column is left
    /// ragged so lines carry no trailing whitespace.
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();
        write_line(&mut out, &widths, &self.columns);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(&mut out, &widths, &rule);
        for row in &self.rows {
            write_line(&mut out, &widths, row);
        }
        out
    }

    fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .fold(header.len(), |w, cell| w.max(cell.len()))
            })
            .collect()
    }
}

fn write_line(out: &mut String, widths: &[usize], cells: &[String]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        if i + 1 < cells.len() {
            let _ = write!(out, "{cell:<width$}", width = widths[i]);
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
