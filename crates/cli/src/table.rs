// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal auto-width table renderer for `task list` / `expert list-jobs`
//! output (§9 Design Notes).

use crate::color;

pub enum Align {
    Left,
    Right,
}

pub struct Column {
    title: String,
    align: Align,
    status: bool,
}

impl Column {
    pub fn left(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            align: Align::Left,
            status: false,
        }
    }

    pub fn right(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            align: Align::Right,
            status: false,
        }
    }

    /// Mark this column's cells as status values, colorized on render.
    pub fn status(mut self) -> Self {
        self.status = true;
        self
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .map(|row| row[i].len())
                    .chain(std::iter::once(col.title.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Render the table as a `Vec` of printable lines.
    pub fn render(&self) -> Vec<String> {
        let widths = self.widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 1);

        let header_cells: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, width)| pad(&col.title, *width, &col.align))
            .collect();
        lines.push(color::header(&header_cells.join("  ")).to_string());

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .zip(&self.columns)
                .map(|((value, width), col)| {
                    let padded = pad(value, *width, &col.align);
                    if col.status {
                        color::status(&padded)
                    } else {
                        padded
                    }
                })
                .collect();
            lines.push(cells.join("  "));
        }
        lines
    }

    pub fn print(&self) {
        for line in self.render() {
            println!("{line}");
        }
    }
}

fn pad(value: &str, width: usize, align: &Align) -> String {
    match align {
        Align::Left => format!("{value:<width$}"),
        Align::Right => format!("{value:>width$}"),
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
