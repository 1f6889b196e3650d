//! Plain-text rendering of query results.

use std::fmt;

use crate::engine::db_ops::QueryTable;

/// `file_name` -> `File Name`.
fn title_case(column: &str) -> String {
    column
        .split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn separator(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, w) in cells.iter().zip(widths) {
        let pad = w.saturating_sub(cell.chars().count());
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad + 1));
        line.push('|');
    }
    line
}

impl QueryTable {
    /// Header row (index column first) and data rows with their 1-based index.
    fn grid(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let mut header = vec!["#".to_string()];
        header.extend(self.columns.iter().map(|c| title_case(c)));
        let body = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut cells = vec![(i + 1).to_string()];
                cells.extend(row.iter().cloned());
                cells
            })
            .collect();
        (header, body)
    }
}

impl fmt::Display for QueryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (header, body) = self.grid();
        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &body {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        let sep = separator(&widths);

        writeln!(f, "QUERY: {}", self.query)?;
        writeln!(f, "{}", sep)?;
        writeln!(f, "{}", row_line(&header, &widths))?;
        writeln!(f, "{}", sep)?;
        for row in &body {
            writeln!(f, "{}", row_line(row, &widths))?;
        }
        if !body.is_empty() {
            writeln!(f, "{}", sep)?;
        }
        Ok(())
    }
}
