//! Reader for the tab-separated source files.
//!
//! The sources are exported from documents where long cells wrap onto
//! several physical lines. A row is complete once the accumulated text
//! holds the expected number of tab-separated columns; a lone line of
//! digits and dots continues the code list of the previous row.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Rows read from one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsvTable {
    pub rows: Vec<Vec<String>>,
    /// Incomplete trailing records that could not be parsed
    pub problems: usize,
}

/// Read a TSV file expecting `columns` columns per row
pub fn read_tsv(path: &Path, columns: usize) -> Result<TsvTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))?;
    let table = parse_tsv(&content, columns);
    tracing::info!(
        "Read {} rows from {} ({} problems)",
        table.rows.len(),
        path.display(),
        table.problems
    );
    Ok(table)
}

/// Parse TSV content, joining wrapped lines until a row is complete
pub fn parse_tsv(content: &str, columns: usize) -> TsvTable {
    let mut table = TsvTable::default();
    let mut pending = String::new();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            if !pending.is_empty() {
                tracing::warn!("Line {}: blank line inside a record, continuing", index + 1);
            }
            continue;
        }

        if !pending.is_empty() {
            pending.push(' ');
        }
        pending.push_str(line);

        let parts: Vec<&str> = pending.split('\t').collect();
        if parts.len() >= columns {
            table.rows.push(take_columns(&parts, columns));
            pending.clear();
        } else if parts.len() == 1 && is_code_continuation(parts[0]) {
            if let Some(cell) = table.rows.last_mut().and_then(|row| row.get_mut(2)) {
                cell.push(' ');
                cell.push_str(parts[0].trim());
            }
            pending.clear();
        }
    }

    if !pending.is_empty() {
        let parts: Vec<&str> = pending.split('\t').collect();
        if parts.len() >= columns {
            table.rows.push(take_columns(&parts, columns));
        } else {
            let preview: String = pending.chars().take(50).collect();
            tracing::warn!("Incomplete record left at end of file: {preview}...");
            table.problems += 1;
        }
    }

    table
}

fn take_columns(parts: &[&str], columns: usize) -> Vec<String> {
    parts[..columns]
        .iter()
        .map(|part| part.trim().to_string())
        .collect()
}

/// A wrapped tail of a code list: only digits and dots, at least one digit
fn is_code_continuation(text: &str) -> bool {
    let mut digits = 0usize;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => {}
            _ => return false,
        }
    }
    digits > 0
}
