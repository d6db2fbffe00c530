// Renderers for `svault show`: padded text grid, CSV, JSON.

use sheetvault_engine::ReconstructedTable;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::CliError;

/// Widest a text-table column may grow before values are cut with "..".
pub const MAX_TEXT_COLUMN_WIDTH: usize = 40;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to `width` display columns, ending in ".." when cut.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    let budget = width.saturating_sub(2);
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }
    format!("{}..", &s[..end_byte])
}

/// Pad or truncate to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let sw = display_width(&cut);
    format!("{}{}", cut, " ".repeat(width.saturating_sub(sw)))
}

/// Header line, rule, then one line per row. Trailing spaces are trimmed.
pub fn render_text(table: &ReconstructedTable) -> String {
    if table.columns.is_empty() {
        return String::new();
    }

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let widest = table
                .rows
                .iter()
                .map(|row| display_width(&row[j]))
                .chain(std::iter::once(display_width(name)))
                .max()
                .unwrap_or(0);
            widest.clamp(1, MAX_TEXT_COLUMN_WIDTH)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells.iter().zip(&widths).map(|(c, &w)| pad_right(c, w)).collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&table.columns));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Column names as the first record, then the rows.
pub fn render_csv(table: &ReconstructedTable) -> Result<String, CliError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !table.columns.is_empty() {
        writer
            .write_record(&table.columns)
            .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
        for row in &table.rows {
            writer
                .write_record(row)
                .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| CliError::io(e.to_string()))
}

/// `{"columns": [...], "rows": [[...]]}`
pub fn render_json(table: &ReconstructedTable) -> Result<String, CliError> {
    serde_json::to_string_pretty(table).map_err(|e| CliError::io(e.to_string()))
}
