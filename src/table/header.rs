//! Header cleaning: drop caption-like rows above the real header.

use crate::model::TableRow;

use super::TableValidatorConfig;

/// Whether a row looks like a column header rather than a caption or
/// a stray paragraph. `columns` is the table's column count; a row with
/// fewer cells counts the missing ones as empty.
pub fn is_header_row(row: &TableRow, columns: usize, config: &TableValidatorConfig) -> bool {
    let columns = columns.max(row.cells.len());
    if columns == 0 || row.is_empty() {
        return false;
    }
    let filled = row.non_empty_count();
    let fill_ratio = filled as f32 / columns as f32;
    let min_filled = (config.header_min_filled as f32).max(columns as f32 * config.header_min_filled_ratio);

    fill_ratio >= config.header_fill_ratio
        && row.max_cell_len() < config.header_cell_cap
        && filled as f32 >= min_filled
}

/// Index of the first qualifying header row among the first
/// `header_scan_rows` rows.
pub fn find_header_row(rows: &[TableRow], config: &TableValidatorConfig) -> Option<usize> {
    let columns = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    rows.iter()
        .take(config.header_scan_rows)
        .position(|row| is_header_row(row, columns, config))
}

/// Drop every row before the first qualifying header.
///
/// Returns the number of rows dropped and whether a header was found
/// (it is then the first row). Without a qualifying header nothing is
/// dropped.
pub fn clean_header(rows: &mut Vec<TableRow>, config: &TableValidatorConfig) -> (usize, bool) {
    match find_header_row(rows, config) {
        Some(index) => {
            rows.drain(..index);
            if index > 0 {
                log::debug!("header cleaning dropped {} leading row(s)", index);
            }
            (index, true)
        }
        None => (0, false),
    }
}
