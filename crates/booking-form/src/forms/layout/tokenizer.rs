//! Character-cell tokenization for the form's typewriter boxes.
//!
//! Every Unicode scalar value occupies exactly one cell. Values longer than the
//! available cells are truncated without an ellipsis, and absent values produce
//! empty cells.

/// One typewriter box. `None` is an empty placeholder.
pub type Cell = Option<char>;

/// Split `value` into exactly `cell_count` cells.
pub fn tokenize_row(value: Option<&str>, cell_count: usize) -> Vec<Cell> {
    let mut cells: Vec<Cell> = value
        .unwrap_or_default()
        .chars()
        .take(cell_count)
        .map(Some)
        .collect();
    cells.resize(cell_count, None);
    cells
}

/// Split `value` into `row_count` rows of `cells_per_row` cells.
///
/// Chunks beyond `row_count` are dropped.
pub fn tokenize_multi_row(
    value: Option<&str>,
    cells_per_row: usize,
    row_count: usize,
) -> Vec<Vec<Cell>> {
    let chars: Vec<char> = value.unwrap_or_default().chars().collect();
    let mut chunks = if cells_per_row == 0 {
        Vec::new()
    } else {
        chars
            .chunks(cells_per_row)
            .take(row_count)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
    };
    chunks.resize(row_count, String::new());

    chunks
        .iter()
        .map(|chunk| tokenize_row(Some(chunk.as_str()), cells_per_row))
        .collect()
}

/// Strip currency symbols and grouping separators from a formatted amount.
pub fn normalize_money(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.')
        .collect()
}

/// Concatenate the filled cells of a row back into text.
pub fn cells_to_string(cells: &[Cell]) -> String {
    cells.iter().flatten().collect()
}
