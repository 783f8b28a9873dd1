//! A1 notation for sheet ranges (`produtos`, `vendas!A2:F2`, `'Minha Aba'!B3`).

use crate::error::{StoreError, StoreResult};

/// A parsed range address: a sheet name and an optional cell rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    /// Sheet (tab) name, unquoted.
    pub sheet: String,
    /// 0-based `((start_row, start_col), (end_row, end_col))`, inclusive.
    /// `None` addresses the whole sheet.
    pub cells: Option<((usize, usize), (usize, usize))>,
}

impl SheetRange {
    /// Parse `Sheet`, `Sheet!A1` or `Sheet!A1:C3`. Quoted sheet names are
    /// unquoted, with `''` read as a literal quote.
    pub fn parse(range: &str) -> StoreResult<Self> {
        let (sheet, cells) = match split_sheet(range) {
            Some((sheet, cells)) => (sheet, Some(parse_a1_range(cells)?)),
            None => (range.to_string(), None),
        };
        let sheet = unquote(&sheet);
        if sheet.is_empty() {
            return Err(StoreError::RangeNotFound(range.to_string()));
        }
        Ok(Self { sheet, cells })
    }
}

/// Split at the `!` that separates the sheet name from the cells, ignoring
/// any `!` inside a quoted name.
fn split_sheet(range: &str) -> Option<(String, &str)> {
    let mut in_quotes = false;
    for (i, ch) in range.char_indices() {
        match ch {
            '\'' => in_quotes = !in_quotes,
            '!' if !in_quotes => return Some((range[..i].to_string(), &range[i + 1..])),
            _ => {}
        }
    }
    None
}

fn unquote(name: &str) -> String {
    match name.strip_prefix('\'').and_then(|n| n.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => name.to_string(),
    }
}

/// Quote a sheet name for use in a range when it contains anything other
/// than ASCII letters, digits or underscores.
pub fn quote_sheet_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Range covering one full row of `width` columns, for a 1-based row number.
///
/// # Example
/// ```
/// use sheetbase_core::a1::row_range;
///
/// assert_eq!(row_range("produtos", 3, 3), "produtos!A3:C3");
/// assert_eq!(row_range("Minha Aba", 2, 0), "'Minha Aba'!A2");
/// ```
pub fn row_range(sheet: &str, row_number: usize, width: usize) -> String {
    let sheet = quote_sheet_name(sheet);
    if width <= 1 {
        format!("{sheet}!A{row_number}")
    } else {
        let last = column_index_to_letters(width - 1);
        format!("{sheet}!A{row_number}:{last}{row_number}")
    }
}

/// Parse A1-style cell notation (e.g., "A1", "Z99", "AA1")
/// Returns (row, column) as 0-based indices
pub fn parse_a1(notation: &str) -> StoreResult<(usize, usize)> {
    let invalid = || StoreError::validation(format!("Invalid cell notation: {notation}"));

    let upper = notation.trim_start_matches('$').to_uppercase().replace('$', "");
    let split_pos = upper
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    if split_pos == 0 {
        return Err(invalid());
    }

    let col = parse_column_letters(&upper[..split_pos]).ok_or_else(invalid)?;
    let row = upper[split_pos..].parse::<usize>().map_err(|_| invalid())?;

    // Rows are 1-based in A1 notation
    if row == 0 {
        return Err(invalid());
    }

    Ok((row - 1, col))
}

/// Parse A1-style range notation (e.g., "A1:C3")
/// Returns ((start_row, start_col), (end_row, end_col)) as 0-based indices
pub fn parse_a1_range(notation: &str) -> StoreResult<((usize, usize), (usize, usize))> {
    let Some((start, end)) = notation.split_once(':') else {
        let cell = parse_a1(notation)?;
        return Ok((cell, cell));
    };

    let (start_row, start_col) = parse_a1(start)?;
    let (end_row, end_col) = parse_a1(end)?;

    Ok((
        (start_row.min(end_row), start_col.min(end_col)),
        (start_row.max(end_row), start_col.max(end_col)),
    ))
}

/// Convert column letters to 0-based column index
/// A=0, B=1, ... Z=25, AA=26, AB=27, ...
fn parse_column_letters(letters: &str) -> Option<usize> {
    let mut col = 0usize;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        col = col * 26 + (b - b'A') as usize + 1;
    }
    col.checked_sub(1)
}

/// Convert 0-based column index to column letters
/// 0=A, 1=B, ... 25=Z, 26=AA, 27=AB, ...
pub fn column_index_to_letters(mut col: usize) -> String {
    let mut result = String::new();
    col += 1;

    while col > 0 {
        col -= 1;
        result.insert(0, ((col % 26) as u8 + b'A') as char);
        col /= 26;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1("A1").unwrap(), (0, 0));
        assert_eq!(parse_a1("B1").unwrap(), (0, 1));
        assert_eq!(parse_a1("A2").unwrap(), (1, 0));
        assert_eq!(parse_a1("AA1").unwrap(), (0, 26));
        assert_eq!(parse_a1("ZZ1").unwrap(), (0, 701));
        assert_eq!(parse_a1("$B$3").unwrap(), (2, 1));

        // Case insensitive
        assert_eq!(parse_a1("a1").unwrap(), (0, 0));
    }

    #[test]
    fn test_parse_a1_errors() {
        assert!(parse_a1("").is_err());
        assert!(parse_a1("A").is_err());
        assert!(parse_a1("1").is_err());
        assert!(parse_a1("A0").is_err());
        assert!(parse_a1("A1B").is_err());
    }

    #[test]
    fn test_parse_a1_range_normalizes() {
        assert_eq!(parse_a1_range("C3:A1").unwrap(), ((0, 0), (2, 2)));
        assert_eq!(parse_a1_range("B2").unwrap(), ((1, 1), (1, 1)));
    }

    #[test]
    fn test_column_index_to_letters() {
        assert_eq!(column_index_to_letters(0), "A");
        assert_eq!(column_index_to_letters(25), "Z");
        assert_eq!(column_index_to_letters(26), "AA");
        assert_eq!(column_index_to_letters(701), "ZZ");
        assert_eq!(column_index_to_letters(702), "AAA");
    }

    #[test]
    fn test_sheet_range_whole_sheet() {
        let range = SheetRange::parse("produtos").unwrap();
        assert_eq!(range.sheet, "produtos");
        assert!(range.cells.is_none());
    }

    #[test]
    fn test_sheet_range_with_cells() {
        let range = SheetRange::parse("vendas!A2:F2").unwrap();
        assert_eq!(range.sheet, "vendas");
        assert_eq!(range.cells, Some(((1, 0), (1, 5))));
    }

    #[test]
    fn test_sheet_range_quoted() {
        let range = SheetRange::parse("'It''s here!'!B3").unwrap();
        assert_eq!(range.sheet, "It's here!");
        assert_eq!(range.cells, Some(((2, 1), (2, 1))));
    }

    #[test]
    fn test_sheet_range_rejects_empty() {
        assert!(SheetRange::parse("").is_err());
        assert!(SheetRange::parse("vendas!").is_err());
    }

    #[test]
    fn test_row_range() {
        assert_eq!(row_range("itens_venda", 7, 28), "itens_venda!A7:AB7");
        assert_eq!(row_range("x", 2, 1), "x!A2");
        assert_eq!(row_range("It's", 2, 2), "'It''s'!A2:B2");
    }

    #[test]
    fn test_row_range_roundtrip() {
        let parsed = SheetRange::parse(&row_range("Minha Aba", 4, 3)).unwrap();
        assert_eq!(parsed.sheet, "Minha Aba");
        assert_eq!(parsed.cells, Some(((3, 0), (3, 2))));
    }
}
