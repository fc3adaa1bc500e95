//! Cell address and rectangle types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
///
/// Cell addresses in Excel use a combination of column letters (A-XFD) and row numbers (1-1048576).
/// The optional `$` prefix makes a reference absolute (doesn't change when copied).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create a new cell address with specified absolute/relative flags
    pub fn with_absolute(row: u32, col: u16, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// Create an absolute cell address ($A$1 style)
    pub fn absolute(row: u32, col: u16) -> Self {
        Self::with_absolute(row, col, true, true)
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use duke_rules_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 1);
    /// assert!(addr.row_absolute);
    /// assert!(addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCellName(s.to_string());
        let bytes = s.as_bytes();
        let mut pos = 0;

        let col_absolute = if bytes.first() == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(invalid());
        }
        let col = Self::letters_to_column(&s[col_start..pos])?;

        let row_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let row_str = &s[pos..];
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u32 = row_str.parse().map_err(|_| invalid())?;

        // Excel rows are 1-based, we use 0-based internally
        if row == 0 {
            return Err(invalid());
        }
        if row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS));
        }

        Ok(Self {
            row: row - 1,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() || letters.len() > 3 {
            // Anything past three letters is beyond XFD
            if letters.len() > 3 && letters.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::ColumnOutOfBounds(u32::MAX, MAX_COLS));
            }
            return Err(Error::InvalidCellName(letters.to_string()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidCellName(letters.to_string()));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }

        if col > MAX_COLS as u32 {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
        }

        Ok((col - 1) as u16)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();

        if self.col_absolute {
            result.push('$');
        }
        result.push_str(&Self::column_to_letters(self.col));

        if self.row_absolute {
            result.push('$');
        }
        result.push_str(&(self.row + 1).to_string());

        result
    }

    /// Same position with both references made absolute
    pub fn to_absolute(self) -> Self {
        Self::absolute(self.row, self.col)
    }

}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Convert a cell name to 1-based `(row, column)` coordinates
///
/// ```
/// use duke_rules_core::cell_name_to_coordinates;
///
/// assert_eq!(cell_name_to_coordinates("C7").unwrap(), (7, 3));
/// assert!(cell_name_to_coordinates("A").is_err());
/// ```
pub fn cell_name_to_coordinates(name: &str) -> Result<(u32, u32)> {
    let addr = CellAddress::parse(name)?;
    Ok((addr.row + 1, addr.col as u32 + 1))
}

/// Convert 1-based `(row, column)` coordinates to a cell name
pub fn coordinates_to_cell_name(row: u32, col: u32) -> Result<String> {
    if row == 0 || row > MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS));
    }
    if col == 0 || col > MAX_COLS as u32 {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
    }
    Ok(CellAddress::new(row - 1, (col - 1) as u16).to_a1_string())
}

/// A rectangle of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        // Normalize so start is top-left and end is bottom-right; the `$`
        // markers travel with the coordinate they belong to
        let ((start_row, start_row_abs), (end_row, end_row_abs)) = if start.row <= end.row {
            ((start.row, start.row_absolute), (end.row, end.row_absolute))
        } else {
            ((end.row, end.row_absolute), (start.row, start.row_absolute))
        };

        let ((start_col, start_col_abs), (end_col, end_col_abs)) = if start.col <= end.col {
            ((start.col, start.col_absolute), (end.col, end.col_absolute))
        } else {
            ((end.col, end.col_absolute), (start.col, start.col_absolute))
        };

        Self {
            start: CellAddress::with_absolute(start_row, start_col, start_row_abs, start_col_abs),
            end: CellAddress::with_absolute(end_row, end_col, end_row_abs, end_col_abs),
        }
    }

    /// Create a range from row/column indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        if let Some((first, second)) = s.split_once(':') {
            let start = CellAddress::parse(first)?;
            let end = CellAddress::parse(second)?;
            Ok(Self::new(start, end))
        } else {
            Ok(Self::single(CellAddress::parse(s)?))
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Whether the range covers exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.start.row == self.end.row && self.start.col == self.end.col
    }

    /// Check if this range overlaps with another
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && self.end.row >= other.start.row
            && self.start.col <= other.end.col
            && self.end.col >= other.start.col
    }

    /// Get the intersection of two ranges, if any
    pub fn intersect(&self, other: &CellRange) -> Option<CellRange> {
        if !self.overlaps(other) {
            return None;
        }

        Some(CellRange::from_indices(
            self.start.row.max(other.start.row),
            self.start.col.max(other.start.col),
            self.end.row.min(other.end.row),
            self.end.col.min(other.end.col),
        ))
    }

    /// Remove the cells of `other` from this range
    ///
    /// The remainder is returned as at most four disjoint rectangles in
    /// reading order: the band above the cut, the pieces left and right of
    /// it, then the band below. An edge-aligned cut yields a single shrunk
    /// rectangle; a disjoint `other` yields `self` unchanged.
    pub fn subtract(&self, other: &CellRange) -> Vec<CellRange> {
        let Some(cut) = self.intersect(other) else {
            return vec![*self];
        };

        let mut pieces = Vec::with_capacity(4);
        if cut.start.row > self.start.row {
            pieces.push(CellRange::from_indices(
                self.start.row,
                self.start.col,
                cut.start.row - 1,
                self.end.col,
            ));
        }
        if cut.start.col > self.start.col {
            pieces.push(CellRange::from_indices(
                cut.start.row,
                self.start.col,
                cut.end.row,
                cut.start.col - 1,
            ));
        }
        if cut.end.col < self.end.col {
            pieces.push(CellRange::from_indices(
                cut.start.row,
                cut.end.col + 1,
                cut.end.row,
                self.end.col,
            ));
        }
        if cut.end.row < self.end.row {
            pieces.push(CellRange::from_indices(
                cut.end.row + 1,
                self.start.col,
                self.end.row,
                self.end.col,
            ));
        }
        pieces
    }

    /// Same rectangle with every reference made absolute
    pub fn to_absolute(self) -> Self {
        Self {
            start: self.start.to_absolute(),
            end: self.end.to_absolute(),
        }
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
        }
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over cells in a range
pub struct CellRangeIterator {
    range: CellRange,
    current_row: u32,
    current_col: u16,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row > self.range.end.row {
            return None;
        }

        let addr = CellAddress::new(self.current_row, self.current_col);

        // Move to next cell
        if self.current_col >= self.range.end.col {
            self.current_col = self.range.start.col;
            self.current_row += 1;
        } else {
            self.current_col += 1;
        }

        Some(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD"); // Max Excel column
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("AB").unwrap(), 27);
        assert_eq!(CellAddress::letters_to_column("XFD").unwrap(), 16383);
        assert_eq!(CellAddress::letters_to_column("aa").unwrap(), 26);
        assert!(matches!(
            CellAddress::letters_to_column("XFE"),
            Err(Error::ColumnOutOfBounds(16385, MAX_COLS))
        ));
        assert!(CellAddress::letters_to_column("ABCD").is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("B2").unwrap();
        assert_eq!((addr.row, addr.col), (1, 1));

        let addr = CellAddress::parse("$A1").unwrap();
        assert!(addr.col_absolute);
        assert!(!addr.row_absolute);

        let addr = CellAddress::parse("XFD1048576").unwrap();
        assert_eq!(addr.row, 1048575);
        assert_eq!(addr.col, 16383);
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert_eq!(
            CellAddress::parse("A"),
            Err(Error::InvalidCellName("A".into()))
        );
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::parse(" A1").is_err());
        assert!(matches!(
            CellAddress::parse("A1048577"),
            Err(Error::RowOutOfBounds(1048577, MAX_ROWS))
        ));
    }

    #[test]
    fn test_coordinates_round_trip() {
        assert_eq!(cell_name_to_coordinates("A1").unwrap(), (1, 1));
        assert_eq!(cell_name_to_coordinates("$AA$10").unwrap(), (10, 27));
        assert_eq!(coordinates_to_cell_name(10, 27).unwrap(), "AA10");
        assert!(coordinates_to_cell_name(0, 1).is_err());
        assert!(coordinates_to_cell_name(1, 16385).is_err());
    }

    #[test]
    fn test_cell_range_parse_normalizes_corners() {
        let range = CellRange::parse("B2:A1").unwrap();
        assert_eq!(range.start, CellAddress::new(0, 0));
        assert_eq!(range.end, CellAddress::new(1, 1));
        assert_eq!(range.to_string(), "A1:B2");

        let range = CellRange::parse("C3").unwrap();
        assert!(range.is_single_cell());
        assert!(CellRange::parse("A1:A").is_err());
    }

    #[test]
    fn test_cell_range_normalization_moves_absolute_markers() {
        let range = CellRange::parse("$D$9:C2").unwrap();
        assert_eq!(range.to_string(), "C2:$D$9");

        // Row and column markers follow their own coordinate
        let range = CellRange::parse("$A5:B$1").unwrap();
        assert_eq!(range.start, CellAddress::with_absolute(0, 0, true, true));
        assert_eq!(range.end, CellAddress::with_absolute(4, 1, false, false));
        assert_eq!(range.to_string(), "$A$1:B5");
    }

    #[test]
    fn test_subtract_edge_aligned() {
        let range = CellRange::parse("A1:A5").unwrap();
        let rest = range.subtract(&CellRange::parse("A1").unwrap());
        assert_eq!(rest, vec![CellRange::parse("A2:A5").unwrap()]);

        let range = CellRange::parse("A1:C1").unwrap();
        let rest = range.subtract(&CellRange::parse("C1").unwrap());
        assert_eq!(rest, vec![CellRange::parse("A1:B1").unwrap()]);
    }

    #[test]
    fn test_subtract_interior() {
        let range = CellRange::parse("A1:C3").unwrap();
        let rest: Vec<String> = range
            .subtract(&CellRange::parse("B2").unwrap())
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(rest, vec!["A1:C1", "A2", "C2", "A3:C3"]);
    }

    #[test]
    fn test_subtract_disjoint_and_covering() {
        let range = CellRange::parse("A1:B2").unwrap();
        assert_eq!(range.subtract(&CellRange::parse("D4").unwrap()), vec![range]);
        assert!(range.subtract(&CellRange::parse("A1:Z9").unwrap()).is_empty());
    }

    #[test]
    fn test_cell_range_iterator() {
        let cells: Vec<_> = CellRange::parse("A1:B2").unwrap().cells().collect();
        assert_eq!(
            cells,
            vec![
                CellAddress::new(0, 0),
                CellAddress::new(0, 1),
                CellAddress::new(1, 0),
                CellAddress::new(1, 1),
            ]
        );

        let last = CellRange::parse("XFD1").unwrap().cells().count();
        assert_eq!(last, 1);
    }
}
