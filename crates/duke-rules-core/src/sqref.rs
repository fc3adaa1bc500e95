//! Range references ("sqref")
//!
//! A sqref is the attribute SpreadsheetML uses to say which cells a rule
//! applies to. It lists one or more rectangles separated by whitespace,
//! each either a single cell (`D3`) or a corner pair (`A1:B2`).
//!
//! ```rust
//! use duke_rules_core::Sqref;
//!
//! let stored = Sqref::parse("D2:D2 D3 D4").unwrap();
//! let rest = stored.subtract(&Sqref::parse("D3").unwrap());
//! assert_eq!(rest.to_string(), "D2:D2 D4");
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::cell::{CellAddress, CellRange};
use crate::error::{Error, Result};

/// One rectangle of a [`Sqref`]
///
/// `span` remembers whether a single cell was written as a corner pair
/// (`D2:D2`), so untouched rectangles format back the way they were read.
/// It takes no part in equality.
#[derive(Debug, Clone, Copy)]
struct Area {
    range: CellRange,
    span: bool,
}

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.range == other.range
    }
}

impl Eq for Area {}

impl Hash for Area {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.range.hash(state);
    }
}

impl Area {
    fn new(range: CellRange) -> Self {
        Self { range, span: false }
    }

    fn to_a1_string(self) -> String {
        if self.span || !self.range.is_single_cell() {
            format!(
                "{}:{}",
                self.range.start.to_a1_string(),
                self.range.end.to_a1_string()
            )
        } else {
            self.range.start.to_a1_string()
        }
    }
}

/// An ordered list of rectangles over the worksheet grid
///
/// Two references are equal when they list the same rectangles in the same
/// order; `D2` and `D2:D2` compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Sqref {
    areas: Vec<Area>,
}

impl Sqref {
    /// Create an empty reference
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whitespace separated list of `CELL` or `CELL:CELL` tokens
    ///
    /// Corners are normalized to top-left/bottom-right. The first token that
    /// cannot be decoded fails the whole parse.
    pub fn parse(text: &str) -> Result<Self> {
        let mut areas = Vec::new();
        for token in text.split_whitespace() {
            areas.push(Self::parse_token(token)?);
        }
        if areas.is_empty() {
            return Err(Error::invalid_range(
                text,
                Error::InvalidCellName(text.to_string()),
            ));
        }
        Ok(Self { areas })
    }

    fn parse_token(token: &str) -> Result<Area> {
        let parse_cell =
            |cell: &str| CellAddress::parse(cell).map_err(|e| Error::invalid_range(cell, e));

        match token.split_once(':') {
            Some((first, second)) => {
                let start = parse_cell(first)?;
                let end = parse_cell(second)?;
                Ok(Area {
                    range: CellRange::new(start, end),
                    span: true,
                })
            }
            None => Ok(Area::new(CellRange::single(parse_cell(token)?))),
        }
    }

    /// Append a rectangle
    pub fn push(&mut self, range: CellRange) {
        self.areas.push(Area::new(range));
    }

    /// Append every rectangle of another reference, keeping duplicates
    pub fn extend(&mut self, other: &Sqref) {
        self.areas.extend_from_slice(&other.areas);
    }

    /// Iterate over the rectangles in order
    pub fn ranges(&self) -> impl Iterator<Item = &CellRange> + '_ {
        self.areas.iter().map(|a| &a.range)
    }

    /// Number of rectangles
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether no rectangle remains
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Check whether a single cell is covered
    pub fn contains_cell(&self, addr: &CellAddress) -> bool {
        self.areas.iter().any(|a| a.range.contains(addr))
    }

    /// Check whether any rectangle overlaps any rectangle of `other`
    pub fn intersects(&self, other: &Sqref) -> bool {
        self.areas
            .iter()
            .any(|a| other.areas.iter().any(|b| a.range.overlaps(&b.range)))
    }

    /// Check whether every cell of `other` is covered by this reference
    pub fn contains(&self, other: &Sqref) -> bool {
        other.subtract(self).is_empty()
    }

    /// The cells covered by both references
    pub fn intersection(&self, other: &Sqref) -> Sqref {
        let mut out = Sqref::new();
        for a in &self.areas {
            for b in &other.areas {
                if let Some(cut) = a.range.intersect(&b.range) {
                    out.push(cut);
                }
            }
        }
        out
    }

    /// Remove every cell covered by `other`
    ///
    /// Rectangles disjoint from `other` are kept as written, fully covered
    /// rectangles vanish and partly covered ones are replaced by the
    /// remaining pieces in place, so the order of what remains is preserved.
    pub fn subtract(&self, other: &Sqref) -> Sqref {
        let mut out = Sqref::new();
        for area in &self.areas {
            let mut pieces = vec![area.range];
            for cut in &other.areas {
                pieces = pieces
                    .iter()
                    .flat_map(|piece| piece.subtract(&cut.range))
                    .collect();
                if pieces.is_empty() {
                    break;
                }
            }

            if pieces.len() == 1 && pieces[0] == area.range {
                out.areas.push(*area);
            } else {
                out.areas.extend(
                    pieces
                        .into_iter()
                        .map(|piece| Area::new(Self::inherit_flags(piece, &area.range))),
                );
            }
        }
        out
    }

    /// Carry the `$` markers of the rectangle a piece was cut from
    fn inherit_flags(piece: CellRange, from: &CellRange) -> CellRange {
        let start = CellAddress::with_absolute(
            piece.start.row,
            piece.start.col,
            from.start.row_absolute,
            from.start.col_absolute,
        );
        let end = if piece.is_single_cell() {
            start
        } else {
            CellAddress::with_absolute(
                piece.end.row,
                piece.end.col,
                from.end.row_absolute,
                from.end.col_absolute,
            )
        };
        CellRange { start, end }
    }

    /// Same rectangles with every reference made absolute (`$A$1:$B$2`)
    pub fn to_absolute(&self) -> Sqref {
        Sqref {
            areas: self
                .areas
                .iter()
                .map(|a| Area {
                    range: a.range.to_absolute(),
                    span: a.span,
                })
                .collect(),
        }
    }

    /// Canonical textual form
    pub fn to_a1_string(&self) -> String {
        self.areas
            .iter()
            .map(|a| a.to_a1_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<CellRange> for Sqref {
    fn from(range: CellRange) -> Self {
        Self {
            areas: vec![Area::new(range)],
        }
    }
}

impl FromIterator<CellRange> for Sqref {
    fn from_iter<I: IntoIterator<Item = CellRange>>(iter: I) -> Self {
        Self {
            areas: iter.into_iter().map(Area::new).collect(),
        }
    }
}

impl fmt::Display for Sqref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Sqref {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Sqref {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Sqref> for String {
    fn from(sqref: Sqref) -> Self {
        sqref.to_a1_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sq(text: &str) -> Sqref {
        Sqref::parse(text).unwrap()
    }

    #[test]
    fn test_parse_multiple_areas() {
        let r = sq("A1:B2  C3\tD4:E5");
        assert_eq!(r.len(), 3);
        assert_eq!(r.to_string(), "A1:B2 C3 D4:E5");
    }

    #[test]
    fn test_parse_normalizes_and_is_idempotent() {
        let r = sq("B5:A1 $D$9:C2");
        assert_eq!(r.to_string(), "A1:B5 C2:$D$9");
        assert_eq!(sq(&r.to_string()), r);
    }

    #[test]
    fn test_parse_errors_name_the_bad_cell() {
        let err = Sqref::parse("A1:A").unwrap_err();
        assert_eq!(
            err,
            Error::invalid_range("A", Error::InvalidCellName("A".into()))
        );
        assert!(Sqref::parse("A1 B").is_err());
        assert!(Sqref::parse("").is_err());
        assert!(Sqref::parse("   ").is_err());
    }

    #[test]
    fn test_equality_ignores_single_cell_spelling() {
        assert_eq!(sq("D2"), sq("D2:D2"));
        assert_eq!(sq("D2:D2").to_string(), "D2:D2");
        assert_ne!(sq("D2 D3"), sq("D3 D2"));
        assert_ne!(sq("$D$2"), sq("D2"));

        let mut seen = std::collections::HashSet::new();
        seen.insert(sq("D2"));
        assert!(seen.contains(&sq("D2:D2")));
    }

    #[test]
    fn test_intersects_and_contains() {
        let r = sq("A1:B2 D1:D10");
        assert!(r.intersects(&sq("B2:C3")));
        assert!(r.intersects(&sq("D10")));
        assert!(!r.intersects(&sq("C1:C10")));

        assert!(r.contains(&sq("A1 D5:D6")));
        assert!(!r.contains(&sq("A1:C1")));
        // Coverage may come from two rectangles together
        assert!(sq("A1:A2 B1:B2").contains(&sq("A1:B2")));
    }

    #[test]
    fn test_subtract_preserves_untouched_text() {
        assert_eq!(sq("D2:D2 D3 D4").subtract(&sq("D3")).to_string(), "D2:D2 D4");
    }

    #[test]
    fn test_subtract_shrinks_edges() {
        assert_eq!(sq("A1:B2").subtract(&sq("B1:B2")).to_string(), "A1:A2");
        assert_eq!(sq("C2:C5").subtract(&sq("C5")).to_string(), "C2:C4");
        assert_eq!(sq("C2:C5").subtract(&sq("C4")).to_string(), "C2:C3 C5");
    }

    #[test]
    fn test_subtract_keeps_absolute_markers() {
        assert_eq!(sq("$A$1:$A$5").subtract(&sq("A1")).to_string(), "$A$2:$A$5");
    }

    #[test]
    fn test_subtract_everything() {
        assert!(sq("A1").subtract(&sq("A1")).is_empty());
        assert!(sq("A1:B2 C3").subtract(&sq("A1:C3")).is_empty());
    }

    #[test]
    fn test_intersection() {
        assert_eq!(sq("A1:C3").intersection(&sq("B2:D4 A1")).to_string(), "B2:C3 A1");
        assert!(sq("A1").intersection(&sq("B2")).is_empty());
    }

    #[test]
    fn test_to_absolute() {
        assert_eq!(sq("E1:E3").to_absolute().to_string(), "$E$1:$E$3");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_as_text() {
        let r = sq("A1:B2 C3");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"A1:B2 C3\"");
        assert_eq!(serde_json::from_str::<Sqref>(&json).unwrap(), r);
        assert!(serde_json::from_str::<Sqref>("\"A\"").is_err());
    }
}
