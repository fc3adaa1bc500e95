//! List formula synthesis
//!
//! A list validation stores its allowed values as a single quoted literal,
//! e.g. `"Yes,No,Maybe"`, which ends up verbatim inside `<formula1>`. The
//! text produced here is therefore already escaped for the markup: `&`,
//! `<` and `>` become entities, and a literal quote is doubled.
//!
//! Spreadsheet applications count characters in UTF-16 code units, so
//! characters outside the basic multilingual plane count twice.
//!
//! ```rust
//! use duke_rules_core::formula::encode_list;
//!
//! assert_eq!(encode_list(&["1", "2", "3"]).unwrap(), "\"1,2,3\"");
//! assert_eq!(encode_list(&["A<", "C\""]).unwrap(), "\"A&lt;,C\"\"\"");
//! ```

use crate::cell::CellRange;
use crate::error::{Error, Result};

/// Maximum width of a list formula, in UTF-16 code units
pub const MAX_FORMULA_WIDTH: usize = 255;

/// Maximum number of items an inline list can hold
pub const MAX_LIST_ITEMS: usize = 256;

/// Separator between inline list items
pub const LIST_SEPARATOR: char = ',';

/// Limits applied when encoding an inline list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListLimits {
    /// Maximum width of one item and of the joined list
    pub max_formula_width: usize,
    /// Maximum number of items
    pub max_items: usize,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            max_formula_width: MAX_FORMULA_WIDTH,
            max_items: MAX_LIST_ITEMS,
        }
    }
}

/// Width of a string in UTF-16 code units
pub fn text_width(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Replace `&`, `<` and `>` with their entity forms
pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_markup`]
pub fn unescape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let (decoded, len) = if rest.starts_with("&amp;") {
            ('&', 5)
        } else if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else {
            ('&', 1)
        };
        out.push(decoded);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}

/// Whether text can be placed into markup verbatim
///
/// `<` and `>` must be escaped and every `&` must start one of the
/// predefined entities or a numeric character reference.
pub fn is_escaped_markup(s: &str) -> bool {
    let mut rest = s;
    while let Some(pos) = rest.find(|c| matches!(c, '&' | '<' | '>')) {
        let tail = &rest[pos..];
        if !tail.starts_with('&') {
            return false;
        }
        let Some(end) = tail.find(';') else {
            return false;
        };
        let name = &tail[1..end];
        if !(matches!(name, "amp" | "lt" | "gt" | "quot" | "apos") || is_char_ref(name)) {
            return false;
        }
        rest = &tail[end + 1..];
    }
    true
}

fn is_char_ref(name: &str) -> bool {
    let Some(number) = name.strip_prefix('#') else {
        return false;
    };
    match number.strip_prefix('x') {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()),
    }
}

/// Escape one inline list item
fn escape_item(item: &str) -> String {
    escape_markup(item).replace('"', "\"\"")
}

/// Encode an inline list with the default [`ListLimits`]
pub fn encode_list<S: AsRef<str>>(items: &[S]) -> Result<String> {
    encode_list_with(items, &ListLimits::default())
}

/// Encode an inline list as a quoted formula literal
///
/// A list made of exactly one item starting with `=` is a formula
/// reference (`=Sheet2!$A$1:$A$9`, `=INDIRECT(A1)`): the `=` is dropped
/// and the rest used as is, apart from entity escaping. The `=` still
/// counts against the width limit.
///
/// Items are joined as given, so an item holding the separator reads
/// back as several items (see [`decode_list`]).
///
/// Widths are measured on the item text itself; the entity escaping is
/// markup transport and does not count against the limit.
pub fn encode_list_with<S: AsRef<str>>(items: &[S], limits: &ListLimits) -> Result<String> {
    if items.len() > limits.max_items {
        return Err(Error::FormulaTooLong {
            actual: items.len(),
            max: limits.max_items,
            unit: "items",
        });
    }

    if let [only] = items {
        if only.as_ref().starts_with('=') {
            return encode_reference(only.as_ref(), limits);
        }
    }

    let mut total = items.len().saturating_sub(1);
    for (index, item) in items.iter().enumerate() {
        let item = item.as_ref();
        let width = text_width(item);
        if width > limits.max_formula_width {
            return Err(Error::FormulaFieldTooLong {
                item: index,
                width,
                max: limits.max_formula_width,
            });
        }
        total += width;
    }

    if total > limits.max_formula_width {
        return Err(Error::FormulaTooLong {
            actual: total,
            max: limits.max_formula_width,
            unit: "characters",
        });
    }

    let body = items
        .iter()
        .map(|item| escape_item(item.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("\"{}\"", body))
}

/// `formula` still carries its leading `=`
fn encode_reference(formula: &str, limits: &ListLimits) -> Result<String> {
    let width = text_width(formula);
    if width > limits.max_formula_width {
        return Err(Error::FormulaFieldTooLong {
            item: 0,
            width,
            max: limits.max_formula_width,
        });
    }
    let reference = formula.strip_prefix('=').unwrap_or(formula);
    if reference.trim().is_empty() {
        return Err(Error::invalid_operand("empty formula reference"));
    }
    Ok(escape_markup(reference))
}

/// Decode a quoted inline list back into its items
///
/// Returns `None` when the formula is not a quoted literal (a reference
/// or a range source). The empty literal `""` decodes to no items.
///
/// The literal is split on every separator, so an encoded item that
/// contained one comes back as several items: `["Yes,No", "Maybe"]`
/// decodes to `["Yes", "No", "Maybe"]`.
pub fn decode_list(formula: &str) -> Option<Vec<String>> {
    let inner = formula.strip_prefix('"')?.strip_suffix('"')?;
    if inner.is_empty() {
        return Some(Vec::new());
    }
    Some(
        inner
            .split(LIST_SEPARATOR)
            .map(|item| unescape_markup(&item.replace("\"\"", "\"")))
            .collect(),
    )
}

/// Absolute reference to a cell range used as a list source (`$E$1:$E$3`)
pub fn encode_range(range: &CellRange) -> String {
    range.to_absolute().to_a1_string()
}

/// Absolute reference to a cell range on another sheet (`'Q1 Data'!$A$1:$A$9`)
pub fn encode_sheet_range(sheet: &str, range: &CellRange) -> String {
    let plain = sheet
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        && !sheet.starts_with(|c: char| c.is_ascii_digit());
    let sheet = if plain {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    };
    escape_markup(&format!("{}!{}", sheet, encode_range(range)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_list() {
        assert_eq!(encode_list(&["1", "2", "3"]).unwrap(), "\"1,2,3\"");
    }

    #[test]
    fn test_reserved_characters() {
        let items = ["A<", "B>", "C\"", "D\t", "E'", "F"];
        assert_eq!(
            encode_list(&items).unwrap(),
            "\"A&lt;,B&gt;,C\"\",D\t,E',F\""
        );
    }

    #[test]
    fn test_formula_reference() {
        assert_eq!(encode_list(&["=A1"]).unwrap(), "A1");
        assert_eq!(
            encode_list(&["=IF(A1<2,B1:B3,C1:C3)"]).unwrap(),
            "IF(A1&lt;2,B1:B3,C1:C3)"
        );
        assert!(encode_list(&["="]).is_err());
    }

    #[test]
    fn test_formula_reference_width_counts_the_equals_sign() {
        let at_limit = format!("={}", "a".repeat(MAX_FORMULA_WIDTH - 1));
        assert_eq!(encode_list(&[at_limit]).unwrap(), "a".repeat(MAX_FORMULA_WIDTH - 1));

        let over = format!("={}", "a".repeat(MAX_FORMULA_WIDTH));
        assert!(matches!(
            encode_list(&[over]),
            Err(Error::FormulaFieldTooLong { item: 0, width: 256, max: 255 })
        ));
    }

    #[test]
    fn test_empty_list_and_duplicates() {
        let empty: [&str; 0] = [];
        assert_eq!(encode_list(&empty).unwrap(), "\"\"");
        assert_eq!(encode_list(&["a", "a"]).unwrap(), "\"a,a\"");
    }

    #[test]
    fn test_width_counts_code_units() {
        assert_eq!(text_width("abc"), 3);
        assert_eq!(text_width("\u{4E00}"), 1);
        assert_eq!(text_width("\u{1F600}"), 2);
    }

    #[test]
    fn test_widths_at_the_limit_are_accepted() {
        assert!(encode_list(&["&".repeat(MAX_FORMULA_WIDTH)]).is_ok());
        assert!(encode_list(&["\u{4E00}".repeat(MAX_FORMULA_WIDTH)]).is_ok());
        let mixed = [
            "\u{1F600}".repeat(100),
            "\u{4E01}".repeat(50),
            "<&>".to_string(),
        ];
        assert!(encode_list(&mixed).is_ok());
        assert!(encode_list(&vec![""; MAX_LIST_ITEMS]).is_ok());
    }

    #[test]
    fn test_single_item_too_wide() {
        for item in [
            "s".repeat(256),
            "\u{4E00}".repeat(256),
            "\u{1F600}".repeat(128),
        ] {
            assert!(matches!(
                encode_list(&[item]),
                Err(Error::FormulaFieldTooLong { item: 0, width: 256, max: 255 })
            ));
        }
    }

    #[test]
    fn test_joined_list_too_wide() {
        let items = ["\u{1F600}".repeat(127), "s".to_string()];
        assert!(matches!(
            encode_list(&items),
            Err(Error::FormulaTooLong { actual: 256, max: 255, .. })
        ));
    }

    #[test]
    fn test_too_many_items() {
        for count in [257, 258] {
            assert!(matches!(
                encode_list(&vec![""; count]),
                Err(Error::FormulaTooLong { unit: "items", .. })
            ));
        }
    }

    #[test]
    fn test_custom_limits() {
        let limits = ListLimits {
            max_formula_width: 5,
            max_items: 2,
        };
        assert!(encode_list_with(&["ab", "cd"], &limits).is_ok());
        assert!(encode_list_with(&["ab", "cde"], &limits).is_err());
        assert!(encode_list_with(&["a", "b", "c"], &limits).is_err());
    }

    #[test]
    fn test_separator_in_item_is_joined_as_is() {
        let formula = encode_list(&["Yes,No", "Maybe"]).unwrap();
        assert_eq!(formula, "\"Yes,No,Maybe\"");
        assert_eq!(decode_list(&formula).unwrap(), vec!["Yes", "No", "Maybe"]);
    }

    #[test]
    fn test_decode_list() {
        let items = vec!["A<", "B>", "C\"", "&lt;", "E'"];
        let formula = encode_list(&items).unwrap();
        assert_eq!(decode_list(&formula).unwrap(), items);
        assert_eq!(decode_list("\"\"").unwrap(), Vec::<String>::new());
        assert_eq!(decode_list("$A$1:$A$3"), None);
    }

    #[test]
    fn test_is_escaped_markup() {
        assert!(is_escaped_markup("A1"));
        assert!(is_escaped_markup("B1&lt;C1"));
        assert!(is_escaped_markup("&amp;&gt;&quot;&apos;&#60;&#x3C;"));
        assert!(is_escaped_markup(&escape_markup("D1&E1<>")));

        assert!(!is_escaped_markup("B1<C1"));
        assert!(!is_escaped_markup("B1>C1"));
        assert!(!is_escaped_markup("D1&E1"));
        assert!(!is_escaped_markup("&nbsp;"));
        assert!(!is_escaped_markup("&#;"));
        assert!(!is_escaped_markup("&#xZZ;"));
    }

    #[test]
    fn test_unescape_leaves_stray_ampersands() {
        assert_eq!(unescape_markup("a & b &amp;lt;"), "a & b &lt;");
    }

    #[test]
    fn test_encode_ranges() {
        let range = CellRange::parse("E1:E3").unwrap();
        assert_eq!(encode_range(&range), "$E$1:$E$3");
        assert_eq!(encode_sheet_range("Sheet2", &range), "Sheet2!$E$1:$E$3");
        assert_eq!(
            encode_sheet_range("Bob's data", &range),
            "'Bob''s data'!$E$1:$E$3"
        );
        assert_eq!(encode_sheet_range("2024", &range), "'2024'!$E$1:$E$3");
    }
}
