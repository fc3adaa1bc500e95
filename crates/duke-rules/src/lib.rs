//! # duke-rules
//!
//! Data validation rules for spreadsheet documents.
//!
//! ## Features
//!
//! - Range references with multiple rectangles, intersection and subtraction
//! - Inline list formulas with escaping and width checks
//! - Numeric, date, time, text length, list and custom formula rules
//! - A per-sheet rule store safe to use from many threads at once
//! - Reading and writing the `<dataValidations>` section of worksheet parts
//!
//! ## Example
//!
//! ```rust
//! use duke_rules::prelude::*;
//!
//! let workbook = Workbook::new();
//!
//! let mut rule = DataValidation::new(true);
//! rule.set_sqref("A1:B2").unwrap();
//! rule.set_operands(10, 20, ValidationType::Whole, ValidationOperator::Between)
//!     .unwrap();
//! rule.set_error(ErrorStyle::Stop, "Invalid", "Enter a whole number from 10 to 20");
//! workbook.add_data_validation("Sheet1", rule).unwrap();
//!
//! // Remove a column from every rule on the sheet
//! workbook.delete_data_validation("Sheet1", Some("B1:B2")).unwrap();
//! let rules = workbook.data_validations("Sheet1").unwrap();
//! assert_eq!(rules[0].sqref.to_string(), "A1:A2");
//!
//! // Save the worksheet part
//! // workbook.save_sheet("Sheet1", "/tmp/sheet1.xml").unwrap();
//! ```

pub mod prelude;

// Re-export core types
pub use duke_rules_core::{
    // Cell addressing
    cell_name_to_coordinates,
    coordinates_to_cell_name,
    // List formulas
    formula,
    // Data validation types
    Alert,
    AlertKind,
    CellAddress,
    CellRange,
    DataValidation,
    DataValidations,
    // Error types
    Error,
    ErrorStyle,
    ListLimits,
    Operand,
    Result,
    // Rule storage
    RuleStore,
    SheetCatalog,
    SheetHandle,
    SheetRegistry,
    Sqref,
    ValidationOperator,
    ValidationType,
    // Main types
    Workbook,
    WorkbookSettings,
    Worksheet,

    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use duke_rules_xlsx::{XlsxError, XlsxReader, XlsxResult, XlsxWriter};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Write one sheet's worksheet part to a file
    fn save_sheet<P: AsRef<Path>>(&self, sheet: &str, path: P) -> XlsxResult<()>;

    /// Replace one sheet's rules with those of a worksheet part file
    ///
    /// Returns the number of rules loaded.
    fn load_sheet<P: AsRef<Path>>(&self, sheet: &str, path: P) -> XlsxResult<usize>;
}

impl WorkbookExt for Workbook {
    fn save_sheet<P: AsRef<Path>>(&self, sheet: &str, path: P) -> XlsxResult<()> {
        let handle = self.worksheet(sheet)?;
        let fragment = handle.read();
        XlsxWriter::write_file(&fragment, path)
    }

    fn load_sheet<P: AsRef<Path>>(&self, sheet: &str, path: P) -> XlsxResult<usize> {
        let validations = XlsxReader::read_file(path)?;
        let count = validations.len();
        self.worksheet(sheet)?
            .write()
            .set_data_validations(validations);
        Ok(count)
    }
}
