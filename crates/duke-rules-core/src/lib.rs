//! # duke-rules-core
//!
//! Core data structures for the duke-rules spreadsheet validation library.
//!
//! This crate provides the fundamental types used throughout duke-rules:
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and rectangles
//! - [`Sqref`] - Multi-rectangle range references with intersection and subtraction
//! - [`DataValidation`] - A data validation rule bound to a range reference
//! - [`formula`] - Synthesis of list formulas with width accounting
//! - [`RuleStore`] - Per-sheet add/list/delete of validation rules
//! - [`SheetRegistry`] - The shared, lazily populated sheet fragment map
//! - [`Workbook`], [`Worksheet`] - The document and its per-sheet fragments
//!
//! ## Example
//!
//! ```rust
//! use duke_rules_core::{DataValidation, ValidationOperator, ValidationType, Workbook};
//!
//! let wb = Workbook::new();
//!
//! let mut dv = DataValidation::new(true);
//! dv.set_sqref("A1:B2").unwrap();
//! dv.set_operands(10, 20, ValidationType::Whole, ValidationOperator::Between)
//!     .unwrap();
//! wb.add_data_validation("Sheet1", dv).unwrap();
//!
//! assert_eq!(wb.data_validations("Sheet1").unwrap().len(), 1);
//! ```

pub mod cell;
pub mod error;
pub mod formula;
pub mod registry;
pub mod rules;
pub mod sqref;
pub mod validation;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{cell_name_to_coordinates, coordinates_to_cell_name, CellAddress, CellRange};
pub use error::{Error, Result};
pub use formula::ListLimits;
pub use registry::{SheetHandle, SheetRegistry};
pub use rules::{RuleStore, SheetCatalog};
pub use sqref::Sqref;
pub use validation::{
    Alert, AlertKind, DataValidation, ErrorStyle, Operand, ValidationOperator, ValidationType,
};
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::{DataValidations, Worksheet};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
