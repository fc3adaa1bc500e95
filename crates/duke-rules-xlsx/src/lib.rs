//! # duke-rules-xlsx
//!
//! Reads and writes the `<dataValidations>` section of SpreadsheetML
//! worksheet parts (`xl/worksheets/sheetN.xml`).
//!
//! ```rust
//! use duke_rules_core::{DataValidation, Workbook};
//! use duke_rules_xlsx::{XlsxReader, XlsxWriter};
//!
//! let wb = Workbook::new();
//! let mut dv = DataValidation::new(true);
//! dv.set_sqref("B1:B9").unwrap();
//! dv.set_drop_list(&["Yes", "No"]).unwrap();
//! wb.add_data_validation("Sheet1", dv).unwrap();
//!
//! let sheet = wb.worksheet("Sheet1").unwrap();
//! let xml = XlsxWriter::write_worksheet(&sheet.read());
//! let rules = XlsxReader::read_data_validations(&xml).unwrap();
//! assert_eq!(rules, wb.data_validations("Sheet1").unwrap());
//! ```

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;

/// SpreadsheetML main namespace
pub const SPREADSHEETML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
