//! Prelude module - common imports for duke-rules users
//!
//! ```rust
//! use duke_rules::prelude::*;
//! ```

pub use crate::{
    AlertKind,
    CellAddress,
    CellRange,
    // Data validation types
    DataValidation,
    // Error types
    Error,
    ErrorStyle,
    Operand,
    Result,
    Sqref,
    ValidationOperator,
    ValidationType,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
    Worksheet,

    // I/O types
    XlsxReader,
    XlsxWriter,
};
