//! Error types for duke-rules-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in duke-rules-core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A cell name could not be decoded into coordinates
    #[error("invalid cell name \"{0}\"")]
    InvalidCellName(String),

    /// Row index out of bounds
    #[error("row number {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("column number {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u16),

    /// A range reference token could not be converted to coordinates
    #[error("cannot convert cell \"{text}\" to coordinates: {cause}")]
    InvalidRange {
        /// The offending cell token
        text: String,
        /// The underlying cell name error
        #[source]
        cause: Box<Error>,
    },

    /// A rule was added without any target cells
    #[error("data validation has no cell range")]
    MissingRange,

    /// Sheet not found by name
    #[error("sheet {0} does not exist")]
    SheetNotFound(String),

    /// Invalid sheet name
    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// A list formula is wider than the format allows, or has too many items
    #[error("data validation formula exceeds the limit of {max} {unit} (got {actual})")]
    FormulaTooLong {
        actual: usize,
        max: usize,
        unit: &'static str,
    },

    /// A single list item is wider than the format allows on its own
    #[error("data validation list item {item} is {width} characters wide (max: {max})")]
    FormulaFieldTooLong { item: usize, width: usize, max: usize },

    /// An operand is absent, of the wrong shape, or not representable
    #[error("invalid data validation operand: {0}")]
    InvalidOperand(String),

    /// A numeric operand lies outside the representable range
    #[error("data validation operand {0} exceeds the representable range")]
    OperandRange(f64),
}

impl Error {
    /// Wrap a cell name failure for the given range token
    pub fn invalid_range<S: Into<String>>(text: S, cause: Error) -> Self {
        Error::InvalidRange {
            text: text.into(),
            cause: Box::new(cause),
        }
    }

    /// Create an invalid operand error with a message
    pub fn invalid_operand<S: Into<String>>(msg: S) -> Self {
        Error::InvalidOperand(msg.into())
    }
}
