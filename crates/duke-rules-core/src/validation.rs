//! Data validation
//!
//! This module provides the data validation rule model. A rule restricts
//! the type and range of data that users can enter in the cells named by
//! its [`Sqref`], and can display an input prompt and an error alert.
//!
//! ## Example
//!
//! ```rust
//! use duke_rules_core::{DataValidation, ErrorStyle, ValidationOperator, ValidationType};
//!
//! let mut dv = DataValidation::new(true);
//! dv.set_sqref("A1:B2").unwrap();
//! dv.set_operands(10, 20, ValidationType::Whole, ValidationOperator::Between)
//!     .unwrap();
//! dv.set_error(ErrorStyle::Stop, "Out of range", "Enter a number from 10 to 20");
//!
//! assert_eq!(dv.formula1().as_deref(), Some("10"));
//! assert_eq!(dv.formula2().as_deref(), Some("20"));
//! ```

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::cell::{CellAddress, CellRange};
use crate::error::{Error, Result};
use crate::formula::{self, ListLimits};
use crate::sqref::Sqref;

/// Days between 0001-01-01 and the 1900 date system epoch (1899-12-30)
const EPOCH_DAYS_FROM_CE: i32 = 693_594;

/// One side of a comparison
///
/// Formula text is kept in its serialized form: no leading `=`, with
/// `&`, `<` and `>` already entity-escaped, so it can be written into
/// `<formula1>`/`<formula2>` verbatim. Use [`Operand::formula`] to build
/// one from plain text; [`Operand::validate`] rejects unescaped text.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// No value supplied
    #[default]
    Absent,
    /// A numeric literal
    Number(f64),
    /// A formula or cell reference
    Formula(String),
}

impl Operand {
    /// Build a formula operand from plain formula text (`=A1` or `A1`)
    pub fn formula(text: &str) -> Self {
        let text = text.strip_prefix('=').unwrap_or(text);
        Operand::Formula(formula::escape_markup(text))
    }

    /// Whether no value was supplied
    pub fn is_absent(&self) -> bool {
        matches!(self, Operand::Absent)
    }

    /// Check that the operand can be written to a formula field
    ///
    /// Numbers must fit the single precision range the format stores
    /// bounds in; the boundary values themselves are accepted.
    pub fn validate(&self) -> Result<()> {
        match self {
            Operand::Absent => Ok(()),
            Operand::Number(v) => {
                if v.is_finite() && v.abs() <= f32::MAX as f64 {
                    Ok(())
                } else {
                    Err(Error::OperandRange(*v))
                }
            }
            Operand::Formula(text) if text.trim().is_empty() => {
                Err(Error::invalid_operand("formula operand is empty"))
            }
            Operand::Formula(text) if !formula::is_escaped_markup(text) => Err(
                Error::invalid_operand(format!("formula operand \"{}\" is not escaped", text)),
            ),
            Operand::Formula(_) => Ok(()),
        }
    }

    /// Formula field text for this operand
    ///
    /// Formula text assigned without escaping is escaped here.
    pub fn to_formula(&self) -> Option<String> {
        match self {
            Operand::Absent => None,
            Operand::Number(v) => Some(format_number(*v)),
            Operand::Formula(text) if formula::is_escaped_markup(text) => Some(text.clone()),
            Operand::Formula(text) => Some(formula::escape_markup(text)),
        }
    }

    fn same_kind(&self, other: &Operand) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Number(v)
    }
}

impl From<f32> for Operand {
    fn from(v: f32) -> Self {
        Operand::Number(v as f64)
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Number(v as f64)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Number(v as f64)
    }
}

impl From<u32> for Operand {
    fn from(v: u32) -> Self {
        Operand::Number(v as f64)
    }
}

impl From<&str> for Operand {
    fn from(text: &str) -> Self {
        Operand::formula(text)
    }
}

impl From<String> for Operand {
    fn from(text: String) -> Self {
        Operand::formula(&text)
    }
}

/// Dates become serial numbers in the 1900 date system (valid from 1900-03-01)
impl From<NaiveDate> for Operand {
    fn from(date: NaiveDate) -> Self {
        Operand::Number((date.num_days_from_ce() - EPOCH_DAYS_FROM_CE) as f64)
    }
}

/// Times become fractions of a day
impl From<NaiveTime> for Operand {
    fn from(time: NaiveTime) -> Self {
        let seconds = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;
        Operand::Number(seconds / 86_400.0)
    }
}

impl From<NaiveDateTime> for Operand {
    fn from(dt: NaiveDateTime) -> Self {
        match (Operand::from(dt.date()), Operand::from(dt.time())) {
            (Operand::Number(day), Operand::Number(fraction)) => Operand::Number(day + fraction),
            (date, _) => date,
        }
    }
}

impl<T: Into<Operand>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        v.map_or(Operand::Absent, Into::into)
    }
}

/// Which of the two alert blocks a rule carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlertKind {
    /// Shown when invalid data is entered (may block the entry)
    Error,
    /// Shown when the cell is selected (advisory only)
    Input,
}

/// Title and body of an alert, plus whether it is shown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alert {
    pub enabled: bool,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Alert {
    /// An enabled alert with the given text
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            enabled: true,
            title: Some(title.into()),
            body: Some(body.into()),
        }
    }
}

/// Data validation rule for cells
///
/// Controls what data can be entered into cells, and can display
/// input messages and error alerts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataValidation {
    /// Cells this validation applies to
    pub sqref: Sqref,
    /// Type of validation
    pub validation_type: ValidationType,
    /// Comparison operator (numeric, date, time and text length types)
    pub operator: ValidationOperator,
    /// First operand, or the list source for list validations
    pub operand1: Operand,
    /// Second operand, only kept for between/not between
    pub operand2: Operand,
    /// Allow blank/empty cells
    pub allow_blank: bool,
    /// Show dropdown for list validation
    pub show_dropdown: bool,
    /// Error alert style
    pub error_style: ErrorStyle,
    /// Error alert (shown when invalid data entered)
    pub error_alert: Alert,
    /// Input prompt (shown when cell is selected)
    pub input_prompt: Alert,
}

impl Default for DataValidation {
    fn default() -> Self {
        Self {
            sqref: Sqref::new(),
            validation_type: ValidationType::None,
            operator: ValidationOperator::Between,
            operand1: Operand::Absent,
            operand2: Operand::Absent,
            allow_blank: true,
            show_dropdown: true,
            error_style: ErrorStyle::Stop,
            error_alert: Alert::default(),
            input_prompt: Alert::default(),
        }
    }
}

impl DataValidation {
    /// Create a new data validation with no restrictions
    pub fn new(allow_blank: bool) -> Self {
        Self {
            allow_blank,
            ..Self::default()
        }
    }

    /// Create a list validation from inline values
    ///
    /// ```rust
    /// use duke_rules_core::DataValidation;
    ///
    /// let dv = DataValidation::list(&["Red", "Green", "Blue"]).unwrap();
    /// assert_eq!(dv.formula1().as_deref(), Some("\"Red,Green,Blue\""));
    /// ```
    pub fn list<S: AsRef<str>>(items: &[S]) -> Result<Self> {
        let mut dv = Self::default();
        dv.set_drop_list(items)?;
        Ok(dv)
    }

    /// Create a custom formula validation
    ///
    /// ```rust
    /// use duke_rules_core::DataValidation;
    ///
    /// // Only allow values that are multiples of 5
    /// let dv = DataValidation::custom("=MOD(A1,5)=0").unwrap();
    /// assert_eq!(dv.formula1().as_deref(), Some("MOD(A1,5)=0"));
    /// ```
    pub fn custom(formula: &str) -> Result<Self> {
        let mut dv = Self::default();
        dv.set_custom(formula)?;
        Ok(dv)
    }

    /// Set the cells this validation applies to
    pub fn with_sqref(mut self, sqref: Sqref) -> Self {
        self.sqref = sqref;
        self
    }

    /// Add a cell range to this validation
    pub fn with_range(mut self, range: CellRange) -> Self {
        self.sqref.push(range);
        self
    }

    /// Set whether blank cells are allowed
    pub fn with_allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    /// Set whether to show dropdown for list validation
    pub fn with_dropdown(mut self, show: bool) -> Self {
        self.show_dropdown = show;
        self
    }

    /// Replace the target cells from sqref text (`"A1:B2 D4"`)
    pub fn set_sqref(&mut self, text: &str) -> Result<()> {
        self.sqref = Sqref::parse(text)?;
        Ok(())
    }

    /// Append more target cells; repeated rectangles are kept
    pub fn add_sqref(&mut self, text: &str) -> Result<()> {
        let more = Sqref::parse(text)?;
        self.sqref.extend(&more);
        Ok(())
    }

    /// Set a comparison rule
    ///
    /// `operand1` is always required and `operand2` is required for
    /// between/not between. When both are given they must both be numbers
    /// or both be formulas. A second operand passed with a one-sided
    /// operator is validated and then dropped. On error nothing changes.
    pub fn set_operands(
        &mut self,
        operand1: impl Into<Operand>,
        operand2: impl Into<Operand>,
        validation_type: ValidationType,
        operator: ValidationOperator,
    ) -> Result<()> {
        let operand1 = operand1.into();
        let operand2 = operand2.into();

        if !validation_type.is_comparison() {
            return Err(Error::invalid_operand(format!(
                "{} validations do not take comparison operands",
                validation_type.xlsx_type()
            )));
        }
        if operand1.is_absent() {
            return Err(Error::invalid_operand("the first operand is required"));
        }
        operand1.validate()?;

        if operand2.is_absent() {
            if operator.requires_two_values() {
                return Err(Error::invalid_operand(format!(
                    "the {} operator requires a second operand",
                    operator.xlsx_operator()
                )));
            }
        } else {
            operand2.validate()?;
            if !operand1.same_kind(&operand2) {
                return Err(Error::invalid_operand(
                    "operands must both be numbers or both be formulas",
                ));
            }
        }

        self.validation_type = validation_type;
        self.operator = operator;
        self.operand1 = operand1;
        self.operand2 = if operator.requires_two_values() {
            operand2
        } else {
            Operand::Absent
        };
        Ok(())
    }

    /// Make this a list validation over inline values
    pub fn set_drop_list<S: AsRef<str>>(&mut self, items: &[S]) -> Result<()> {
        self.set_drop_list_with(items, &ListLimits::default())
    }

    /// [`set_drop_list`](Self::set_drop_list) with explicit limits
    pub fn set_drop_list_with<S: AsRef<str>>(
        &mut self,
        items: &[S],
        limits: &ListLimits,
    ) -> Result<()> {
        let formula = formula::encode_list_with(items, limits)?;
        self.set_list_source(formula);
        Ok(())
    }

    /// Make this a list validation whose values come from a cell range
    pub fn set_sqref_drop_list(&mut self, range: &str) -> Result<()> {
        let range = Self::parse_source_range(range)?;
        self.set_list_source(formula::encode_range(&range));
        Ok(())
    }

    /// Make this a list validation whose values come from a range on another sheet
    pub fn set_sheet_drop_list(&mut self, sheet: &str, range: &str) -> Result<()> {
        let range = Self::parse_source_range(range)?;
        self.set_list_source(formula::encode_sheet_range(sheet, &range));
        Ok(())
    }

    fn parse_source_range(text: &str) -> Result<CellRange> {
        let sqref = Sqref::parse(text)?;
        let mut ranges = sqref.ranges();
        match (ranges.next(), ranges.next()) {
            (Some(range), None) => Ok(*range),
            _ => Err(Error::invalid_operand(format!(
                "list source \"{}\" must be a single range",
                text
            ))),
        }
    }

    fn set_list_source(&mut self, formula: String) {
        self.validation_type = ValidationType::List;
        self.operator = ValidationOperator::Between;
        self.operand1 = Operand::Formula(formula);
        self.operand2 = Operand::Absent;
    }

    /// Make this a custom formula validation
    pub fn set_custom(&mut self, formula: &str) -> Result<()> {
        let operand = Operand::formula(formula);
        operand.validate()?;
        self.validation_type = ValidationType::Custom;
        self.operator = ValidationOperator::Between;
        self.operand1 = operand;
        self.operand2 = Operand::Absent;
        Ok(())
    }

    /// Set the error alert and its style
    pub fn set_error(&mut self, style: ErrorStyle, title: &str, body: &str) {
        self.error_style = style;
        self.set_alert(AlertKind::Error, title, body);
    }

    /// Set the input prompt
    pub fn set_input(&mut self, title: &str, body: &str) {
        self.set_alert(AlertKind::Input, title, body);
    }

    /// Set either alert; a later call replaces the earlier text of the same kind
    pub fn set_alert(&mut self, kind: AlertKind, title: &str, body: &str) {
        *self.alert_mut(kind) = Alert::new(title, body);
    }

    /// Show or hide an alert without touching its text
    pub fn set_alert_enabled(&mut self, kind: AlertKind, enabled: bool) {
        self.alert_mut(kind).enabled = enabled;
    }

    /// Get an alert block
    pub fn alert(&self, kind: AlertKind) -> &Alert {
        match kind {
            AlertKind::Error => &self.error_alert,
            AlertKind::Input => &self.input_prompt,
        }
    }

    fn alert_mut(&mut self, kind: AlertKind) -> &mut Alert {
        match kind {
            AlertKind::Error => &mut self.error_alert,
            AlertKind::Input => &mut self.input_prompt,
        }
    }

    /// Text of `<formula1>`
    pub fn formula1(&self) -> Option<String> {
        self.operand1.to_formula()
    }

    /// Text of `<formula2>`
    pub fn formula2(&self) -> Option<String> {
        self.operand2.to_formula()
    }

    /// Inline values of a list validation, if the source is an inline list
    pub fn list_items(&self) -> Option<Vec<String>> {
        match (&self.validation_type, &self.operand1) {
            (ValidationType::List, Operand::Formula(text)) => formula::decode_list(text),
            _ => None,
        }
    }

    /// Check if this validation applies to a specific cell
    pub fn applies_to(&self, row: u32, col: u16) -> bool {
        self.sqref.contains_cell(&CellAddress::new(row, col))
    }
}

/// Types of data validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationType {
    /// No validation (any value allowed)
    #[default]
    None,
    /// Must be a whole number
    Whole,
    /// Must be a decimal number
    Decimal,
    /// Must be from a list
    List,
    /// Must be a date
    Date,
    /// Must be a time
    Time,
    /// Text length constraint
    TextLength,
    /// Custom formula validation
    Custom,
}

impl ValidationType {
    /// Get the XLSX type string for this validation type
    pub fn xlsx_type(&self) -> &'static str {
        match self {
            ValidationType::None => "none",
            ValidationType::Whole => "whole",
            ValidationType::Decimal => "decimal",
            ValidationType::List => "list",
            ValidationType::Date => "date",
            ValidationType::Time => "time",
            ValidationType::TextLength => "textLength",
            ValidationType::Custom => "custom",
        }
    }

    /// Parse from XLSX type string
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "none" => Some(ValidationType::None),
            "whole" => Some(ValidationType::Whole),
            "decimal" => Some(ValidationType::Decimal),
            "list" => Some(ValidationType::List),
            "date" => Some(ValidationType::Date),
            "time" => Some(ValidationType::Time),
            "textLength" => Some(ValidationType::TextLength),
            "custom" => Some(ValidationType::Custom),
            _ => None,
        }
    }

    /// Whether the type compares the cell against operands with an operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            ValidationType::Whole
                | ValidationType::Decimal
                | ValidationType::Date
                | ValidationType::Time
                | ValidationType::TextLength
        )
    }
}

/// Comparison operators for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationOperator {
    /// Value must be between value1 and value2
    #[default]
    Between,
    /// Value must NOT be between value1 and value2
    NotBetween,
    /// Value must equal value1
    Equal,
    /// Value must NOT equal value1
    NotEqual,
    /// Value must be greater than value1
    GreaterThan,
    /// Value must be less than value1
    LessThan,
    /// Value must be greater than or equal to value1
    GreaterThanOrEqual,
    /// Value must be less than or equal to value1
    LessThanOrEqual,
}

impl ValidationOperator {
    /// Get the XLSX operator string
    pub fn xlsx_operator(&self) -> &'static str {
        match self {
            ValidationOperator::Between => "between",
            ValidationOperator::NotBetween => "notBetween",
            ValidationOperator::Equal => "equal",
            ValidationOperator::NotEqual => "notEqual",
            ValidationOperator::GreaterThan => "greaterThan",
            ValidationOperator::LessThan => "lessThan",
            ValidationOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            ValidationOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }

    /// Parse from XLSX operator string
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "between" => Some(ValidationOperator::Between),
            "notBetween" => Some(ValidationOperator::NotBetween),
            "equal" => Some(ValidationOperator::Equal),
            "notEqual" => Some(ValidationOperator::NotEqual),
            "greaterThan" => Some(ValidationOperator::GreaterThan),
            "lessThan" => Some(ValidationOperator::LessThan),
            "greaterThanOrEqual" => Some(ValidationOperator::GreaterThanOrEqual),
            "lessThanOrEqual" => Some(ValidationOperator::LessThanOrEqual),
            _ => None,
        }
    }

    /// Check if this operator requires two values
    pub fn requires_two_values(&self) -> bool {
        matches!(
            self,
            ValidationOperator::Between | ValidationOperator::NotBetween
        )
    }
}

/// Error alert styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorStyle {
    /// Reject invalid data (default)
    #[default]
    Stop,
    /// Warn but allow
    Warning,
    /// Just inform
    Information,
}

impl ErrorStyle {
    /// Get the XLSX error style string
    pub fn xlsx_style(&self) -> &'static str {
        match self {
            ErrorStyle::Stop => "stop",
            ErrorStyle::Warning => "warning",
            ErrorStyle::Information => "information",
        }
    }

    /// Parse from XLSX style string
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "stop" => Some(ErrorStyle::Stop),
            "warning" => Some(ErrorStyle::Warning),
            "information" => Some(ErrorStyle::Information),
            _ => None,
        }
    }
}
