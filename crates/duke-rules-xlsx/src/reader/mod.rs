//! Worksheet XML reader

use std::fs;
use std::path::Path;

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use duke_rules_core::formula::escape_markup;
use duke_rules_core::{
    Alert, DataValidation, ErrorStyle, Operand, Sqref, ValidationOperator, ValidationType,
    Workbook,
};

/// Reads worksheet parts
pub struct XlsxReader;

impl XlsxReader {
    /// Read the data validations of a worksheet part stored in a file
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Vec<DataValidation>> {
        let xml = fs::read_to_string(path)?;
        Self::read_data_validations(&xml)
    }

    /// Parse a worksheet part into the sheet's fragment, replacing its rules
    ///
    /// Returns the number of rules loaded.
    pub fn load_worksheet(workbook: &Workbook, sheet: &str, xml: &str) -> XlsxResult<usize> {
        let validations = Self::read_data_validations(xml)?;
        let count = validations.len();
        let handle = workbook.worksheet(sheet)?;
        handle.write().set_data_validations(validations);
        Ok(count)
    }

    /// Parse the `<dataValidation>` elements of a worksheet part, in document order
    ///
    /// Formula text is re-escaped so it matches what the rule setters store.
    pub fn read_data_validations(xml: &str) -> XlsxResult<Vec<DataValidation>> {
        let mut xml_reader = Reader::from_str(xml);
        xml_reader.trim_text(true);

        let mut validations = Vec::new();

        // Data validation state
        let mut current_validation: Option<DataValidation> = None;
        let mut in_dv_formula1 = false;
        let mut in_dv_formula2 = false;
        let mut dv_formula1: Option<String> = None;
        let mut dv_formula2: Option<String> = None;

        loop {
            match xml_reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"dataValidation" => {
                        dv_formula1 = None;
                        dv_formula2 = None;
                        current_validation = Self::parse_data_validation_attrs(&e)?;
                    }
                    b"formula1" if current_validation.is_some() => {
                        in_dv_formula1 = true;
                    }
                    b"formula2" if current_validation.is_some() => {
                        in_dv_formula2 = true;
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == b"dataValidation" {
                        if let Some(validation) = Self::parse_data_validation_attrs(&e)? {
                            validations.push(validation);
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_dv_formula1 {
                        dv_formula1
                            .get_or_insert_with(String::new)
                            .push_str(&e.unescape()?);
                    } else if in_dv_formula2 {
                        dv_formula2
                            .get_or_insert_with(String::new)
                            .push_str(&e.unescape()?);
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"dataValidation" => {
                        if let Some(mut validation) = current_validation.take() {
                            Self::apply_validation_formulas(
                                &mut validation,
                                dv_formula1.take(),
                                dv_formula2.take(),
                            );
                            validations.push(validation);
                        }
                    }
                    b"formula1" => {
                        in_dv_formula1 = false;
                    }
                    b"formula2" => {
                        in_dv_formula2 = false;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
        }

        if current_validation.is_some() {
            return Err(XlsxError::Parse(
                "unexpected end of document inside <dataValidation>".into(),
            ));
        }

        Ok(validations)
    }

    /// Parse data validation attributes from an element
    ///
    /// Elements without a `sqref` are skipped.
    fn parse_data_validation_attrs(e: &BytesStart) -> XlsxResult<Option<DataValidation>> {
        let mut validation = DataValidation::new(false);
        let mut sqref: Option<Sqref> = None;
        let mut error_alert = Alert::default();
        let mut input_prompt = Alert::default();

        for attr in e.attributes().flatten() {
            let value = attr.unescape_value()?;
            let flag = value.as_ref() == "1" || value.as_ref() == "true";
            match attr.key.as_ref() {
                b"type" => {
                    validation.validation_type = ValidationType::from_xlsx(&value)
                        .unwrap_or_else(|| {
                            warn!("unknown data validation type \"{}\"", value);
                            ValidationType::None
                        });
                }
                b"operator" => {
                    validation.operator = ValidationOperator::from_xlsx(&value)
                        .unwrap_or_else(|| {
                            warn!("unknown data validation operator \"{}\"", value);
                            ValidationOperator::Between
                        });
                }
                b"allowBlank" => validation.allow_blank = flag,
                // showDropDown="1" hides the in-cell dropdown
                b"showDropDown" => validation.show_dropdown = !flag,
                b"showInputMessage" => input_prompt.enabled = flag,
                b"showErrorMessage" => error_alert.enabled = flag,
                b"errorStyle" => {
                    validation.error_style = ErrorStyle::from_xlsx(&value).unwrap_or_else(|| {
                        warn!("unknown data validation error style \"{}\"", value);
                        ErrorStyle::Stop
                    });
                }
                b"errorTitle" => error_alert.title = Some(value.into_owned()),
                b"error" => error_alert.body = Some(value.into_owned()),
                b"promptTitle" => input_prompt.title = Some(value.into_owned()),
                b"prompt" => input_prompt.body = Some(value.into_owned()),
                b"sqref" => sqref = Some(Sqref::parse(&value)?),
                _ => {}
            }
        }

        validation.error_alert = error_alert;
        validation.input_prompt = input_prompt;

        match sqref {
            Some(sqref) => {
                validation.sqref = sqref;
                Ok(Some(validation))
            }
            None => {
                warn!("skipping dataValidation without sqref");
                Ok(None)
            }
        }
    }

    /// Apply formula values to a data validation based on its type
    fn apply_validation_formulas(
        validation: &mut DataValidation,
        formula1: Option<String>,
        formula2: Option<String>,
    ) {
        let numeric = validation.validation_type.is_comparison();
        validation.operand1 = formula1.map_or(Operand::Absent, |f| Self::operand(&f, numeric));
        validation.operand2 = formula2.map_or(Operand::Absent, |f| Self::operand(&f, numeric));
    }

    fn operand(text: &str, numeric: bool) -> Operand {
        if numeric {
            if let Ok(v) = text.parse::<f64>() {
                if v.is_finite() {
                    return Operand::Number(v);
                }
            }
        }
        Operand::Formula(escape_markup(text))
    }
}
