//! Worksheet XML writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::trace;

use crate::error::XlsxResult;
use crate::SPREADSHEETML_NS;
use duke_rules_core::{DataValidation, ValidationType, Workbook, Worksheet};

/// Writes worksheet parts
pub struct XlsxWriter;

impl XlsxWriter {
    /// Serialize a worksheet fragment to a file
    pub fn write_file<P: AsRef<Path>>(sheet: &Worksheet, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(sheet, file)
    }

    /// Serialize a worksheet fragment to a writer
    pub fn write<W: Write>(sheet: &Worksheet, mut writer: W) -> XlsxResult<()> {
        writer.write_all(Self::write_worksheet(sheet).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize every fragment of a workbook as `(part path, xml)` pairs
    ///
    /// Sheets are visited in tab order; a sheet no rule was ever added to
    /// still gets a part with an empty `<sheetData/>`.
    pub fn worksheet_parts(workbook: &Workbook) -> XlsxResult<Vec<(String, String)>> {
        let mut parts = Vec::with_capacity(workbook.sheet_count());
        for name in workbook.sheet_names() {
            let handle = workbook.worksheet(name)?;
            let sheet = handle.read();
            parts.push((sheet.path().to_string(), Self::write_worksheet(&sheet)));
        }
        Ok(parts)
    }

    /// Serialize a worksheet fragment to a complete part
    pub fn write_worksheet(sheet: &Worksheet) -> String {
        trace!("writing worksheet part {}", sheet.path());

        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{}">
    <sheetData/>"#,
            SPREADSHEETML_NS
        );
        Self::write_data_validations(&mut content, sheet);
        content.push_str("\n</worksheet>");
        content
    }

    /// Serialize only the `<dataValidations>` section; empty when the sheet has none
    pub fn data_validations_xml(sheet: &Worksheet) -> String {
        let mut content = String::new();
        Self::write_data_validations(&mut content, sheet);
        content
    }

    fn write_data_validations(content: &mut String, sheet: &Worksheet) {
        // A rule without cells has no sqref to write
        let validations: Vec<&DataValidation> = sheet
            .data_validation_list()
            .iter()
            .filter(|validation| !validation.sqref.is_empty())
            .collect();
        if validations.is_empty() {
            return;
        }

        content.push_str(&format!(
            "\n    <dataValidations count=\"{}\">",
            validations.len()
        ));
        for validation in validations {
            Self::write_data_validation(content, validation);
        }
        content.push_str("\n    </dataValidations>");
    }

    fn write_data_validation(content: &mut String, validation: &DataValidation) {
        let type_attr = match validation.validation_type {
            ValidationType::None => String::new(),
            _ => format!(" type=\"{}\"", validation.validation_type.xlsx_type()),
        };

        let operator_attr = if validation.validation_type.is_comparison() {
            format!(" operator=\"{}\"", validation.operator.xlsx_operator())
        } else {
            String::new()
        };

        let allow_blank = if validation.allow_blank {
            " allowBlank=\"1\""
        } else {
            ""
        };
        // showDropDown="1" hides the in-cell dropdown
        let show_dropdown = if !validation.show_dropdown {
            " showDropDown=\"1\""
        } else {
            ""
        };
        let show_input = if validation.input_prompt.enabled {
            " showInputMessage=\"1\""
        } else {
            ""
        };
        let show_error = if validation.error_alert.enabled {
            " showErrorMessage=\"1\""
        } else {
            ""
        };

        let error_style = match validation.error_style {
            duke_rules_core::ErrorStyle::Stop => String::new(),
            style => format!(" errorStyle=\"{}\"", style.xlsx_style()),
        };

        let error_title = Self::text_attr("errorTitle", &validation.error_alert.title);
        let error_msg = Self::text_attr("error", &validation.error_alert.body);
        let prompt_title = Self::text_attr("promptTitle", &validation.input_prompt.title);
        let prompt_msg = Self::text_attr("prompt", &validation.input_prompt.body);

        content.push_str(&format!(
            "\n        <dataValidation{}{}{}{}{}{}{}{}{}{}{} sqref=\"{}\">",
            type_attr,
            operator_attr,
            allow_blank,
            show_dropdown,
            show_input,
            show_error,
            error_style,
            error_title,
            error_msg,
            prompt_title,
            prompt_msg,
            validation.sqref
        ));

        // Formula text is stored escaped and goes in as is
        if let Some(formula1) = validation.formula1() {
            content.push_str(&format!(
                "\n            <formula1>{}</formula1>",
                formula1
            ));
        }
        if let Some(formula2) = validation.formula2() {
            content.push_str(&format!(
                "\n            <formula2>{}</formula2>",
                formula2
            ));
        }

        content.push_str("\n        </dataValidation>");
    }

    fn text_attr(name: &str, value: &Option<String>) -> String {
        value.as_ref().map_or(String::new(), |v| {
            format!(" {}=\"{}\"", name, Self::escape_xml(v))
        })
    }

    fn escape_xml(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }
}
