//! Worksheet fragment
//!
//! A [`Worksheet`] is the in-memory form of one `xl/worksheets/sheetN.xml`
//! part, reduced to what the validation layer reads and writes.

use crate::cell::CellAddress;
use crate::validation::DataValidation;

/// The `<dataValidations>` section of a worksheet
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataValidations {
    items: Vec<DataValidation>,
}

impl DataValidations {
    /// Number of rules, as written to the `count` attribute
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Rules in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DataValidation> {
        self.items.iter()
    }

    /// Rules as a slice
    pub fn as_slice(&self) -> &[DataValidation] {
        &self.items
    }
}

impl From<Vec<DataValidation>> for DataValidations {
    fn from(items: Vec<DataValidation>) -> Self {
        Self { items }
    }
}

/// A worksheet fragment
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Part path inside the package
    path: String,
    /// Data validations; `None` when the sheet has none so the section is omitted
    data_validations: Option<DataValidations>,
}

impl Worksheet {
    /// Create an empty fragment
    pub fn new<S: Into<String>, P: Into<String>>(name: S, path: P) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            data_validations: None,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Get the part path (`xl/worksheets/sheet1.xml`)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The validation section, absent when there are no rules
    pub fn data_validations(&self) -> Option<&DataValidations> {
        self.data_validations.as_ref()
    }

    /// Rules in insertion order, empty when the section is absent
    pub fn data_validation_list(&self) -> &[DataValidation] {
        match &self.data_validations {
            Some(section) => section.as_slice(),
            None => &[],
        }
    }

    /// Append a rule
    pub fn add_data_validation(&mut self, validation: DataValidation) {
        self.data_validations
            .get_or_insert_with(DataValidations::default)
            .items
            .push(validation);
    }

    /// Replace every rule; an empty list clears the section
    pub fn set_data_validations(&mut self, items: Vec<DataValidation>) {
        self.data_validations = if items.is_empty() {
            None
        } else {
            Some(DataValidations { items })
        };
    }

    /// Take every rule out, leaving the section absent
    pub fn take_data_validations(&mut self) -> Vec<DataValidation> {
        self.data_validations
            .take()
            .map(|dv| dv.items)
            .unwrap_or_default()
    }

    /// Remove the section entirely
    pub fn clear_data_validations(&mut self) {
        self.data_validations = None;
    }

    /// First rule covering a cell
    pub fn data_validation_at(&self, addr: &CellAddress) -> Option<&DataValidation> {
        self.data_validation_list()
            .iter()
            .find(|dv| dv.sqref.contains_cell(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(sqref: &str) -> DataValidation {
        let mut dv = DataValidation::new(true);
        dv.set_sqref(sqref).unwrap();
        dv
    }

    #[test]
    fn test_new_fragment_has_no_section() {
        let ws = Worksheet::new("Sheet1", "xl/worksheets/sheet1.xml");
        assert_eq!(ws.name(), "Sheet1");
        assert_eq!(ws.path(), "xl/worksheets/sheet1.xml");
        assert!(ws.data_validations().is_none());
        assert!(ws.data_validation_list().is_empty());
    }

    #[test]
    fn test_add_and_clear() {
        let mut ws = Worksheet::new("Sheet1", "xl/worksheets/sheet1.xml");
        ws.add_data_validation(rule("A1"));
        ws.add_data_validation(rule("B1"));
        assert_eq!(ws.data_validations().map(DataValidations::count), Some(2));

        ws.clear_data_validations();
        assert!(ws.data_validations().is_none());
    }

    #[test]
    fn test_empty_replacement_removes_section() {
        let mut ws = Worksheet::new("Sheet1", "xl/worksheets/sheet1.xml");
        ws.add_data_validation(rule("A1"));
        let taken = ws.take_data_validations();
        assert_eq!(taken.len(), 1);
        assert!(ws.data_validations().is_none());

        ws.set_data_validations(Vec::new());
        assert!(ws.data_validations().is_none());
    }

    #[test]
    fn test_data_validation_at() {
        let mut ws = Worksheet::new("Sheet1", "xl/worksheets/sheet1.xml");
        ws.add_data_validation(rule("A1:A5"));
        ws.add_data_validation(rule("A3 B1"));

        let a3 = CellAddress::parse("A3").unwrap();
        assert_eq!(ws.data_validation_at(&a3).unwrap().sqref.to_string(), "A1:A5");
        let b1 = CellAddress::parse("B1").unwrap();
        assert_eq!(ws.data_validation_at(&b1).unwrap().sqref.to_string(), "A3 B1");
        assert!(ws.data_validation_at(&CellAddress::new(9, 9)).is_none());
    }
}
