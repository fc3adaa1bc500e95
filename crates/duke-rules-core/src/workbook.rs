//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::formula::ListLimits;
use crate::registry::{SheetHandle, SheetRegistry};
use crate::rules::{RuleStore, SheetCatalog};
use crate::validation::DataValidation;
use crate::MAX_SHEET_NAME_LEN;

/// Characters a sheet name cannot contain
const INVALID_SHEET_NAME_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

/// A workbook (spreadsheet document)
///
/// The workbook owns the sheet list and the registry of worksheet
/// fragments. Rule operations take `&self`, so a workbook can be shared
/// between threads that add and delete validations concurrently.
#[derive(Debug)]
pub struct Workbook {
    /// Sheets in tab order
    sheets: Vec<SheetEntry>,
    /// Next sheet id to hand out
    next_sheet_id: u32,
    /// Workbook settings
    settings: WorkbookSettings,
    /// Worksheet fragments, created on first reference
    registry: SheetRegistry,
}

#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    sheet_id: u32,
}

impl SheetEntry {
    fn key(&self) -> String {
        format!("xl/worksheets/sheet{}.xml", self.sheet_id)
    }
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        Self::with_settings(WorkbookSettings::default())
    }

    /// Create a new workbook with custom settings
    pub fn with_settings(settings: WorkbookSettings) -> Self {
        let mut wb = Self::empty();
        wb.settings = settings;
        wb.push_sheet("Sheet1");
        wb
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            sheets: Vec::new(),
            next_sheet_id: 1,
            settings: WorkbookSettings::default(),
            registry: SheetRegistry::new(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Sheet names in tab order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Get the index of a worksheet by name (case-insensitive)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        let name_lower = name.to_lowercase();
        self.sheets
            .iter()
            .position(|s| s.name.to_lowercase() == name_lower)
    }

    /// Add a new worksheet with a generated name
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = self.generate_sheet_name();
        self.add_worksheet_with_name(&name)
    }

    /// Add a new worksheet with specified name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        validate_sheet_name(name)?;
        self.check_duplicate(name, None)?;
        Ok(self.push_sheet(name))
    }

    fn push_sheet(&mut self, name: &str) -> usize {
        let index = self.sheets.len();
        self.sheets.push(SheetEntry {
            name: name.to_string(),
            sheet_id: self.next_sheet_id,
        });
        self.next_sheet_id += 1;
        index
    }

    /// Remove a worksheet and its fragment
    pub fn remove_worksheet(&mut self, name: &str) -> Result<()> {
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        let entry = self.sheets.remove(index);
        self.registry.remove(&entry.key());
        Ok(())
    }

    /// Rename a worksheet; its fragment key does not change
    pub fn rename_worksheet(&mut self, name: &str, new_name: &str) -> Result<()> {
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        validate_sheet_name(new_name)?;
        self.check_duplicate(new_name, Some(index))?;

        let entry = &mut self.sheets[index];
        entry.name = new_name.to_string();
        if let Some(handle) = self.registry.get(&entry.key()) {
            handle.write().set_name(new_name);
        }
        Ok(())
    }

    /// Get workbook settings
    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    /// Get mutable workbook settings
    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    /// The fragment registry
    pub fn registry(&self) -> &SheetRegistry {
        &self.registry
    }

    /// Rule operations on this workbook's sheets
    pub fn rules(&self) -> RuleStore<'_, Self> {
        RuleStore::new(self, &self.registry)
    }

    /// Get the fragment for a sheet, creating it on first use
    pub fn worksheet(&self, name: &str) -> Result<SheetHandle> {
        self.rules().sheet(name)
    }

    // ==================== Data Validations ====================

    /// Add a data validation rule to a sheet
    ///
    /// # Example
    /// ```
    /// use duke_rules_core::{DataValidation, Workbook};
    ///
    /// let wb = Workbook::new();
    /// let mut dv = DataValidation::new(true);
    /// dv.set_sqref("A1:A10").unwrap();
    /// dv.set_drop_list(&["Yes", "No"]).unwrap();
    /// wb.add_data_validation("Sheet1", dv).unwrap();
    /// ```
    pub fn add_data_validation(&self, sheet: &str, validation: DataValidation) -> Result<()> {
        self.rules().add(sheet, validation)
    }

    /// Get the data validation rules of a sheet in insertion order
    pub fn data_validations(&self, sheet: &str) -> Result<Vec<DataValidation>> {
        self.rules().list(sheet)
    }

    /// Delete data validations on a sheet
    ///
    /// With a range, the cells of that range are removed from every rule;
    /// without one, every rule on the sheet is deleted.
    pub fn delete_data_validation(&self, sheet: &str, range: Option<&str>) -> Result<()> {
        match range {
            Some(range) => self.rules().delete_range(sheet, range),
            None => self.rules().delete_all(sheet),
        }
    }

    /// First data validation covering a cell
    pub fn data_validation_at(&self, sheet: &str, cell: &str) -> Result<Option<DataValidation>> {
        self.rules().find(sheet, cell)
    }

    /// Build a list validation using this workbook's list limits
    pub fn drop_list<S: AsRef<str>>(&self, sqref: &str, items: &[S]) -> Result<DataValidation> {
        let mut dv = DataValidation::new(true);
        dv.set_sqref(sqref)?;
        dv.set_drop_list_with(items, &self.settings.list_limits)?;
        Ok(dv)
    }

    /// Check for duplicate names (case-insensitive), optionally excluding a sheet
    fn check_duplicate(&self, name: &str, exclude_index: Option<usize>) -> Result<()> {
        match self.sheet_index(name) {
            Some(i) if Some(i) != exclude_index => Err(Error::DuplicateSheetName(name.into())),
            _ => Ok(()),
        }
    }

    /// Generate a unique sheet name
    fn generate_sheet_name(&self) -> String {
        let mut n = self.sheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.sheet_index(&name).is_none() {
                return name;
            }
            n += 1;
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetCatalog for Workbook {
    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        validate_sheet_name(name)
    }

    fn sheet_key(&self, name: &str) -> Result<String> {
        self.sheet_index(name)
            .map(|i| self.sheets[i].key())
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    fn new_fragment(&self, name: &str, key: &str) -> crate::worksheet::Worksheet {
        let name = self
            .sheet_index(name)
            .map_or(name, |i| self.sheets[i].name.as_str());
        crate::worksheet::Worksheet::new(name, key)
    }
}

/// Validate a sheet name against the characters and length spreadsheets allow
pub fn validate_sheet_name(name: &str) -> Result<()> {
    // Check length
    if name.is_empty() {
        return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "Sheet name too long (max {} characters)",
            MAX_SHEET_NAME_LEN
        )));
    }

    // Check for invalid characters
    for c in INVALID_SHEET_NAME_CHARS {
        if name.contains(*c) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }
    }

    Ok(())
}

/// Workbook-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkbookSettings {
    /// Limits applied to inline list validations
    pub list_limits: ListLimits,
}
