//! Per-sheet rule store
//!
//! [`RuleStore`] adds, lists and deletes validation rules on the fragments
//! held by a [`SheetRegistry`]. Sheet identity is resolved through a
//! [`SheetCatalog`] before any fragment is touched.

use log::debug;

use crate::cell::CellAddress;
use crate::error::{Error, Result};
use crate::registry::{SheetHandle, SheetRegistry};
use crate::sqref::Sqref;
use crate::validation::DataValidation;
use crate::worksheet::Worksheet;

/// Sheet naming policy and sheet lookup
pub trait SheetCatalog {
    /// Check a sheet name against the naming rules
    fn validate_sheet_name(&self, name: &str) -> Result<()>;

    /// Canonical fragment key for an existing sheet
    ///
    /// Fails with [`Error::SheetNotFound`] when no such sheet exists.
    fn sheet_key(&self, name: &str) -> Result<String>;

    /// Build the fragment for a sheet the first time it is referenced
    fn new_fragment(&self, name: &str, key: &str) -> Worksheet {
        Worksheet::new(name, key)
    }
}

/// Rule operations over the fragments of one document
pub struct RuleStore<'a, C: SheetCatalog + ?Sized> {
    catalog: &'a C,
    registry: &'a SheetRegistry,
}

impl<'a, C: SheetCatalog + ?Sized> RuleStore<'a, C> {
    /// Create a store over a catalog and the registry holding its fragments
    pub fn new(catalog: &'a C, registry: &'a SheetRegistry) -> Self {
        Self { catalog, registry }
    }

    /// Resolve a sheet name to its fragment
    pub fn sheet(&self, name: &str) -> Result<SheetHandle> {
        self.catalog.validate_sheet_name(name)?;
        let key = self.catalog.sheet_key(name)?;
        Ok(self
            .registry
            .get_or_create(&key, || self.catalog.new_fragment(name, &key)))
    }

    /// Append a rule to a sheet
    ///
    /// Overlapping rules are kept as they are.
    pub fn add(&self, sheet: &str, rule: DataValidation) -> Result<()> {
        let handle = self.sheet(sheet)?;
        if rule.sqref.is_empty() {
            return Err(Error::MissingRange);
        }
        debug!("adding data validation on {}!{}", sheet, rule.sqref);
        handle.write().add_data_validation(rule);
        Ok(())
    }

    /// Snapshot of a sheet's rules in insertion order
    pub fn list(&self, sheet: &str) -> Result<Vec<DataValidation>> {
        let handle = self.sheet(sheet)?;
        let ws = handle.read();
        Ok(ws.data_validation_list().to_vec())
    }

    /// First rule covering a cell
    pub fn find(&self, sheet: &str, cell: &str) -> Result<Option<DataValidation>> {
        let handle = self.sheet(sheet)?;
        let addr = CellAddress::parse(cell).map_err(|e| Error::invalid_range(cell, e))?;
        let ws = handle.read();
        Ok(ws.data_validation_at(&addr).cloned())
    }

    /// Remove the cells of `range` from every rule on a sheet
    ///
    /// Rules left without cells are dropped; rules that do not intersect
    /// `range` are untouched. When no rule remains the section is removed.
    pub fn delete_range(&self, sheet: &str, range: &str) -> Result<()> {
        let handle = self.sheet(sheet)?;
        let target = Sqref::parse(range)?;

        let mut ws = handle.write();
        let before = ws.data_validation_list().len();
        let kept: Vec<DataValidation> = ws
            .take_data_validations()
            .into_iter()
            .filter_map(|mut rule| {
                if !rule.sqref.intersects(&target) {
                    return Some(rule);
                }
                rule.sqref = rule.sqref.subtract(&target);
                (!rule.sqref.is_empty()).then_some(rule)
            })
            .collect();

        debug!(
            "deleted {}!{}: {} of {} data validations remain",
            sheet,
            target,
            kept.len(),
            before
        );
        ws.set_data_validations(kept);
        Ok(())
    }

    /// Remove every rule from a sheet
    pub fn delete_all(&self, sheet: &str) -> Result<()> {
        let handle = self.sheet(sheet)?;
        debug!("deleting all data validations on {}", sheet);
        handle.write().clear_data_validations();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ValidationOperator, ValidationType};
    use pretty_assertions::assert_eq;

    /// One sheet named "Sheet1"
    struct SingleSheet;

    impl SheetCatalog for SingleSheet {
        fn validate_sheet_name(&self, name: &str) -> Result<()> {
            if name.contains(':') {
                return Err(Error::InvalidSheetName(name.to_string()));
            }
            Ok(())
        }

        fn sheet_key(&self, name: &str) -> Result<String> {
            if name == "Sheet1" {
                Ok("xl/worksheets/sheet1.xml".to_string())
            } else {
                Err(Error::SheetNotFound(name.to_string()))
            }
        }
    }

    fn rule(sqref: &str) -> DataValidation {
        let mut dv = DataValidation::new(true);
        dv.set_sqref(sqref).unwrap();
        dv.set_operands(10, 20, ValidationType::Whole, ValidationOperator::Between)
            .unwrap();
        dv
    }

    fn ranges(store: &RuleStore<'_, SingleSheet>) -> Vec<String> {
        store
            .list("Sheet1")
            .unwrap()
            .iter()
            .map(|dv| dv.sqref.to_string())
            .collect()
    }

    #[test]
    fn test_add_and_list() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        assert!(store.list("Sheet1").unwrap().is_empty());

        store.add("Sheet1", rule("A1:B2")).unwrap();
        store.add("Sheet1", rule("A1:B2")).unwrap();

        let rules = store.list("Sheet1").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], rule("A1:B2"));
    }

    #[test]
    fn test_sheet_errors() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);

        assert_eq!(
            store.add("SheetN", rule("A1")),
            Err(Error::SheetNotFound("SheetN".into()))
        );
        assert!(matches!(
            store.list("Sheet:1"),
            Err(Error::InvalidSheetName(_))
        ));
        assert!(store.delete_all("SheetN").is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_without_range() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        assert_eq!(
            store.add("Sheet1", DataValidation::new(true)),
            Err(Error::MissingRange)
        );
    }

    #[test]
    fn test_delete_range_shrinks_and_removes() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        store.add("Sheet1", rule("A1:B2")).unwrap();
        store.add("Sheet1", rule("C2:C5")).unwrap();
        store.add("Sheet1", rule("D2:D2 D3 D4")).unwrap();
        store.add("Sheet1", rule("F1")).unwrap();

        store.delete_range("Sheet1", "B1:B2").unwrap();
        store.delete_range("Sheet1", "C4").unwrap();
        store.delete_range("Sheet1", "D3").unwrap();
        store.delete_range("Sheet1", "F1").unwrap();

        assert_eq!(ranges(&store), vec!["A1:A2", "C2:C3 C5", "D2:D2 D4"]);
    }

    #[test]
    fn test_delete_range_outside_rules() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        store.add("Sheet1", rule("A1:B2")).unwrap();
        store.delete_range("Sheet1", "Z100").unwrap();
        assert_eq!(ranges(&store), vec!["A1:B2"]);
    }

    #[test]
    fn test_delete_range_keeps_untouched_rules_without_cells() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        store.add("Sheet1", rule("A1")).unwrap();
        // Written straight into the fragment, bypassing `add`
        store
            .sheet("Sheet1")
            .unwrap()
            .write()
            .add_data_validation(DataValidation::new(false));

        store.delete_range("Sheet1", "Z99").unwrap();

        let rules = store.list("Sheet1").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1], DataValidation::new(false));
    }

    #[test]
    fn test_deleting_last_rule_removes_section() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        store.add("Sheet1", rule("A1")).unwrap();
        store.delete_range("Sheet1", "A1").unwrap();

        let handle = store.sheet("Sheet1").unwrap();
        assert!(handle.read().data_validations().is_none());
        assert!(store.list("Sheet1").unwrap().is_empty());
    }

    #[test]
    fn test_delete_range_rejects_bad_target() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        store.add("Sheet1", rule("A1")).unwrap();

        let err = store.delete_range("Sheet1", "A1:A").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert cell \"A\" to coordinates: invalid cell name \"A\""
        );
        assert_eq!(ranges(&store), vec!["A1"]);
    }

    #[test]
    fn test_delete_all() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        store.add("Sheet1", rule("A1")).unwrap();
        store.add("Sheet1", rule("B1")).unwrap();
        store.delete_all("Sheet1").unwrap();

        assert!(store.sheet("Sheet1").unwrap().read().data_validations().is_none());
    }

    #[test]
    fn test_find() {
        let registry = SheetRegistry::new();
        let store = RuleStore::new(&SingleSheet, &registry);
        store.add("Sheet1", rule("B2:C3")).unwrap();

        assert!(store.find("Sheet1", "C3").unwrap().is_some());
        assert!(store.find("Sheet1", "A1").unwrap().is_none());
        assert!(store.find("Sheet1", "3C").is_err());
    }
}
