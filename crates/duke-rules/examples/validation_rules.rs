//! Example: Build data validation rules and print the worksheet part

use duke_rules::prelude::*;

fn main() -> Result<()> {
    let mut workbook = Workbook::new();
    workbook.add_worksheet_with_name("Lookup")?;

    // Whole number between 1 and 100
    let mut quantity = DataValidation::new(false);
    quantity.set_sqref("B2:B100")?;
    quantity.set_operands(1, 100, ValidationType::Whole, ValidationOperator::Between)?;
    quantity.set_error(ErrorStyle::Stop, "Quantity", "Enter a whole number from 1 to 100");
    workbook.add_data_validation("Sheet1", quantity)?;

    // Inline dropdown
    let mut status = workbook.drop_list("C2:C100", &["Open", "In progress", "Done"])?;
    status.set_input("Status", "Pick a status from the list");
    workbook.add_data_validation("Sheet1", status)?;

    // Dropdown fed from another sheet
    let mut owner = DataValidation::new(true);
    owner.set_sqref("D2:D100")?;
    owner.set_sheet_drop_list("Lookup", "A1:A20")?;
    workbook.add_data_validation("Sheet1", owner)?;

    // Header row needs no rules
    workbook.delete_data_validation("Sheet1", Some("A1:D1"))?;

    let sheet = workbook.worksheet("Sheet1")?;
    println!("{}", XlsxWriter::write_worksheet(&sheet.read()));
    Ok(())
}
