//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangle of cells (e.g., "A1:B10")
//! - Conversion between cell names and 1-based coordinates

mod address;

pub use address::{
    cell_name_to_coordinates, coordinates_to_cell_name, CellAddress, CellRange, CellRangeIterator,
};
