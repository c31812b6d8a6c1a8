// src/export/mod.rs

mod model;
mod xlsx;

pub use model::{CellValue, Table, batch_to_table};
pub use xlsx::{SheetStore, read_sheets, write_sheet};
