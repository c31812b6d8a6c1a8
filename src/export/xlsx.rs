// src/export/xlsx.rs

use crate::errors::AppResult;
use crate::export::model::{CellValue, Table};
use calamine::{DataType, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

/// Workbook on disk holding one sheet per `{date}_{kind}` table.
///
/// Every write is a full open-modify-save cycle: nothing is cached between
/// calls, so summary and detail writes for many input files can share one
/// output path.
#[derive(Debug, Clone)]
pub struct SheetStore {
    path: PathBuf,
}

impl SheetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace (case-insensitively) or create the sheet `sheet_name`.
    pub fn replace_sheet(&self, table: &Table, sheet_name: &str) -> AppResult<()> {
        write_sheet(table, &self.path, sheet_name)
    }

    pub fn sheets(&self) -> AppResult<Vec<(String, Table)>> {
        read_sheets(&self.path)
    }
}

/// Write `table` as `sheet_name` into the workbook at `path`.
///
/// - file missing → new workbook with exactly this sheet
/// - file present → a sheet whose name matches case-insensitively is removed
///   and the workbook saved *before* the new sheet is appended, so an
///   interrupted run never leaves two copies of the same sheet.
pub fn write_sheet(table: &Table, path: &Path, sheet_name: &str) -> AppResult<()> {
    if !path.exists() {
        return save_workbook(path, &[(sheet_name.to_string(), table.clone())]);
    }

    let mut sheets = read_sheets(path)?;

    let wanted = sheet_name.to_lowercase();
    if let Some(pos) = sheets.iter().position(|(name, _)| name.to_lowercase() == wanted) {
        sheets.remove(pos);
        // Un workbook deve avere almeno un foglio: se era l'unico, il file
        // resta intatto fino al salvataggio finale.
        if !sheets.is_empty() {
            save_workbook(path, &sheets)?;
        }
    }

    sheets.push((sheet_name.to_string(), table.clone()));
    save_workbook(path, &sheets)
}

/// Read every sheet back; the first row of each sheet becomes the header.
pub fn read_sheets(path: &Path) -> AppResult<Vec<(String, Table)>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let grid = match workbook.worksheet_range(&name) {
            Some(range) => grid_from_range(&range?),
            None => Vec::new(),
        };

        let mut rows = grid.into_iter();
        let headers = rows
            .next()
            .map(|h| h.iter().map(CellValue::display).collect())
            .unwrap_or_default();

        out.push((
            name,
            Table {
                headers,
                rows: rows.collect(),
            },
        ));
    }

    Ok(out)
}

fn grid_from_range(range: &calamine::Range<DataType>) -> Vec<Vec<CellValue>> {
    let (row0, col0) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<CellValue>> = vec![Vec::new(); row0 as usize];

    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col0 as usize];
        cells.extend(row.iter().map(|cell| match cell {
            DataType::String(s) => CellValue::Text(s.clone()),
            DataType::Float(v) => CellValue::Number(*v),
            DataType::Int(v) => CellValue::Number(*v as f64),
            DataType::Bool(b) => CellValue::Bool(*b),
            DataType::DateTime(v) => CellValue::Number(*v),
            DataType::DateTimeIso(s) => CellValue::Text(s.clone()),
            DataType::Duration(v) => CellValue::Number(*v),
            DataType::DurationIso(s) => CellValue::Text(s.clone()),
            DataType::Error(e) => CellValue::Text(format!("#{e:?}")),
            DataType::Empty => CellValue::Empty,
        }));
        grid.push(cells);
    }

    grid
}

fn save_workbook(path: &Path, sheets: &[(String, Table)]) -> AppResult<()> {
    let mut workbook = Workbook::new();

    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;
        write_table(worksheet, table)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> AppResult<()> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, header.as_str(), &header_format)?;
    }

    if !table.headers.is_empty() {
        worksheet.set_freeze_panes(1, 0)?;
    }

    // ---------------------------
    // Calcolo larghezze colonne
    // ---------------------------
    let mut col_widths: Vec<usize> = table
        .headers
        .iter()
        .map(|h| UnicodeWidthStr::width(h.as_str()))
        .collect();

    for (row_index, cells) in table.rows.iter().enumerate() {
        let row = (row_index + 1) as u32;

        for (col, cell) in cells.iter().enumerate() {
            let c = col as u16;
            match cell {
                CellValue::Empty => continue,
                CellValue::Number(n) => {
                    worksheet.write(row, c, *n)?;
                }
                CellValue::Text(s) => {
                    worksheet.write(row, c, s.as_str())?;
                }
                CellValue::Bool(b) => {
                    worksheet.write(row, c, *b)?;
                }
            }

            let width = UnicodeWidthStr::width(cell.display().as_str());
            if col >= col_widths.len() {
                col_widths.resize(col + 1, 0);
            }
            col_widths[col] = col_widths[col].max(width);
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet.set_column_width(c as u16, *w as f64 + 2.0)?;
    }

    Ok(())
}
