//! Excel生成
//!
//! パネルごとに1シートのブックを作る。

use crate::error::{BirdConcernError, Result};
use bird_concern_common::{PanelView, SummaryTable};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

fn excel_err(e: XlsxError) -> BirdConcernError {
    BirdConcernError::ExcelGeneration(e.to_string())
}

pub fn generate_excel(views: &[PanelView], output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for view in views {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(view.panel.sheet_name())
            .map_err(excel_err)?;
        write_table(worksheet, &view.table, &header_format).map_err(excel_err)?;
    }

    workbook.save(output_path).map_err(excel_err)?;
    Ok(())
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &SummaryTable,
    header_format: &Format,
) -> std::result::Result<(), XlsxError> {
    for (col, header) in table.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, header_format)?;
    }

    for (i, row) in table.rows().iter().enumerate() {
        let r = (i + 1) as u32;
        let mut col: u16 = 0;
        for label in &row.labels {
            worksheet.write_string(r, col, label)?;
            col += 1;
        }
        for count in &row.counts {
            worksheet.write_number(r, col, *count as f64)?;
            col += 1;
        }
    }

    worksheet.autofit();
    Ok(())
}
