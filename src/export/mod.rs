pub mod csv;
pub mod excel;

use crate::cli::ExportFormat;
use crate::error::Result;
use bird_concern_common::PanelView;
use std::path::{Path, PathBuf};

/// Excel出力時のファイル名
pub const WORKBOOK_FILE_NAME: &str = "dashboard.xlsx";

/// 全パネルの集計表を出力し、書き出したファイルを返す
pub fn export_panels(
    views: &[PanelView],
    format: &ExportFormat,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Csv | ExportFormat::Both) {
        println!("- CSVを生成中...");
        for view in views {
            let path = output_dir.join(view.panel.file_name());
            csv::write_summary_csv(&view.table, &path)?;
            println!("✔ CSV出力: {}", path.display());
            written.push(path);
        }
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        println!("- Excelを生成中...");
        let path = output_dir.join(WORKBOOK_FILE_NAME);
        excel::generate_excel(views, &path)?;
        println!("✔ Excel出力: {}", path.display());
        written.push(path);
    }

    Ok(written)
}
