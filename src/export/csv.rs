//! CSV出力

use crate::error::Result;
use bird_concern_common::SummaryTable;
use std::path::Path;
use tracing::debug;

/// 集計表をUTF-8のCSVとして保存
pub fn write_summary_csv(table: &SummaryTable, output_path: &Path) -> Result<()> {
    let bytes = table.to_csv_bytes()?;
    std::fs::write(output_path, &bytes)?;
    debug!(rows = table.len(), bytes = bytes.len(), "csv written to {}", output_path.display());
    Ok(())
}
