//! データセット読み込みモジュール
//!
//! CSV とスプレッドシート（xlsx/xls/ods）に対応。
//! 読み込みは起動時に一度だけ行い、失敗時は部分的な表を返さない。

use crate::error::{Error, Result};
use crate::schema::{required_columns, StateColumns};
use crate::types::{BirdTable, Cell};
use std::path::Path;
use tracing::info;

const CSV_EXTENSIONS: &[&str] = &["csv"];
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// データセットを読み込む
pub fn load_dataset(path: &Path, state_columns: &StateColumns) -> Result<BirdTable> {
    if !path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} が見つかりません", path.display()),
        )));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let (columns, rows) = if CSV_EXTENSIONS.contains(&ext.as_str()) {
        read_csv(path)?
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        read_workbook(path)?
    } else {
        return Err(Error::Dataset(format!(
            "未対応のファイル形式です: {}",
            path.display()
        )));
    };

    let table = BirdTable::new(columns, rows)?.with_state_columns(state_columns)?;
    validate_required_columns(&table)?;

    info!(
        rows = table.len(),
        columns = table.columns().len(),
        state_columns = table.state_columns().len(),
        "dataset loaded from {}",
        path.display()
    );

    Ok(table)
}

/// 必須列の存在チェック
pub fn validate_required_columns(table: &BirdTable) -> Result<()> {
    for column in required_columns() {
        table.column_index(column)?;
    }
    Ok(())
}

/// CSVを読み込む（1行目がヘッダー）
pub fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    let mut reader = csv::Reader::from_path(path)?;
    read_csv_from(&mut reader)
}

fn read_csv_from<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if columns.iter().all(|c| c.is_empty()) {
        return Err(Error::Dataset("ヘッダー行がありません".into()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::parse).collect());
    }

    Ok((columns, rows))
}

/// 先頭シートを読み込む
#[cfg(feature = "excel")]
pub fn read_workbook(path: &Path) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path).map_err(|e| Error::Excel(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::Dataset("シートがありません".into()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| Error::Excel(e.to_string()))?;

    let mut iter = range.rows();
    let header = iter
        .next()
        .ok_or_else(|| Error::Dataset("ヘッダー行がありません".into()))?;
    let columns = header.iter().map(|d| d.to_string().trim().to_string()).collect();
    let rows = iter.map(|r| r.iter().map(cell_from_data).collect()).collect();

    Ok((columns, rows))
}

#[cfg(not(feature = "excel"))]
pub fn read_workbook(path: &Path) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    Err(Error::Dataset(format!(
        "スプレッドシート読み込みが無効です（excel feature）: {}",
        path.display()
    )))
}

/// calamineのセルを変換（小数部0の浮動小数は整数扱い）
#[cfg(feature = "excel")]
fn cell_from_data(data: &calamine::Data) -> Cell {
    use calamine::Data;

    match data {
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => float_cell(*f),
        Data::String(s) => Cell::parse_text(s),
        Data::Bool(b) => Cell::Text(if *b { "True".into() } else { "False".into() }),
        Data::Empty | Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(feature = "excel")]
fn float_cell(f: f64) -> Cell {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Cell::Int(f as i64)
    } else {
        Cell::Float(f)
    }
}
