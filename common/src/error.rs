//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Model format error: {0}")]
    ModelFormat(String),

    #[error("Unknown class index: {0}")]
    UnknownClass(usize),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
