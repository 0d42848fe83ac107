use thiserror::Error;

#[derive(Error, Debug)]
pub enum BirdConcernError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("対話入力エラー: {0}")]
    Dialog(#[from] dialoguer::Error),

    #[error(transparent)]
    Common(#[from] bird_concern_common::Error),
}

pub type Result<T> = std::result::Result<T, BirdConcernError>;
