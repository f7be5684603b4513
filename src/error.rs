use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("クリップボードにコピーできません: {0}")]
    Clipboard(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Scan(#[from] qr_scan_common::ScanError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for QrScanError {
    fn from(e: dialoguer::Error) -> Self {
        QrScanError::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QrScanError>;
