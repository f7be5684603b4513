//! エラー型定義
//!
//! スキャン中のエラーはすべてその場で回復し、閉じられるメッセージとして表示する。
//! ペイロードの解釈失敗はエラーとして扱わない（生テキスト表示に切り替えるだけ）。

use thiserror::Error;

/// スキャンエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("カメラにアクセスできません: {0}")]
    PermissionDenied(String),

    #[error("QRコードが見つかりません。もう一度お試しください")]
    NoCodeFound,

    #[error("画像ファイルを選択してください（指定された形式: {0}）")]
    InvalidFileType(String),

    #[error("画像処理エラー: {0}")]
    Processing(String),
}

impl ScanError {
    /// 分類名（ログ・JSON出力用）
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::PermissionDenied(_) => "permission-denied",
            ScanError::NoCodeFound => "no-code-found",
            ScanError::InvalidFileType(_) => "invalid-file-type",
            ScanError::Processing(_) => "processing-failure",
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_permission() {
        let error = ScanError::PermissionDenied("NotAllowedError".to_string());
        let display = format!("{}", error);
        assert!(display.contains("カメラ"));
        assert!(display.contains("NotAllowedError"));
    }

    #[test]
    fn test_error_display_invalid_file_type() {
        let error = ScanError::InvalidFileType("text/plain".to_string());
        assert_eq!(
            format!("{}", error),
            "画像ファイルを選択してください（指定された形式: text/plain）"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ScanError::NoCodeFound.kind(), "no-code-found");
        assert_eq!(ScanError::Processing("x".into()).kind(), "processing-failure");
    }

    #[test]
    fn test_error_debug() {
        let error = ScanError::Processing("テスト".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("Processing"));
        assert!(debug.contains("テスト"));
    }
}
