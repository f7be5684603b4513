//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use qr_scan::error::QrScanError;
use qr_scan::scanner;
use qr_scan_common::ScanError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, QrScanError::FolderNotFound(_)));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_folder(dir.path(), false);
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// QrScanErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        QrScanError::Config("テスト設定エラー".to_string()),
        QrScanError::FileNotFound("test.png".to_string()),
        QrScanError::FolderNotFound("/path/to/folder".to_string()),
        QrScanError::NoImagesFound("フォルダ".to_string()),
        QrScanError::Clipboard("wl-copy".to_string()),
        QrScanError::Prompt("中断".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// スキャンエラーは透過的に表示される
#[test]
fn test_scan_error_transparent() {
    let err: QrScanError = ScanError::NoCodeFound.into();
    assert!(matches!(err, QrScanError::Scan(ScanError::NoCodeFound)));
    assert_eq!(format!("{}", err), format!("{}", ScanError::NoCodeFound));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: QrScanError = io_err.into();

    assert!(matches!(err, QrScanError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: QrScanError = json_err.into();

    assert!(matches!(err, QrScanError::JsonParse(_)));
}
