//! qr-scan: QRコードスキャナ CLI
//!
//! 共通の状態遷移・デコーダは `qr_scan_common`、このクレートは
//! ffmpeg カメラ・zbarimg・画像ファイル・クリップボードなどネイティブ側の実装を持つ。

pub mod camera;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod decoder;
pub mod error;
pub mod interactive;
pub mod report;
pub mod scanner;
pub mod upload;
