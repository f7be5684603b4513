//! 画像ファイルの読み込み
//!
//! 拡張子から宣言MIMEタイプを決め、画像でなければデコード前に拒否する。
//! 読み込みは spawn_blocking で行い、プレビュー情報とピクセルを返す。

use image::ImageFormat;
use qr_scan_common::{validate_image_type, PixelBuffer, Preview, ScanError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 読み込んだ画像
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub preview: Preview,
    pub pixels: PixelBuffer,
}

/// 拡張子から宣言MIMEタイプを推定
pub fn declared_mime(path: &Path) -> String {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "log" | "md" | "csv" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// 画像ファイルか（拡張子で判定）
pub fn is_image_path(path: &Path) -> bool {
    validate_image_type(&declared_mime(path)).is_ok()
}

/// ファイルを検証して読み込む
pub async fn load_image(path: &Path) -> qr_scan_common::Result<LoadedImage> {
    validate_image_type(&declared_mime(path))?;

    let owned: PathBuf = path.to_path_buf();
    let (width, height, luma) = tokio::task::spawn_blocking(move || {
        image::open(&owned).map(|img| {
            let luma = img.to_luma8();
            (luma.width(), luma.height(), luma.into_raw())
        })
    })
    .await
    .map_err(|e| ScanError::Processing(format!("読み込みタスク異常終了: {}", e)))?
    .map_err(|e| ScanError::Processing(format!("{}: {}", path.display(), e)))?;

    debug!("画像読み込み: {} ({}x{})", path.display(), width, height);

    Ok(LoadedImage {
        preview: Preview::new(path.display().to_string()).with_dimensions(width, height),
        pixels: PixelBuffer::luma(width, height, luma)?,
    })
}
