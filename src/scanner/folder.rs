//! フォルダ内の画像を一括スキャン

use super::Scanner;
use crate::error::{QrScanError, Result};
use crate::upload::is_image_path;
use indicatif::{ProgressBar, ProgressStyle};
use qr_scan_common::{CameraBackend, DecodedResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// 1ファイル分のスキャン結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderEntry {
    pub file_name: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DecodedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(QrScanError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image_path(e.path()))
        .map(|e| ImageInfo {
            file_name: e.file_name().to_string_lossy().to_string(),
            path: e.into_path(),
        })
        .collect();

    // パスでソート
    images.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(images)
}

/// 画像を1枚ずつアップロードモードでスキャン
pub async fn scan_images<B: CameraBackend>(
    scanner: &mut Scanner<B>,
    images: &[ImageInfo],
    show_progress: bool,
) -> Vec<FolderEntry> {
    let progress = if show_progress {
        let pb = ProgressBar::new(images.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut entries = Vec::with_capacity(images.len());
    for img in images {
        progress.set_message(img.file_name.clone());
        scanner.upload(&img.path).await;

        let state = scanner.state();
        entries.push(FolderEntry {
            file_name: img.file_name.clone(),
            file_path: img.path.display().to_string(),
            result: state.result().cloned(),
            error: state.error().map(|e| e.to_string()),
        });
        progress.inc(1);
    }
    progress.finish_and_clear();
    scanner.reset();

    entries
}
