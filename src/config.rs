use crate::error::{QrScanError, Result};
use qr_scan_common::{CameraRequest, Facing};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// カメラデバイス（v4l2）
    pub camera_device: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub facing: Facing,
    /// zbarimg を優先デコーダとして使うか
    pub native_decoder: bool,
    pub zbarimg_path: String,
    pub ffmpeg_path: String,
    /// クリップボードコマンド（未指定なら自動検出）
    pub clipboard_command: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_device: "/dev/video0".into(),
            frame_width: 1280,
            frame_height: 720,
            facing: Facing::Environment,
            native_decoder: true,
            zbarimg_path: "zbarimg".into(),
            ffmpeg_path: "ffmpeg".into(),
            clipboard_command: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| QrScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("qr-scan").join("config.json"))
    }

    // 環境変数を優先
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("QR_SCAN_CAMERA") {
            if !device.trim().is_empty() {
                self.camera_device = device;
            }
        }
        if let Ok(value) = std::env::var("QR_SCAN_NATIVE") {
            self.native_decoder = parse_bool(&value).ok_or_else(|| {
                QrScanError::Config(format!("QR_SCAN_NATIVE の値が不正です: {}", value))
            })?;
        }
        Ok(())
    }

    pub fn camera_request(&self) -> CameraRequest {
        CameraRequest {
            facing: self.facing,
            width: self.frame_width,
            height: self.frame_height,
        }
    }

    pub fn set_camera_device(&mut self, device: String) -> Result<()> {
        self.camera_device = device;
        self.save()
    }

    pub fn set_native_decoder(&mut self, enabled: bool) -> Result<()> {
        self.native_decoder = enabled;
        self.save()
    }
}

/// "true"/"1"/"on" などを真偽値に
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
