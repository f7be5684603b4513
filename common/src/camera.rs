//! カメラセッション管理
//!
//! 状態: Off → Requesting → Active → Off
//!
//! ストリームは `CameraSession` が排他的に所有し、停止・失敗・モード切替・破棄の
//! どの経路でも必ず解放される（`Drop` でも `stop` を呼ぶ）。

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, ScanError};
use crate::types::{CameraRequest, PixelBuffer};

/// カメラの状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPhase {
    #[default]
    Off,
    Requesting,
    Active,
}

/// 開いているカメラストリーム
pub trait CameraStream {
    /// 現在のフレームを取得（まだ届いていなければ `None`）
    fn grab_frame(&mut self) -> Option<PixelBuffer>;

    /// ハードウェア資源を解放（複数回呼ばれても安全であること）
    fn release(&mut self);
}

/// カメラを開く実装（ffmpeg、getUserMedia など）
#[async_trait(?Send)]
pub trait CameraBackend {
    type Stream: CameraStream;

    /// ストリームを要求。拒否・失敗時は `ScanError::PermissionDenied`
    async fn open(&self, request: &CameraRequest) -> Result<Self::Stream>;
}

/// カメラセッション
pub struct CameraSession<S: CameraStream> {
    phase: CameraPhase,
    stream: Option<S>,
}

impl<S: CameraStream> CameraSession<S> {
    pub fn new() -> Self {
        Self {
            phase: CameraPhase::Off,
            stream: None,
        }
    }

    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == CameraPhase::Active
    }

    /// 起動要求を開始（既存のストリームは先に解放）
    pub fn begin_request(&mut self) {
        self.stop();
        self.phase = CameraPhase::Requesting;
    }

    /// 許可されたストリームを接続
    ///
    /// 要求中に停止された場合は受け取ったストリームをすぐ解放し `false` を返す。
    pub fn attach(&mut self, mut stream: S) -> bool {
        if self.phase != CameraPhase::Requesting {
            debug!("要求は取り消し済み、ストリームを破棄");
            stream.release();
            return false;
        }
        self.stream = Some(stream);
        self.phase = CameraPhase::Active;
        info!("カメラ起動");
        true
    }

    /// 起動失敗
    pub fn fail(&mut self) {
        self.stop();
    }

    /// 現在のフレームを取得
    pub fn grab_frame(&mut self) -> Result<Option<PixelBuffer>> {
        match self.stream.as_mut() {
            Some(stream) if self.phase == CameraPhase::Active => Ok(stream.grab_frame()),
            _ => Err(ScanError::Processing("カメラが起動していません".into())),
        }
    }

    /// 停止（冪等）
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            info!("カメラ停止");
        }
        self.phase = CameraPhase::Off;
    }
}

impl<S: CameraStream> Default for CameraSession<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CameraStream> Drop for CameraSession<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
