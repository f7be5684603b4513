//! スキャナ本体
//!
//! 状態遷移（`ScannerState`）にカメラセッション・デコーダ・画像読み込みの副作用を結び付ける。
//! カメラはこの構造体だけが所有し、モード切替・閉じる・成功・破棄のどの経路でも解放される。

mod folder;

pub use folder::{scan_folder, scan_images, FolderEntry, ImageInfo};

use crate::clipboard::Clipboard;
use crate::error::{QrScanError, Result};
use crate::upload;
use qr_scan_common::{
    validate_image_type, CameraBackend, CameraPhase, CameraRequest, CameraSession,
    DecodedResult, Decoder, ModeChange, ScanMode, ScannerState,
};
use std::path::Path;
use tracing::{info, warn};

pub struct Scanner<B: CameraBackend> {
    state: ScannerState,
    camera: CameraSession<B::Stream>,
    backend: B,
    decoder: Decoder,
    request: CameraRequest,
}

impl<B: CameraBackend> Scanner<B> {
    pub fn new(backend: B, decoder: Decoder, request: CameraRequest) -> Self {
        Self {
            state: ScannerState::new(),
            camera: CameraSession::new(),
            backend,
            decoder,
            request,
        }
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn mode(&self) -> ScanMode {
        self.state.mode()
    }

    pub fn camera_phase(&self) -> CameraPhase {
        self.camera.phase()
    }

    pub fn result(&self) -> Option<&DecodedResult> {
        self.state.result()
    }

    /// モード切替（表示を消去し、カメラが動いていれば解放）
    pub fn set_mode(&mut self, mode: ScanMode) -> ModeChange {
        let change = self.state.set_mode(mode);
        if change.release_camera {
            self.camera.stop();
        }
        change
    }

    /// 待機モードに戻す
    pub fn reset(&mut self) -> ModeChange {
        self.set_mode(ScanMode::Idle)
    }

    /// カメラを起動
    ///
    /// # Returns
    /// 起動できた場合 `true`。拒否・失敗時はエラーを表示状態に設定して `false`
    pub async fn start_camera(&mut self) -> bool {
        self.set_mode(ScanMode::Camera);
        self.camera.begin_request();
        self.state.camera_requested();

        match self.backend.open(&self.request).await {
            Ok(stream) => {
                if self.camera.attach(stream) {
                    self.state.camera_started();
                    true
                } else {
                    false
                }
            }
            Err(e) => {
                warn!("カメラ起動失敗: {}", e);
                self.camera.fail();
                self.state.camera_failed(e);
                false
            }
        }
    }

    /// 現在のフレームを撮影してデコード
    ///
    /// 成功したらカメラを停止する。見つからない場合はカメラを起動したまま再試行できる。
    pub async fn capture(&mut self) -> bool {
        let Some(ticket) = self.state.begin_decode() else {
            return false;
        };

        let outcome = match self.camera.grab_frame() {
            Ok(Some(frame)) => Ok(self.decoder.decode(&frame).await),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        let found = matches!(outcome, Ok(Some(_)));

        if self.state.finish_decode(ticket, outcome) && found {
            self.camera.stop();
            self.state.camera_stopped();
            info!("カメラからQRコードを検出");
        }
        found
    }

    /// カメラを閉じて待機モードへ
    pub fn close_camera(&mut self) {
        self.reset();
    }

    /// 画像ファイルをスキャン（アップロードモード）
    pub async fn upload(&mut self, path: &Path) -> bool {
        self.set_mode(ScanMode::Upload);

        if let Err(e) = validate_image_type(&upload::declared_mime(path)) {
            warn!("{}: {}", path.display(), e);
            self.state.reject(e);
            return false;
        }

        let Some(ticket) = self.state.begin_decode() else {
            return false;
        };

        let outcome = match upload::load_image(path).await {
            Ok(loaded) => {
                self.state.set_preview(loaded.preview);
                Ok(self.decoder.decode(&loaded.pixels).await)
            }
            Err(e) => Err(e),
        };
        let found = matches!(outcome, Ok(Some(_)));
        self.state.finish_decode(ticket, outcome);
        found
    }

    pub fn dismiss_error(&mut self) {
        self.state.dismiss_error();
    }

    /// 生テキストをクリップボードへ
    pub fn copy_result(&self, clipboard: &dyn Clipboard) -> Result<()> {
        let result = self
            .state
            .result()
            .ok_or_else(|| QrScanError::Clipboard("コピーする結果がありません".into()))?;
        clipboard.write_text(&result.raw)
    }
}
