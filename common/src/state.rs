//! スキャナの状態遷移
//!
//! 副作用（カメラ操作・デコード）は持たず、CLIとWebの両方から同じ規則で操作する。
//!
//! 規則:
//! - モードは待機/カメラ/アップロードのいずれか1つ
//! - モードを切り替えると結果・プレビュー・エラーを必ず消去する
//! - デコード中は次のデコードを受け付けない
//! - モード切替前に始まったデコードの完了通知は無視する

use tracing::debug;

use crate::camera::CameraPhase;
use crate::decoder::Decoded;
use crate::error::ScanError;
use crate::types::{DecodedResult, Preview, ScanMode};

/// モード切替の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub previous: ScanMode,
    pub current: ScanMode,
    /// カメラを解放する必要があるか
    pub release_camera: bool,
}

/// 実行中デコードの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTicket(u64);

/// スキャナの表示状態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannerState {
    mode: ScanMode,
    camera: CameraPhase,
    busy: bool,
    result: Option<DecodedResult>,
    preview: Option<Preview>,
    error: Option<ScanError>,
    epoch: u64,
}

impl ScannerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn camera(&self) -> CameraPhase {
        self.camera
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn result(&self) -> Option<&DecodedResult> {
        self.result.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn error(&self) -> Option<&ScanError> {
        self.error.as_ref()
    }

    /// モードを切り替える（同じモードでも表示は消去する）
    pub fn set_mode(&mut self, mode: ScanMode) -> ModeChange {
        let previous = self.mode;
        let release_camera = self.camera != CameraPhase::Off;

        self.mode = mode;
        self.camera = CameraPhase::Off;
        self.clear_view();
        debug!("モード切替: {} → {}", previous.as_str(), mode.as_str());

        ModeChange {
            previous,
            current: mode,
            release_camera,
        }
    }

    /// 待機モードに戻す
    pub fn reset(&mut self) -> ModeChange {
        self.set_mode(ScanMode::Idle)
    }

    /// 結果・プレビュー・エラーを消去し、実行中のデコードを無効化
    pub fn clear_view(&mut self) {
        self.result = None;
        self.preview = None;
        self.clear_error();
        self.busy = false;
        self.epoch += 1;
    }

    pub fn camera_requested(&mut self) {
        self.camera = CameraPhase::Requesting;
        self.clear_error();
    }

    pub fn camera_started(&mut self) {
        self.camera = CameraPhase::Active;
    }

    /// カメラ起動失敗（権限拒否など）
    pub fn camera_failed(&mut self, error: ScanError) {
        self.camera = CameraPhase::Off;
        self.set_error(error);
    }

    pub fn camera_stopped(&mut self) {
        self.camera = CameraPhase::Off;
    }

    /// デコード開始。実行中なら `None`
    pub fn begin_decode(&mut self) -> Option<DecodeTicket> {
        if self.busy {
            debug!("デコード実行中のため要求を無視");
            return None;
        }
        self.busy = true;
        self.clear_error();
        Some(DecodeTicket(self.epoch))
    }

    /// デコード完了を反映
    ///
    /// # Returns
    /// 反映した場合 `true`。モード切替などでチケットが古い場合は `false`
    pub fn finish_decode(
        &mut self,
        ticket: DecodeTicket,
        outcome: Result<Option<Decoded>, ScanError>,
    ) -> bool {
        if ticket.0 != self.epoch {
            debug!("古いデコード結果を破棄");
            return false;
        }
        self.busy = false;

        match outcome {
            Ok(Some(decoded)) => {
                self.result = Some(DecodedResult::interpret(decoded.text, decoded.strategy));
            }
            Ok(None) => self.set_error(ScanError::NoCodeFound),
            Err(e) => self.set_error(e),
        }
        true
    }

    /// デコードが成功したか（カメラ停止判定用）
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    pub fn set_preview(&mut self, preview: Preview) {
        self.preview = Some(preview);
    }

    /// 検証エラーなど、デコード前の失敗を表示
    pub fn reject(&mut self, error: ScanError) {
        self.set_error(error);
    }

    /// エラーメッセージを閉じる
    pub fn dismiss_error(&mut self) {
        self.clear_error();
    }

    fn set_error(&mut self, error: ScanError) {
        self.error = Some(error);
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(text: &str) -> Decoded {
        Decoded {
            text: text.to_string(),
            strategy: "bundled",
        }
    }

    fn state_with_everything() -> ScannerState {
        let mut state = ScannerState::new();
        state.set_mode(ScanMode::Upload);
        state.set_preview(Preview::new("photo.png"));
        let ticket = state.begin_decode().unwrap();
        state.finish_decode(ticket, Ok(Some(decoded("Hello"))));
        state.reject(ScanError::InvalidFileType("text/plain".into()));
        state
    }

    #[test]
    fn test_initial_state() {
        let state = ScannerState::new();
        assert_eq!(state.mode(), ScanMode::Idle);
        assert_eq!(state.camera(), CameraPhase::Off);
        assert!(!state.is_busy());
        assert!(state.result().is_none());
    }

    #[test]
    fn test_mode_switch_clears_view() {
        for mode in [ScanMode::Idle, ScanMode::Camera, ScanMode::Upload] {
            let mut state = state_with_everything();
            assert!(state.result().is_some());
            assert!(state.preview().is_some());
            assert!(state.error().is_some());

            state.set_mode(mode);
            assert_eq!(state.mode(), mode);
            assert!(state.result().is_none());
            assert!(state.preview().is_none());
            assert!(state.error().is_none());
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut state = state_with_everything();
        state.reset();
        let once = state.clone();
        state.reset();
        assert_eq!(state.mode(), once.mode());
        assert_eq!(state.result(), once.result());
        assert_eq!(state.preview(), once.preview());
        assert_eq!(state.error(), once.error());
    }

    #[test]
    fn test_leaving_camera_requests_release() {
        let mut state = ScannerState::new();
        state.set_mode(ScanMode::Camera);
        state.camera_requested();
        state.camera_started();

        let change = state.set_mode(ScanMode::Upload);
        assert!(change.release_camera);
        assert_eq!(change.previous, ScanMode::Camera);
        assert_eq!(state.camera(), CameraPhase::Off);

        assert!(!state.set_mode(ScanMode::Idle).release_camera);
    }

    #[test]
    fn test_busy_refuses_overlapping_decode() {
        let mut state = ScannerState::new();
        let ticket = state.begin_decode().expect("最初は受け付ける");
        assert!(state.is_busy());
        assert!(state.begin_decode().is_none());

        state.finish_decode(ticket, Ok(None));
        assert!(!state.is_busy());
        assert!(state.begin_decode().is_some());
    }

    #[test]
    fn test_not_found_sets_transient_error() {
        let mut state = ScannerState::new();
        state.set_mode(ScanMode::Camera);
        let ticket = state.begin_decode().unwrap();
        assert!(state.finish_decode(ticket, Ok(None)));
        assert_eq!(state.error(), Some(&ScanError::NoCodeFound));

        state.dismiss_error();
        assert!(state.error().is_none());
    }

    #[test]
    fn test_stale_ticket_ignored() {
        let mut state = ScannerState::new();
        state.set_mode(ScanMode::Upload);
        let ticket = state.begin_decode().unwrap();

        state.set_mode(ScanMode::Camera);
        assert!(!state.finish_decode(ticket, Ok(Some(decoded("late")))));
        assert!(state.result().is_none());
        assert!(!state.is_busy());
    }

    #[test]
    fn test_result_is_interpreted() {
        let mut state = ScannerState::new();
        let ticket = state.begin_decode().unwrap();
        let payload = "%7B%22id%22%3A%221%22%2C%22code%22%3A%22c%22%2C%22quantity%22%3A3%2C%22unit%22%3A%22u%22%2C%22location%22%3A%22l%22%2C%22period%22%3A%22p%22%2C%22placement%22%3A%22pl%22%2C%22description%22%3A%22d%22%7D";
        state.finish_decode(ticket, Ok(Some(decoded(payload))));

        let result = state.result().unwrap();
        assert_eq!(result.raw, payload);
        let item = result.item.as_ref().expect("解釈できるはず");
        assert_eq!(item.quantity, "3");
    }

    #[test]
    fn test_camera_failure() {
        let mut state = ScannerState::new();
        state.set_mode(ScanMode::Camera);
        state.camera_requested();
        state.camera_failed(ScanError::PermissionDenied("denied".into()));
        assert_eq!(state.camera(), CameraPhase::Off);
        assert!(matches!(state.error(), Some(ScanError::PermissionDenied(_))));
    }

    #[test]
    fn test_begin_decode_clears_previous_error() {
        let mut state = ScannerState::new();
        state.reject(ScanError::NoCodeFound);
        state.begin_decode();
        assert!(state.error().is_none());
    }
}
