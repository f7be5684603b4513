//! メインアプリケーションコンポーネント

use std::rc::Rc;

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use qr_scan_common::{
    CameraBackend, CameraPhase, CameraRequest, CameraSession, DecodeStrategy, Decoder, Preview,
    ScanError, ScanMode, ScannerState,
};

use crate::camera::{self, BrowserCamera, BrowserStream};
use crate::clipboard;
use crate::components::{
    camera_view::CameraView, error_banner::ErrorBanner, header::Header,
    mode_selector::ModeSelector, result_panel::ResultPanel, upload_area::UploadArea,
};
use crate::detector::NativeBarcodeDetector;
use crate::upload;

/// BarcodeDetector があれば優先、なければ同梱デコーダのみ
fn build_decoder() -> Decoder {
    let mut primary: Vec<Box<dyn DecodeStrategy>> = Vec::new();
    if NativeBarcodeDetector::is_supported() {
        primary.push(Box::new(NativeBarcodeDetector));
    }
    Decoder::new(primary)
}

/// 画面の操作をまとめたハンドル
///
/// 中身はすべてリアクティブシステムのハンドルなので `Copy` で各コンポーネントに渡せる。
#[derive(Clone, Copy)]
pub struct Controller {
    pub state: RwSignal<ScannerState>,
    pub video: NodeRef<html::Video>,
    /// コピー完了などの一時メッセージ
    pub notice: RwSignal<Option<String>>,
    session: StoredValue<CameraSession<BrowserStream>, LocalStorage>,
    decoder: StoredValue<Rc<Decoder>, LocalStorage>,
    /// カメラ要求の世代（古い getUserMedia の完了を捨てる）
    request: StoredValue<u64>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(ScannerState::new()),
            video: NodeRef::new(),
            notice: RwSignal::new(None),
            session: StoredValue::new_local(CameraSession::new()),
            decoder: StoredValue::new_local(Rc::new(build_decoder())),
            request: StoredValue::new(0),
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.state.with(|s| s.mode())
    }

    pub fn is_busy(&self) -> bool {
        self.state.with(|s| s.is_busy())
    }

    pub fn camera_phase(&self) -> CameraPhase {
        self.state.with(|s| s.camera())
    }

    /// モード切替。カメラが動いていれば解放し、表示はすべて消去
    pub fn select_mode(&self, mode: ScanMode) {
        self.release_preview();
        self.request.update_value(|r| *r += 1);
        let change = self.state.try_update(|s| s.set_mode(mode));
        if change.map(|c| c.release_camera).unwrap_or(true) {
            self.session.update_value(|c| c.stop());
        }
        self.notice.set(None);

        if mode == ScanMode::Camera {
            self.start_camera();
        }
    }

    fn start_camera(&self) {
        let Some(video) = self.video.get_untracked() else {
            self.state.update(|s| {
                s.camera_failed(ScanError::Processing("video 要素がありません".into()))
            });
            return;
        };

        let request_id = self.request.get_value();
        self.session.update_value(|c| c.begin_request());
        self.state.update(|s| s.camera_requested());

        let this = *self;
        spawn_local(async move {
            let opened = BrowserCamera::new(video.clone())
                .open(&CameraRequest::default())
                .await;

            let stream = match opened {
                Ok(stream) => stream,
                Err(e) => {
                    if this.is_current(request_id) {
                        this.session.update_value(|c| c.fail());
                        this.state.update(|s| s.camera_failed(e));
                    }
                    return;
                }
            };

            // 古い要求のストリームはここで drop され、video に触れずに解放される
            let media = stream.media();
            let attached = this.is_current(request_id)
                && this
                    .session
                    .try_update_value(|c| c.attach(stream))
                    .unwrap_or(false);
            if !attached {
                return;
            }

            // 登録済みのストリームだけを video に流す
            let shown = camera::show(&video, &media).await;
            if !this.is_current(request_id) {
                return;
            }
            match shown {
                Ok(()) => this.state.update(|s| s.camera_started()),
                Err(e) => {
                    this.session.update_value(|c| c.stop());
                    this.state.update(|s| s.camera_failed(e));
                }
            }
        });
    }

    fn is_current(&self, request_id: u64) -> bool {
        self.request.try_get_value() == Some(request_id)
    }

    /// 現在のフレームをデコード。成功したらカメラを止める
    pub fn capture(&self) {
        let Some(ticket) = self.state.try_update(|s| s.begin_decode()).flatten() else {
            return;
        };
        let frame = self
            .session
            .try_update_value(|c| c.grab_frame())
            .unwrap_or(Ok(None));
        let decoder = self.decoder.get_value();

        let this = *self;
        spawn_local(async move {
            let outcome = match frame {
                Ok(Some(frame)) => Ok(decoder.decode(&frame).await),
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };
            let applied = this
                .state
                .try_update(|s| s.finish_decode(ticket, outcome))
                .unwrap_or(false);

            if applied && this.state.with_untracked(|s| s.has_result()) {
                this.session.update_value(|c| c.stop());
                this.state.update(|s| s.camera_stopped());
            }
        });
    }

    pub fn close_camera(&self) {
        self.select_mode(ScanMode::Idle);
    }

    /// 画像ファイルを読み取る
    pub fn upload(&self, file: web_sys::File) {
        self.select_mode(ScanMode::Upload);

        let url = match upload::preview_url(&file) {
            Ok(url) => url,
            Err(e) => {
                self.state.update(|s| s.reject(e));
                return;
            }
        };
        let Some(ticket) = self.state.try_update(|s| s.begin_decode()).flatten() else {
            upload::revoke(&url);
            return;
        };
        self.state
            .update(|s| s.set_preview(Preview::new(url.clone())));
        let decoder = self.decoder.get_value();

        let this = *self;
        spawn_local(async move {
            let outcome = match upload::read_pixels(&url).await {
                Ok(pixels) => {
                    let preview = Preview::new(url.clone())
                        .with_dimensions(pixels.width(), pixels.height());
                    this.state.update(|s| {
                        if s.preview().map(|p| p.source == url).unwrap_or(false) {
                            s.set_preview(preview);
                        }
                    });
                    Ok(decoder.decode(&pixels).await)
                }
                Err(e) => Err(e),
            };
            this.state.update(|s| {
                s.finish_decode(ticket, outcome);
            });
        });
    }

    /// 生テキストをクリップボードへ
    pub fn copy(&self) {
        let Some(raw) = self.state.with_untracked(|s| s.result().map(|r| r.raw.clone())) else {
            return;
        };
        let this = *self;
        spawn_local(async move {
            match clipboard::write_text(&raw).await {
                Ok(()) => this.notice.set(Some("コピーしました".into())),
                Err(e) => this.state.update(|s| {
                    s.reject(ScanError::Processing(format!("コピーに失敗しました: {}", e)))
                }),
            }
        });
    }

    pub fn dismiss(&self) {
        self.state.update(|s| s.dismiss_error());
        self.notice.set(None);
    }

    fn release_preview(&self) {
        let source = self
            .state
            .try_with_untracked(|s| s.preview().map(|p| p.source.clone()))
            .flatten();
        if let Some(source) = source {
            upload::revoke(&source);
        }
    }

    /// アンマウント時: カメラとプレビューURLを解放
    fn teardown(&self) {
        self.release_preview();
        self.session.try_update_value(|c| c.stop());
    }
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let controller = Controller::new();
    on_cleanup(move || controller.teardown());

    view! {
        <div class="container">
            <Header />

            <ModeSelector controller=controller />

            <ErrorBanner controller=controller />

            // video 要素は getUserMedia 前に存在している必要があるため常に描画
            <CameraView controller=controller />

            <Show when=move || controller.mode() == ScanMode::Upload>
                <UploadArea controller=controller />
            </Show>

            <Show when=move || controller.mode() == ScanMode::Idle>
                <p class="text-muted">"カメラまたは画像ファイルを選んでください"</p>
            </Show>

            <ResultPanel controller=controller />
        </div>
    }
}
