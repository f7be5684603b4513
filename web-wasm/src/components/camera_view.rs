//! カメラ表示

use leptos::prelude::*;
use qr_scan_common::{CameraPhase, ScanMode};

use crate::app::Controller;

#[component]
pub fn CameraView(controller: Controller) -> impl IntoView {
    let video_ref = controller.video;
    let can_capture =
        move || controller.camera_phase() == CameraPhase::Active && !controller.is_busy();

    view! {
        <section class="camera-view" hidden=move || controller.mode() != ScanMode::Camera>
            <video node_ref=video_ref class="camera-video"></video>

            <p class="text-muted">
                {move || match controller.camera_phase() {
                    CameraPhase::Requesting => "カメラへのアクセスを要求中...",
                    CameraPhase::Active if controller.is_busy() => "解析中...",
                    CameraPhase::Active => "QRコードを映して「撮影」を押してください",
                    CameraPhase::Off => "カメラは停止しています",
                }}
            </p>

            <div class="camera-actions">
                <button
                    class="primary"
                    disabled=move || !can_capture()
                    on:click=move |_| controller.capture()
                >
                    "📸 撮影"
                </button>
                <button on:click=move |_| controller.close_camera()>"閉じる"</button>
            </div>
        </section>
    }
}
