//! モード切替ボタン

use leptos::prelude::*;
use qr_scan_common::ScanMode;

use crate::app::Controller;

#[component]
pub fn ModeSelector(controller: Controller) -> impl IntoView {
    let button = move |mode: ScanMode, icon: &'static str| {
        view! {
            <button
                class=move || {
                    if controller.mode() == mode { "mode-button active" } else { "mode-button" }
                }
                disabled=move || controller.is_busy()
                on:click=move |_| controller.select_mode(mode)
            >
                {format!("{} {}", icon, mode.label())}
            </button>
        }
    };

    view! {
        <nav class="mode-selector">
            {button(ScanMode::Camera, "📷")}
            {button(ScanMode::Upload, "🖼")}
            <Show when=move || controller.mode() != ScanMode::Idle>
                <button
                    class="mode-button"
                    disabled=move || controller.is_busy()
                    on:click=move |_| controller.select_mode(ScanMode::Idle)
                >
                    "↺ リセット"
                </button>
            </Show>
        </nav>
    }
}
