//! エラーメッセージ（閉じるまで表示）

use leptos::prelude::*;

use crate::app::Controller;

#[component]
pub fn ErrorBanner(controller: Controller) -> impl IntoView {
    let error = move || {
        controller
            .state
            .with(|s| s.error().map(|e| (e.kind(), e.to_string())))
    };

    view! {
        {move || error().map(|(kind, message)| view! {
            <div class=format!("error-banner {}", kind) role="alert">
                <span>{format!("⚠ {}", message)}</span>
                <button class="dismiss" on:click=move |_| controller.dismiss()>"×"</button>
            </div>
        })}
    }
}
