//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"QR Scan - QRコードスキャナ"</h1>
        </header>
    }
}
