//! アップロードエリアコンポーネント

use leptos::html;
use leptos::prelude::*;
use qr_scan_common::ACCEPT_IMAGES;
use web_sys::{DragEvent, FileList, HtmlInputElement};

use crate::app::Controller;

#[component]
pub fn UploadArea(controller: Controller) -> impl IntoView {
    let (is_dragover, set_is_dragover) = signal(false);
    let input_ref = NodeRef::<html::Input>::new();

    // 先頭の1枚のみ読み取る
    let handle_files = move |files: FileList| {
        if let Some(file) = files.get(0) {
            controller.upload(file);
        }
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(false);

        if controller.is_busy() {
            return;
        }
        if let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) {
            handle_files(files);
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(true);
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        if controller.is_busy() {
            return;
        }
        if let Some(input) = input_ref.get_untracked() {
            input.click();
        }
    };

    let on_change = move |ev: web_sys::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(files) = input.files() {
            handle_files(files);
        }
        // 同じファイルを選び直しても change が発火するように
        input.set_value("");
    };

    let preview = move || {
        controller
            .state
            .with(|s| s.preview().map(|p| (p.source.clone(), p.dimensions)))
    };

    view! {
        <section>
            <input
                node_ref=input_ref
                type="file"
                accept=ACCEPT_IMAGES
                hidden=true
                on:change=on_change
            />
            <div
                class=move || {
                    let mut classes = vec!["upload-area"];
                    if is_dragover.get() {
                        classes.push("dragover");
                    }
                    if controller.is_busy() {
                        classes.push("disabled");
                    }
                    classes.join(" ")
                }
                on:drop=on_drop
                on:dragover=on_dragover
                on:dragleave=on_dragleave
                on:click=on_click
            >
                <div class="upload-icon">"🖼"</div>
                <p>"画像をドラッグ&ドロップ または クリックして選択"</p>
                <p class="text-muted">"対応形式: 画像ファイル (image/*)"</p>
            </div>

            {move || preview().map(|(src, dimensions)| view! {
                <figure class="preview">
                    <img src=src alt="プレビュー" />
                    {dimensions.map(|(w, h)| view! {
                        <figcaption class="text-muted">{format!("{}x{}", w, h)}</figcaption>
                    })}
                </figure>
            })}

            <Show when=move || controller.is_busy()>
                <p class="text-muted">"解析中..."</p>
            </Show>
        </section>
    }
}
