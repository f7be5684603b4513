//! 画像ファイルの読み込み（ブラウザ）

use qr_scan_common::{validate_image_type, PixelBuffer, Result, ScanError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, File, HtmlCanvasElement, HtmlImageElement, Url};

use crate::camera::js_message;

fn processing(value: JsValue) -> ScanError {
    ScanError::Processing(js_message(&value))
}

/// 種別を検査してプレビュー用の object URL を作る
pub fn preview_url(file: &File) -> Result<String> {
    validate_image_type(&file.type_())?;
    Url::create_object_url_with_blob(file).map_err(processing)
}

/// `blob:` URL を解放（それ以外は何もしない）
pub fn revoke(url: &str) {
    if url.starts_with("blob:") {
        let _ = Url::revoke_object_url(url);
    }
}

/// URL の画像を読み込んで RGBA に展開
pub async fn read_pixels(url: &str) -> Result<PixelBuffer> {
    let image = HtmlImageElement::new().map_err(processing)?;
    image.set_src(url);
    JsFuture::from(image.decode())
        .await
        .map_err(|_| ScanError::Processing("画像を読み込めません".into()))?;

    let (width, height) = (image.natural_width(), image.natural_height());
    if width == 0 || height == 0 {
        return Err(ScanError::Processing("画像サイズが不正です".into()));
    }

    let canvas: HtmlCanvasElement = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ScanError::Processing("document がありません".into()))?
        .create_element("canvas")
        .map_err(processing)?
        .dyn_into()
        .map_err(processing)?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(processing)?
        .ok_or_else(|| ScanError::Processing("2d context がありません".into()))?
        .dyn_into()
        .map_err(processing)?;
    context
        .draw_image_with_html_image_element(&image, 0.0, 0.0)
        .map_err(processing)?;
    let data = context
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(processing)?;

    PixelBuffer::rgba(width, height, data.data().0)
}
