//! getUserMedia によるカメラ
//!
//! `<video>` にストリームを流し、撮影時に canvas へ描画して RGBA を取り出す。

use async_trait::async_trait;
use js_sys::{Array, Object, Reflect};
use qr_scan_common::{CameraBackend, CameraRequest, CameraStream, PixelBuffer, Result, ScanError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

/// JS例外を文字列に
pub fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn denied(value: JsValue) -> ScanError {
    ScanError::PermissionDenied(js_message(&value))
}

/// `{ video: { facingMode, width: { ideal }, height: { ideal } }, audio: false }`
fn constraints(request: &CameraRequest) -> std::result::Result<MediaStreamConstraints, JsValue> {
    let ideal = |value: u32| -> std::result::Result<Object, JsValue> {
        let obj = Object::new();
        Reflect::set(&obj, &"ideal".into(), &JsValue::from(value))?;
        Ok(obj)
    };

    let video = Object::new();
    Reflect::set(&video, &"facingMode".into(), &request.facing.as_str().into())?;
    Reflect::set(&video, &"width".into(), &ideal(request.width)?)?;
    Reflect::set(&video, &"height".into(), &ideal(request.height)?)?;

    let root = Object::new();
    Reflect::set(&root, &"video".into(), &video)?;
    Reflect::set(&root, &"audio".into(), &JsValue::FALSE)?;
    Ok(root.unchecked_into())
}

/// 撮影用の作業 canvas
fn scratch_canvas() -> std::result::Result<HtmlCanvasElement, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document がありません"))?
        .create_element("canvas")?
        .dyn_into()
}

/// ストリームの全トラックを停止（カメラのランプが消える）
fn stop_tracks(stream: &MediaStream) {
    let tracks: Array = stream.get_tracks();
    for track in tracks.iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// ブラウザカメラ
///
/// `open` は `<video>` に触れない。表示は要求が最新だと確認してから [`show`] で行う。
pub struct BrowserCamera {
    video: HtmlVideoElement,
}

impl BrowserCamera {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self { video }
    }
}

#[async_trait(?Send)]
impl CameraBackend for BrowserCamera {
    type Stream = BrowserStream;

    async fn open(&self, request: &CameraRequest) -> Result<BrowserStream> {
        let window = web_sys::window()
            .ok_or_else(|| ScanError::PermissionDenied("window がありません".into()))?;
        // getUserMedia より前に用意し、ストリーム取得後に失敗しないようにする
        let canvas = scratch_canvas().map_err(|e| ScanError::Processing(js_message(&e)))?;
        let media = window.navigator().media_devices().map_err(denied)?;

        let promise = media
            .get_user_media_with_constraints(&constraints(request).map_err(denied)?)
            .map_err(denied)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(denied)?
            .dyn_into()
            .map_err(denied)?;

        Ok(BrowserStream {
            stream,
            video: self.video.clone(),
            canvas,
            released: false,
        })
    }
}

/// ストリームを `<video>` に流して再生
///
/// セッションに登録済みのストリームに対してのみ呼ぶこと
pub async fn show(video: &HtmlVideoElement, media: &MediaStream) -> Result<()> {
    // iOS Safari はインライン再生属性がないと全画面になる
    let _ = video.set_attribute("playsinline", "true");
    video.set_muted(true);
    video.set_src_object(Some(media));

    let play = video.play().map_err(denied)?;
    JsFuture::from(play).await.map_err(denied)?;
    Ok(())
}

/// 開いているカメラストリーム
pub struct BrowserStream {
    stream: MediaStream,
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    released: bool,
}

impl BrowserStream {
    pub fn media(&self) -> MediaStream {
        self.stream.clone()
    }

    /// `<video>` が今このストリームを表示しているか
    fn is_shown(&self) -> bool {
        self.video
            .src_object()
            .map(|current| Object::is(&current, &self.stream))
            .unwrap_or(false)
    }

    fn draw(&self) -> std::result::Result<Option<PixelBuffer>, JsValue> {
        let (width, height) = (self.video.video_width(), self.video.video_height());
        if width == 0 || height == 0 {
            return Ok(None);
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        let context: CanvasRenderingContext2d = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context がありません"))?
            .dyn_into()?;
        context.draw_image_with_html_video_element(&self.video, 0.0, 0.0)?;
        let image = context.get_image_data(0.0, 0.0, width as f64, height as f64)?;

        Ok(PixelBuffer::rgba(width, height, image.data().0).ok())
    }
}

impl CameraStream for BrowserStream {
    fn grab_frame(&mut self) -> Option<PixelBuffer> {
        if self.released {
            return None;
        }
        match self.draw() {
            Ok(frame) => frame,
            Err(e) => {
                web_sys::console::warn_1(&format!("フレーム取得失敗: {}", js_message(&e)).into());
                None
            }
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        stop_tracks(&self.stream);
        // 後続の要求が同じ video に別ストリームを流している場合は触らない
        if self.is_shown() {
            self.video.set_src_object(None);
        }
    }
}

impl Drop for BrowserStream {
    fn drop(&mut self) {
        self.release();
    }
}
