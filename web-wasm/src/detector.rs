//! ブラウザ標準の BarcodeDetector
//!
//! 未対応ブラウザ（Firefox、古い Safari など）では `Err` を返し、
//! 同梱デコーダにフォールバックさせる。

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use qr_scan_common::{DecodeStrategy, PixelBuffer, PixelFormat};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ImageData;

use crate::camera::js_message;

pub struct NativeBarcodeDetector;

impl NativeBarcodeDetector {
    pub const NAME: &'static str = "barcode-detector";

    /// `window.BarcodeDetector` が存在するか
    pub fn is_supported() -> bool {
        web_sys::window()
            .and_then(|w| Reflect::get(&w, &"BarcodeDetector".into()).ok())
            .map(|ctor| ctor.is_function())
            .unwrap_or(false)
    }

    async fn detect(frame: &PixelBuffer) -> Result<Option<String>, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("window がありません"))?;
        let ctor: Function = Reflect::get(&window, &"BarcodeDetector".into())?.dyn_into()?;

        let options = js_sys::Object::new();
        Reflect::set(&options, &"formats".into(), &Array::of1(&"qr_code".into()))?;
        let detector = Reflect::construct(&ctor, &Array::of1(&options))?;

        let image = to_image_data(frame)?;
        let detect: Function = Reflect::get(&detector, &"detect".into())?.dyn_into()?;
        let promise: Promise = detect.call1(&detector, &image)?.dyn_into()?;
        let codes: Array = JsFuture::from(promise).await?.dyn_into()?;

        if codes.length() == 0 {
            return Ok(None);
        }
        let raw = Reflect::get(&codes.get(0), &"rawValue".into())?;
        Ok(raw.as_string().filter(|s| !s.is_empty()))
    }
}

fn to_image_data(frame: &PixelBuffer) -> Result<ImageData, JsValue> {
    let rgba = match frame.format() {
        PixelFormat::Rgba8 => frame.data().to_vec(),
        PixelFormat::Luma8 => frame.data().iter().flat_map(|&l| [l, l, l, 255]).collect(),
    };
    ImageData::new_with_u8_clamped_array_and_sh(Clamped(rgba.as_slice()), frame.width(), frame.height())
}

#[async_trait(?Send)]
impl DecodeStrategy for NativeBarcodeDetector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn decode(&self, frame: &PixelBuffer) -> Result<Option<String>, String> {
        if !Self::is_supported() {
            return Err("BarcodeDetector 非対応".into());
        }
        Self::detect(frame).await.map_err(|e| js_message(&e))
    }
}
