//! navigator.clipboard

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::camera::js_message;

/// テキストをクリップボードへ
///
/// `web_sys::Clipboard` は unstable API のため Reflect 経由で呼ぶ
pub async fn write_text(text: &str) -> Result<(), String> {
    let result: Result<(), JsValue> = async {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("window がありません"))?;
        let clipboard = Reflect::get(&window.navigator(), &"clipboard".into())?;
        if clipboard.is_undefined() {
            return Err(JsValue::from_str("クリップボードを利用できません"));
        }
        let write: Function = Reflect::get(&clipboard, &"writeText".into())?.dyn_into()?;
        let promise: Promise = write.call1(&clipboard, &text.into())?.dyn_into()?;
        JsFuture::from(promise).await?;
        Ok(())
    }
    .await;
    result.map_err(|e| js_message(&e))
}
