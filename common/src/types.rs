//! スキャン結果・フレームの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - ScanMode: スキャンモード（待機/カメラ/アップロード）
//! - PixelBuffer: デコーダに渡す生ピクセル
//! - ParsedItem: URLエンコードJSONから復元した品目レコード
//! - DecodedResult: デコード結果（生テキスト + 解釈結果）

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScanError};

/// スキャンモード（同時に1つだけ有効）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Idle,
    Camera,
    Upload,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Idle => "idle",
            ScanMode::Camera => "camera",
            ScanMode::Upload => "upload",
        }
    }

    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            ScanMode::Idle => "待機",
            ScanMode::Camera => "カメラ",
            ScanMode::Upload => "画像アップロード",
        }
    }
}

/// ピクセル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8bitグレースケール
    Luma8,
    /// 8bit RGBA（canvasのImageDataと同じ並び）
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Luma8 => 1,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// デコーダに渡すフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// バッファを作成（サイズ不一致はエラー）
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if width == 0 || height == 0 || data.len() != expected {
            return Err(ScanError::Processing(format!(
                "ピクセル数が不正です: {}x{} ({}バイト, 期待値{}バイト)",
                width,
                height,
                data.len(),
                expected
            )));
        }
        Ok(Self { width, height, format, data })
    }

    pub fn luma(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, PixelFormat::Luma8, data)
    }

    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, PixelFormat::Rgba8, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// (x, y) の輝度を返す
    ///
    /// RGBAはBT.601の係数で輝度に変換する（アルファは無視）
    pub fn luma_at(&self, x: usize, y: usize) -> u8 {
        let idx = y * self.width as usize + x;
        match self.format {
            PixelFormat::Luma8 => self.data[idx],
            PixelFormat::Rgba8 => {
                let p = &self.data[idx * 4..idx * 4 + 3];
                let l = 299 * p[0] as u32 + 587 * p[1] as u32 + 114 * p[2] as u32;
                (l / 1000) as u8
            }
        }
    }

    /// グレースケールに変換したコピー
    pub fn to_luma(&self) -> PixelBuffer {
        if self.format == PixelFormat::Luma8 {
            return self.clone();
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(self.luma_at(x, y));
            }
        }
        PixelBuffer {
            width: self.width,
            height: self.height,
            format: PixelFormat::Luma8,
            data,
        }
    }
}

/// カメラの向き
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// 背面カメラ
    #[default]
    Environment,
    /// 前面カメラ
    User,
}

impl Facing {
    /// getUserMediaのfacingMode値
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Environment => "environment",
            Facing::User => "user",
        }
    }
}

/// カメラ起動要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRequest {
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            width: 1280,
            height: 720,
        }
    }
}

/// アップロード画像のプレビュー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    /// 表示元（WebはオブジェクトURL、CLIはファイルパス）
    pub source: String,
    pub dimensions: Option<(u32, u32)>,
}

impl Preview {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dimensions: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }
}

/// QRペイロードから復元した品目レコード
///
/// すべてのキーが必須。`quantity` は数値・文字列のどちらでも受け付け、表示用文字列で保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedItem {
    #[serde(rename = "id", alias = "identifier")]
    pub identifier: String,
    pub code: String,
    #[serde(deserialize_with = "number_or_string")]
    pub quantity: String,
    pub unit: String,
    pub location: String,
    pub period: String,
    pub placement: String,
    pub description: String,
}

impl ParsedItem {
    /// 表示用の (ラベル, 値) 一覧
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("識別子", self.identifier.as_str()),
            ("コード", self.code.as_str()),
            ("数量", self.quantity.as_str()),
            ("単位", self.unit.as_str()),
            ("保管場所", self.location.as_str()),
            ("期間", self.period.as_str()),
            ("配置", self.placement.as_str()),
            ("説明", self.description.as_str()),
        ]
    }
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quantity {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(match Quantity::deserialize(deserializer)? {
        Quantity::Number(n) => n.to_string(),
        Quantity::Text(s) => s,
    })
}

/// デコード結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedResult {
    /// デコードされた生テキスト（常に保持）
    pub raw: String,
    /// 解釈できた場合のみ
    pub item: Option<ParsedItem>,
    /// デコードに成功した方式
    pub strategy: &'static str,
}

impl DecodedResult {
    /// 生テキストを解釈して結果を作成
    pub fn interpret(raw: impl Into<String>, strategy: &'static str) -> Self {
        let raw = raw.into();
        let item = crate::interpreter::interpret(&raw);
        Self { raw, item, strategy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_json() -> &'static str {
        r#"{
            "id": "ITEM-001",
            "code": "A-42",
            "quantity": 12,
            "unit": "箱",
            "location": "倉庫B",
            "period": "2026-10",
            "placement": "棚3段目",
            "description": "交換用フィルタ"
        }"#
    }

    #[test]
    fn test_pixel_buffer_size_mismatch() {
        assert!(PixelBuffer::luma(2, 2, vec![0; 3]).is_err());
        assert!(PixelBuffer::rgba(2, 2, vec![0; 8]).is_err());
        assert!(PixelBuffer::luma(0, 0, vec![]).is_err());
    }

    #[test]
    fn test_pixel_buffer_rgba_to_luma() {
        let buf = PixelBuffer::rgba(2, 1, vec![255, 255, 255, 255, 0, 0, 0, 255]).unwrap();
        assert_eq!(buf.luma_at(0, 0), 255);
        assert_eq!(buf.luma_at(1, 0), 0);

        let luma = buf.to_luma();
        assert_eq!(luma.format(), PixelFormat::Luma8);
        assert_eq!(luma.data(), &[255, 0]);
    }

    #[test]
    fn test_parsed_item_numeric_quantity() {
        let item: ParsedItem = serde_json::from_str(item_json()).expect("デシリアライズ失敗");
        assert_eq!(item.identifier, "ITEM-001");
        assert_eq!(item.quantity, "12");
        assert_eq!(item.fields().len(), 8);
    }

    #[test]
    fn test_parsed_item_identifier_alias_and_string_quantity() {
        let json = r#"{"identifier":"X","code":"C","quantity":"2.5","unit":"kg",
            "location":"L","period":"P","placement":"Q","description":"D","extra":true}"#;
        let item: ParsedItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.identifier, "X");
        assert_eq!(item.quantity, "2.5");
    }

    #[test]
    fn test_parsed_item_missing_field_rejected() {
        let json = r#"{"id":"X","code":"C","quantity":1}"#;
        assert!(serde_json::from_str::<ParsedItem>(json).is_err());
    }

    #[test]
    fn test_scan_mode_serialize() {
        let json = serde_json::to_string(&ScanMode::Camera).unwrap();
        assert_eq!(json, "\"camera\"");
        assert_eq!(ScanMode::default(), ScanMode::Idle);
    }

    #[test]
    fn test_decoded_result_serialize() {
        let result = DecodedResult::interpret("Hello", "bundled");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"raw\":\"Hello\""));
        assert!(json.contains("\"item\":null"));
    }
}
