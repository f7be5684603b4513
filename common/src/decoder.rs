//! QRデコーダ
//!
//! デコード方式を優先順に試す:
//! 1. プラットフォームの機能（ブラウザのBarcodeDetector、zbarimg など）
//! 2. 同梱アルゴリズム（rqrr）… 常に最後に試す
//!
//! 1のエラーは呼び出し側に返さず、2へのフォールバック合図として扱う。

use async_trait::async_trait;
use tracing::debug;

use crate::types::PixelBuffer;

/// デコード方式
#[async_trait(?Send)]
pub trait DecodeStrategy {
    /// 方式名（ログ・結果表示用）
    fn name(&self) -> &'static str;

    /// フレームをデコード
    ///
    /// # Returns
    /// * `Ok(Some(text))` - 検出成功
    /// * `Ok(None)` - QRコードなし
    /// * `Err(reason)` - この方式が使えない／失敗した
    async fn decode(&self, frame: &PixelBuffer) -> std::result::Result<Option<String>, String>;
}

/// デコード成功時の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub strategy: &'static str,
}

/// 方式を順に試すデコーダ
pub struct Decoder {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl Decoder {
    /// 優先方式を指定して作成（同梱デコーダは自動で末尾に追加）
    pub fn new(primary: Vec<Box<dyn DecodeStrategy>>) -> Self {
        let mut strategies = primary;
        strategies.push(Box::new(BundledDecoder));
        Self { strategies }
    }

    /// 同梱デコーダのみ
    pub fn bundled_only() -> Self {
        Self::new(Vec::new())
    }

    /// 試行順の方式名
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// フレームをデコード。見つからなければ `None`
    pub async fn decode(&self, frame: &PixelBuffer) -> Option<Decoded> {
        for strategy in &self.strategies {
            match strategy.decode(frame).await {
                Ok(Some(text)) => {
                    debug!("{}: 検出成功 ({} bytes)", strategy.name(), text.len());
                    return Some(Decoded {
                        text,
                        strategy: strategy.name(),
                    });
                }
                Ok(None) => debug!("{}: QRコードなし", strategy.name()),
                Err(e) => debug!("{}: 失敗、次の方式へ: {}", strategy.name(), e),
            }
        }
        None
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::bundled_only()
    }
}

/// 同梱デコーダ（rqrr）
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledDecoder;

impl BundledDecoder {
    pub const NAME: &'static str = "bundled";

    /// 同期版デコード
    pub fn decode_sync(frame: &PixelBuffer) -> Option<String> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            frame.width() as usize,
            frame.height() as usize,
            |x, y| frame.luma_at(x, y),
        );

        let grids = prepared.detect_grids();
        debug!("rqrr: 候補グリッド {}件", grids.len());

        grids.iter().find_map(|grid| match grid.decode() {
            Ok((_, content)) => Some(content),
            Err(e) => {
                debug!("rqrr: グリッドのデコード失敗: {:?}", e);
                None
            }
        })
    }
}

#[async_trait(?Send)]
impl DecodeStrategy for BundledDecoder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn decode(&self, frame: &PixelBuffer) -> std::result::Result<Option<String>, String> {
        Ok(Self::decode_sync(frame))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{blank_frame, qr_frame};
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    struct FixedStrategy {
        result: std::result::Result<Option<String>, String>,
        calls: Cell<usize>,
    }

    impl FixedStrategy {
        fn new(result: std::result::Result<Option<String>, String>) -> Self {
            Self { result, calls: Cell::new(0) }
        }
    }

    #[async_trait(?Send)]
    impl DecodeStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn decode(&self, _frame: &PixelBuffer) -> std::result::Result<Option<String>, String> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    #[test]
    fn test_bundled_decodes_exact_content() {
        let content = "https://example.com/item?id=42&lot=B-7";
        let frame = qr_frame(content, 6);
        let decoded = block_on(Decoder::bundled_only().decode(&frame)).expect("検出できるはず");
        assert_eq!(decoded.text, content);
        assert_eq!(decoded.strategy, BundledDecoder::NAME);
    }

    #[test]
    fn test_bundled_decodes_rgba_frame() {
        let luma = qr_frame("rgba-frame", 5);
        let rgba: Vec<u8> = luma.data().iter().flat_map(|&v| [v, v, v, 255]).collect();
        let frame = PixelBuffer::rgba(luma.width(), luma.height(), rgba).unwrap();
        assert_eq!(BundledDecoder::decode_sync(&frame).as_deref(), Some("rgba-frame"));
    }

    #[test]
    fn test_blank_frame_not_found() {
        assert!(block_on(Decoder::bundled_only().decode(&blank_frame(120))).is_none());
    }

    #[test]
    fn test_primary_strategy_wins() {
        let decoder = Decoder::new(vec![Box::new(FixedStrategy::new(Ok(Some("native".into()))))]);
        let decoded = block_on(decoder.decode(&blank_frame(40))).unwrap();
        assert_eq!(decoded.text, "native");
        assert_eq!(decoded.strategy, "fixed");
    }

    #[test]
    fn test_primary_error_falls_back() {
        let decoder = Decoder::new(vec![Box::new(FixedStrategy::new(Err("unsupported".into())))]);
        let decoded = block_on(decoder.decode(&qr_frame("fallback", 6))).expect("フォールバックで検出");
        assert_eq!(decoded.text, "fallback");
        assert_eq!(decoded.strategy, BundledDecoder::NAME);
    }

    #[test]
    fn test_primary_empty_falls_back() {
        let decoder = Decoder::new(vec![Box::new(FixedStrategy::new(Ok(None)))]);
        let decoded = block_on(decoder.decode(&qr_frame("empty-primary", 6))).unwrap();
        assert_eq!(decoded.strategy, BundledDecoder::NAME);
    }

    #[test]
    fn test_strategy_order() {
        let decoder = Decoder::new(vec![Box::new(FixedStrategy::new(Ok(None)))]);
        assert_eq!(decoder.strategy_names(), vec!["fixed", "bundled"]);
        assert_eq!(Decoder::default().strategy_names(), vec!["bundled"]);
    }
}
