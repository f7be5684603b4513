//! zbarimg連携
//!
//! ホストにインストールされた zbarimg をプラットフォームのデコーダとして使う。
//! 見つからない・失敗した場合はエラーを返し、同梱デコーダへのフォールバックに任せる。

use async_trait::async_trait;
use image::{GrayImage, ImageFormat};
use qr_scan_common::{DecodeStrategy, PixelBuffer};
use tokio::process::Command;
use tracing::debug;

/// zbarimg の「シンボルなし」終了コード
const EXIT_NO_SYMBOL: i32 = 4;

pub struct ZbarDecoder {
    program: String,
}

impl ZbarDecoder {
    pub const NAME: &'static str = "zbarimg";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn write_frame(frame: &PixelBuffer) -> Result<tempfile::NamedTempFile, String> {
        let luma = frame.to_luma();
        let image = GrayImage::from_raw(luma.width(), luma.height(), luma.into_data())
            .ok_or_else(|| "フレームを画像に変換できません".to_string())?;

        let file = tempfile::Builder::new()
            .prefix("qr-scan-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| format!("一時ファイル作成エラー: {}", e))?;
        image
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| format!("一時ファイル書き込みエラー: {}", e))?;
        Ok(file)
    }
}

#[async_trait(?Send)]
impl DecodeStrategy for ZbarDecoder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn decode(&self, frame: &PixelBuffer) -> Result<Option<String>, String> {
        let file = Self::write_frame(frame)?;

        let output = Command::new(&self.program)
            .args(["--quiet", "--raw", "-Sdisable", "-Sqrcode.enable"])
            .arg(file.path())
            .output()
            .await
            .map_err(|e| format!("{} 実行エラー: {}", self.program, e))?;

        match output.status.code() {
            Some(0) => {
                let text = String::from_utf8(output.stdout)
                    .map_err(|e| format!("UTF-8ではない出力: {}", e))?;
                let text = text.strip_suffix('\n').unwrap_or(&text).to_string();
                debug!("zbarimg: {} bytes", text.len());
                Ok(Some(text))
            }
            Some(EXIT_NO_SYMBOL) => Ok(None),
            code => Err(format!(
                "zbarimg failed (code {:?}): {}",
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            )),
        }
    }
}
