//! スキャン結果の表示

use crate::error::Result;
use qr_scan_common::{DecodedResult, ScanError, ScannerState};

/// 結果をテキストで整形
///
/// 品目として解釈できればフィールド表、できなければ生テキストのみ
pub fn render_result(result: &DecodedResult) -> String {
    let mut out = String::new();
    match &result.item {
        Some(item) => {
            out.push_str("📦 品目情報\n");
            for (label, value) in item.fields() {
                out.push_str(&format!("  {:<6} {}\n", label, value));
            }
            out.push_str(&format!("  生データ: {}\n", result.raw));
        }
        None => {
            out.push_str("📄 読み取り結果\n");
            out.push_str(&format!("  {}\n", result.raw));
        }
    }
    out
}

pub fn render_error(error: &ScanError) -> String {
    format!("⚠ {}", error)
}

/// 現在の状態を表示
pub fn print_state(state: &ScannerState, json: bool) -> Result<()> {
    if let Some(preview) = state.preview() {
        match preview.dimensions {
            Some((w, h)) => println!("🖼 {} ({}x{})", preview.source, w, h),
            None => println!("🖼 {}", preview.source),
        }
    }

    if let Some(result) = state.result() {
        if json {
            println!("{}", serde_json::to_string_pretty(result)?);
        } else {
            print!("{}", render_result(result));
        }
    }

    if let Some(error) = state.error() {
        eprintln!("{}", render_error(error));
    }
    Ok(())
}
