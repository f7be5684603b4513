mod zbar;

pub use zbar::ZbarDecoder;

use crate::config::Config;
use qr_scan_common::{DecodeStrategy, Decoder};

/// 設定からデコーダを構築
///
/// zbarimg（有効時）→ 同梱デコーダ の順に試す
pub fn build_decoder(config: &Config, allow_native: bool) -> Decoder {
    let mut primary: Vec<Box<dyn DecodeStrategy>> = Vec::new();
    if allow_native && config.native_decoder {
        primary.push(Box::new(ZbarDecoder::new(config.zbarimg_path.clone())));
    }
    Decoder::new(primary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_decoder_order() {
        let config = Config::default();
        assert_eq!(build_decoder(&config, true).strategy_names(), vec!["zbarimg", "bundled"]);
        assert_eq!(build_decoder(&config, false).strategy_names(), vec!["bundled"]);

        let config = Config {
            native_decoder: false,
            ..Config::default()
        };
        assert_eq!(build_decoder(&config, true).strategy_names(), vec!["bundled"]);
    }
}
