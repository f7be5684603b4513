//! ペイロード解釈
//!
//! デコードしたテキストを「パーセントデコード → JSONパース」して品目レコードに変換する。
//! どの段階で失敗しても `None` を返し、呼び出し側は生テキストを表示する。
//! 部分的なフィールド抽出は行わない。

use crate::types::ParsedItem;
use tracing::debug;

/// テキストを品目レコードとして解釈
///
/// # Examples
/// ```
/// use qr_scan_common::interpret;
///
/// assert!(interpret("Hello").is_none());
/// ```
pub fn interpret(raw: &str) -> Option<ParsedItem> {
    let decoded = match percent_decode(raw) {
        Some(s) => s,
        None => {
            debug!("パーセントデコード失敗、生テキスト表示");
            return None;
        }
    };

    match serde_json::from_str::<ParsedItem>(decoded.trim()) {
        Ok(item) => Some(item),
        Err(e) => {
            debug!("品目レコードとして解釈できません: {}", e);
            None
        }
    }
}

/// URIコンポーネントとしてデコード
///
/// `%` の後に16進2桁が続かない場合や、結果がUTF-8でない場合は `None`。
/// `+` は空白に変換しない。
pub fn percent_decode(raw: &str) -> Option<String> {
    if !is_well_formed(raw) {
        return None;
    }
    urlencoding::decode(raw).ok().map(|s| s.into_owned())
}

fn is_well_formed(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            match hex {
                Some(h) if h.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = r#"{"id":"ITEM-001","code":"A-42","quantity":12,"unit":"箱","location":"倉庫B","period":"2026-10","placement":"棚3段目","description":"交換用 フィルタ"}"#;

    #[test]
    fn test_plain_text_falls_back() {
        assert!(interpret("Hello").is_none());
    }

    #[test]
    fn test_percent_encoded_json() {
        let encoded = urlencoding::encode(ITEM).into_owned();
        assert!(encoded.contains('%'));

        let item = interpret(&encoded).expect("解釈できるはず");
        assert_eq!(item.identifier, "ITEM-001");
        assert_eq!(item.code, "A-42");
        assert_eq!(item.quantity, "12");
        assert_eq!(item.unit, "箱");
        assert_eq!(item.location, "倉庫B");
        assert_eq!(item.period, "2026-10");
        assert_eq!(item.placement, "棚3段目");
        assert_eq!(item.description, "交換用 フィルタ");
    }

    #[test]
    fn test_unencoded_json_is_accepted() {
        assert!(interpret(ITEM).is_some());
    }

    #[test]
    fn test_malformed_percent_sequence() {
        assert!(percent_decode("100%").is_none());
        assert!(percent_decode("%E3%81").is_none()); // UTF-8として不完全
        assert!(percent_decode("%zz").is_none());

        let json_with_percent = ITEM.replace("交換用 フィルタ", "50% off");
        assert!(interpret(&json_with_percent).is_none());
    }

    #[test]
    fn test_plus_is_not_space() {
        assert_eq!(percent_decode("a+b%20c").as_deref(), Some("a+b c"));
    }

    #[test]
    fn test_wrong_shape_falls_back() {
        assert!(interpret("%7B%22id%22%3A%22X%22%7D").is_none()); // {"id":"X"}
        assert!(interpret("[1,2,3]").is_none());
        assert!(interpret("").is_none());
    }
}
