//! アップロードファイルの検証

use crate::error::{Result, ScanError};

/// ファイル選択時のaccept属性
pub const ACCEPT_IMAGES: &str = "image/*";

/// 宣言されたMIMEタイプが画像か検証
///
/// デコードを試す前に呼ぶこと。空のMIMEタイプも拒否する。
pub fn validate_image_type(mime: &str) -> Result<()> {
    let mime = mime.trim();
    if is_image_type(mime) {
        Ok(())
    } else if mime.is_empty() {
        Err(ScanError::InvalidFileType("不明".into()))
    } else {
        Err(ScanError::InvalidFileType(mime.to_string()))
    }
}

fn is_image_type(mime: &str) -> bool {
    mime.len() > "image/".len()
        && mime
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_types_accepted() {
        assert!(validate_image_type("image/png").is_ok());
        assert!(validate_image_type("image/jpeg").is_ok());
        assert!(validate_image_type("IMAGE/WEBP").is_ok());
        assert!(validate_image_type(" image/gif ").is_ok());
    }

    #[test]
    fn test_non_image_rejected() {
        assert_eq!(
            validate_image_type("text/plain"),
            Err(ScanError::InvalidFileType("text/plain".into()))
        );
        assert!(validate_image_type("application/pdf").is_err());
        assert!(validate_image_type("image/").is_err());
        assert!(validate_image_type("imagex/png").is_err());
    }

    #[test]
    fn test_empty_type_rejected() {
        assert_eq!(
            validate_image_type(""),
            Err(ScanError::InvalidFileType("不明".into()))
        );
    }
}
