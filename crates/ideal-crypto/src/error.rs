//! 暗号エラー型

/// 暗号操作のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// 鍵の長さが不正（16バイト以外）。値は実際の長さ
    InvalidKeyLength(usize),
    /// Base64 デコードに失敗
    InvalidBase64,
}

impl core::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CryptoError::InvalidKeyLength(len) => {
                write!(f, "Invalid key length: {} bytes (expected 16 bytes)", len)
            }
            CryptoError::InvalidBase64 => write!(f, "Invalid Base64 encoding"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CryptoError {}
