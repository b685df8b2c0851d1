//! # ideal-crypto
//!
//! AES-128-ECB 暗号プリミティブ実装
//!
//! iDeal LED のコマンドフレームは 16 バイト固定で、AES-128 の 1 ブロックとして
//! そのまま暗号化される。`no_std` 環境（WASM を含む）で動作する。
//!
//! ## 暗号化仕様
//!
//! ```text
//! 平文フレーム (16 bytes) ──AES-128 encrypt_block──▶ 暗号文 (16 bytes)
//!
//! - モード: ECB（IV なし、チェイニングなし、認証タグなし）
//! - 鍵:     デバイスファミリー共通の固定 16 バイト
//! ```
//!
//! 同じ平文は常に同じ暗号文になり、ブロックの破損は他のフレームに伝播しない。
//! デバイスは同じコマンドの再送をそのまま受け付ける。

#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod cipher;
mod error;

pub use cipher::CipherEngine;
pub use error::CryptoError;

/// AES ブロック長（= フレーム長）
pub const BLOCK_LEN: usize = 16;

/// デバイスファミリー共通の AES-128 鍵
///
/// Android アプリから抽出された静的な共有鍵。ネゴシエーションはない。
pub const DEVICE_FAMILY_KEY: [u8; 16] = [
    0x34, 0x52, 0x2A, 0x5B, 0x7A, 0x6E, 0x49, 0x2C, 0x08, 0x09, 0x0A, 0x9D, 0x8D, 0x2A, 0x23, 0xF8,
];

/// Base64 文字列を 16 バイトのキーにデコードする
///
/// URL-safe（パディングなし）と標準形式（パディングあり）の両方を受け付ける。
pub fn decode_base64_key(key_b64: &str) -> Result<[u8; 16], CryptoError> {
    use base64::Engine as _;
    let trimmed = key_b64.trim();
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(trimmed))
        .map_err(|_| CryptoError::InvalidBase64)?;

    key_from_slice(&bytes)
}

/// 任意長のスライスから 16 バイト鍵を取り出す
pub fn key_from_slice(bytes: &[u8]) -> Result<[u8; 16], CryptoError> {
    if bytes.len() != BLOCK_LEN {
        return Err(CryptoError::InvalidKeyLength(bytes.len()));
    }

    let mut key = [0u8; 16];
    key.copy_from_slice(bytes);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_key_valid() {
        // 16バイト = 22文字（URL-safe base64 no-pad）
        let key_b64 = "AAAAAAAAAAAAAAAAAAAAAA"; // 16 zero bytes
        let key = decode_base64_key(key_b64).unwrap();
        assert_eq!(key, [0u8; 16]);
    }

    #[test]
    fn test_decode_base64_key_standard_padded() {
        // 標準 Base64（パディングあり）: デバイスファミリー鍵
        let key = decode_base64_key("NFIqW3puSSwICQqdjSoj+A==").unwrap();
        assert_eq!(key, DEVICE_FAMILY_KEY);
    }

    #[test]
    fn test_decode_base64_key_invalid_length() {
        let key_b64 = "AAAAAAAAAAAAAA"; // 短すぎる
        let result = decode_base64_key(key_b64);
        assert_eq!(result, Err(CryptoError::InvalidKeyLength(10)));
    }

    #[test]
    fn test_decode_base64_key_garbage() {
        assert_eq!(decode_base64_key("%%%"), Err(CryptoError::InvalidBase64));
    }

    #[test]
    fn test_key_from_slice() {
        assert!(key_from_slice(&[0u8; 16]).is_ok());
        assert_eq!(key_from_slice(&[0u8; 24]), Err(CryptoError::InvalidKeyLength(24)));
    }
}
