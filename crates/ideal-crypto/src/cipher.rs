//! AES-128-ECB 暗号エンジン
//!
//! 1 フレーム = 1 ブロック。チェイニングも IV もないため、
//! エンジンは鍵スケジュール以外の状態を持たず、`&self` で何度でも呼べる。

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use crate::error::CryptoError;
use crate::{decode_base64_key, key_from_slice, BLOCK_LEN, DEVICE_FAMILY_KEY};

/// AES-128-ECB 暗号エンジン
///
/// 構築後は不変。ロックなしで複数スレッドから共有できる。
#[derive(Clone)]
pub struct CipherEngine {
    cipher: Aes128,
}

impl CipherEngine {
    /// 任意長のスライスから初期化する
    ///
    /// # エラー
    /// - `CryptoError::InvalidKeyLength`: 鍵長が 16 バイト以外
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let key = key_from_slice(key)?;
        Ok(Self::from_key(key))
    }

    /// 16 バイトの raw 鍵から初期化する
    pub fn from_key(key: [u8; 16]) -> Self {
        CipherEngine {
            cipher: Aes128::new((&key).into()),
        }
    }

    /// デバイスファミリー共通鍵で初期化する
    pub fn device_family() -> Self {
        Self::from_key(DEVICE_FAMILY_KEY)
    }

    /// Base64 エンコードされた 16 バイト鍵から初期化する
    ///
    /// # エラー
    /// - `CryptoError::InvalidBase64`: Base64 デコード失敗
    /// - `CryptoError::InvalidKeyLength`: 鍵長が 16 バイト以外
    pub fn from_base64_key(key_b64: &str) -> Result<Self, CryptoError> {
        let key = decode_base64_key(key_b64)?;
        Ok(Self::from_key(key))
    }

    /// 平文 1 ブロックを暗号化する
    pub fn encrypt_block(&self, plaintext: &[u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
        let mut output = *plaintext;
        self.cipher.encrypt_block((&mut output).into());
        output
    }

    /// 暗号文 1 ブロックを復号する
    pub fn decrypt_block(&self, ciphertext: &[u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
        let mut output = *ciphertext;
        self.cipher.decrypt_block((&mut output).into());
        output
    }
}

impl core::fmt::Debug for CipherEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // 鍵スケジュールは出力しない
        f.debug_struct("CipherEngine").finish_non_exhaustive()
    }
}
