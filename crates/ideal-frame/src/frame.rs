//! 16 バイトのフレーム構造
//!
//! ## Wire Format
//! ```text
//! [plaintext: 16 bytes] ──AES-128-ECB──▶ [ciphertext: 16 bytes]
//! ↑ 長さは常に 16。短い入力は右側を 0x00 で埋め、長い入力は 16 バイトで切り捨てる
//! ```

use core::fmt;

use ideal_crypto::CipherEngine;
use ideal_proto::FRAME_LEN;

use crate::error::FrameError;

/// 平文フレーム（常に 16 バイト）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// フレーム長
    pub const LEN: usize = FRAME_LEN;

    /// 16 バイト配列からフレームを作る
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Frame(bytes)
    }

    /// 任意長のバイト列からフレームを作る
    ///
    /// 16 バイト未満は右側をゼロ埋め、超過分は切り捨てる（情報が失われる）。
    /// 既存デバイスとの互換のためこの挙動を維持する。
    pub fn from_bytes_lossy(bytes: &[u8]) -> Self {
        let mut frame = [0u8; FRAME_LEN];
        let n = bytes.len().min(FRAME_LEN);
        frame[..n].copy_from_slice(&bytes[..n]);
        Frame(frame)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; FRAME_LEN] {
        self.0
    }

    /// byte 0（ヘッダー）
    pub fn header(&self) -> u8 {
        self.0[0]
    }

    /// 1 ブロックとして暗号化する
    pub fn seal(&self, cipher: &CipherEngine) -> EncryptedFrame {
        EncryptedFrame(cipher.encrypt_block(&self.0))
    }
}

impl From<[u8; FRAME_LEN]> for Frame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Frame(bytes)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// `05 54 55 52 4E 01 00 ...` 形式（ログ出力用）
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&HexBytes(&self.0), f)
    }
}

/// 暗号化済みフレーム（1 平文フレームに 1 対 1 で対応）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncryptedFrame([u8; FRAME_LEN]);

impl EncryptedFrame {
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        EncryptedFrame(bytes)
    }

    /// 受信したバイト列を暗号文フレームとして解釈する
    ///
    /// # エラー
    /// - `FrameError::WrongLength`: 16 バイトでない
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FrameError> {
        let block: [u8; FRAME_LEN] = bytes.try_into().map_err(|_| FrameError::WrongLength {
            expected: FRAME_LEN,
            actual: bytes.len(),
        })?;
        Ok(EncryptedFrame(block))
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; FRAME_LEN] {
        self.0
    }

    /// 復号して平文フレームに戻す
    pub fn open(&self, cipher: &CipherEngine) -> Frame {
        Frame(cipher.decrypt_block(&self.0))
    }
}

impl AsRef<[u8]> for EncryptedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for EncryptedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&HexBytes(&self.0), f)
    }
}

/// バイト列を `0A FF ...`（大文字、空白区切り）で表示するラッパー
///
/// フレーム・通知・wasm の JSON 出力で同じ表記を使う。
#[derive(Debug, Clone, Copy)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}
