//! 通知イベント
//!
//! 通知ペイロードのスキーマは未確定。イベントは受信したバイト列を保持し、
//! 先頭バイトを数値として読んだ場合の候補を並べるだけで、意味は付けない。
//!
//! ```text
//! raw:       [b0 b1 b2 b3 ...]
//! u16_le  =  b0 | b1 << 8
//! u16_be  =  b0 << 8 | b1
//! u32_le  =  b0 | b1 << 8 | b2 << 16 | b3 << 24
//! u32_be  =  b0 << 24 | b1 << 16 | b2 << 8 | b3
//! ```

use alloc::vec::Vec;
use core::fmt;

use ideal_crypto::CipherEngine;
use ideal_proto::FRAME_LEN;

use crate::frame::HexBytes;

/// デバイスからの通知 1 件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    raw: Vec<u8>,
    plaintext: Option<[u8; FRAME_LEN]>,
}

impl Event {
    /// 受信バイト列をそのまま保持する
    pub fn from_raw(bytes: &[u8]) -> Self {
        Event {
            raw: bytes.to_vec(),
            plaintext: None,
        }
    }

    /// 受信バイト列が 16 バイトなら復号結果も添える
    ///
    /// 長さが合わない場合は復号を試みず `from_raw` と同じになる。
    pub fn decrypt_with(bytes: &[u8], cipher: &CipherEngine) -> Self {
        let event = Self::from_raw(bytes);
        match <[u8; FRAME_LEN]>::try_from(bytes) {
            Ok(block) => event.with_plaintext(cipher.decrypt_block(&block)),
            Err(_) => event,
        }
    }

    pub fn with_plaintext(mut self, plaintext: [u8; FRAME_LEN]) -> Self {
        self.plaintext = Some(plaintext);
        self
    }

    /// 受信したままのバイト列
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn plaintext(&self) -> Option<&[u8; FRAME_LEN]> {
        self.plaintext.as_ref()
    }

    /// 解釈対象のバイト列（復号済みなら平文、なければ生バイト）
    pub fn payload(&self) -> &[u8] {
        match &self.plaintext {
            Some(p) => p,
            None => &self.raw,
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn u16_le(&self) -> Option<u16> {
        self.lead::<2>().map(u16::from_le_bytes)
    }

    pub fn u16_be(&self) -> Option<u16> {
        self.lead::<2>().map(u16::from_be_bytes)
    }

    pub fn u32_le(&self) -> Option<u32> {
        self.lead::<4>().map(u32::from_le_bytes)
    }

    pub fn u32_be(&self) -> Option<u32> {
        self.lead::<4>().map(u32::from_be_bytes)
    }

    /// 数値解釈の候補をまとめて返す
    pub fn interpretations(&self) -> Interpretations {
        Interpretations {
            len: self.payload().len(),
            u16_le: self.u16_le(),
            u16_be: self.u16_be(),
            u32_le: self.u32_le(),
            u32_be: self.u32_be(),
        }
    }

    fn lead<const N: usize>(&self) -> Option<[u8; N]> {
        self.payload().get(..N)?.try_into().ok()
    }
}

/// 先頭バイトの数値解釈候補
///
/// 足りないバイト数の候補は `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interpretations {
    pub len: usize,
    pub u16_le: Option<u16>,
    pub u16_be: Option<u16>,
    pub u32_le: Option<u32>,
    pub u32_be: Option<u32>,
}

/// `len=4 hex=[01 02 03 04] u16le=513 ...` 形式（ログ出力用）
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "len={} hex=[{}]", self.len(), HexBytes(&self.raw))?;
        let i = self.interpretations();
        if let (Some(le), Some(be)) = (i.u16_le, i.u16_be) {
            write!(f, " u16le={} u16be={}", le, be)?;
        }
        if let (Some(le), Some(be)) = (i.u32_le, i.u32_be) {
            write!(f, " u32le={} u32be={}", le, be)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_interpretations_four_bytes() {
        let event = Event::from_raw(&[0x01, 0x02, 0x03, 0x04]);
        let i = event.interpretations();
        assert_eq!(i.len, 4);
        assert_eq!(i.u16_le, Some(0x0201));
        assert_eq!(i.u16_be, Some(0x0102));
        assert_eq!(i.u32_le, Some(0x0403_0201));
        assert_eq!(i.u32_be, Some(0x0102_0304));
    }

    #[test]
    fn test_short_payload_has_no_wide_values() {
        let event = Event::from_raw(&[0xAB, 0xCD, 0xEF]);
        assert_eq!(event.u16_be(), Some(0xABCD));
        assert_eq!(event.u32_le(), None, "3 バイトでは u32 を読めない");

        let one = Event::from_raw(&[0x7F]);
        assert_eq!(one.interpretations().u16_le, None);
    }

    #[test]
    fn test_empty_event() {
        let event = Event::from_raw(&[]);
        assert!(event.is_empty());
        assert_eq!(event.interpretations(), Interpretations::default());
        assert_eq!(event.to_string(), "len=0 hex=[]");
    }

    #[test]
    fn test_decrypt_with_block() {
        let cipher = CipherEngine::device_family();
        let plain: [u8; 16] = [0x03, 0x56, 0x45, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let wire = cipher.encrypt_block(&plain);

        let event = Event::decrypt_with(&wire, &cipher);
        assert_eq!(event.raw(), &wire);
        assert_eq!(event.plaintext(), Some(&plain));
        assert_eq!(event.payload(), &plain);
        assert_eq!(event.u16_be(), Some(0x0356));
    }

    #[test]
    fn test_decrypt_with_wrong_length_keeps_raw() {
        let cipher = CipherEngine::device_family();
        let event = Event::decrypt_with(&[1, 2, 3], &cipher);
        assert_eq!(event.plaintext(), None);
        assert_eq!(event.payload(), &[1, 2, 3]);
    }

    #[test]
    fn test_display() {
        let event = Event::from_raw(&[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(
            event.to_string(),
            "len=4 hex=[01 00 00 00] u16le=1 u16be=256 u32le=1 u32be=16777216"
        );
    }
}
