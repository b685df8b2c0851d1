//! # ideal-frame
//!
//! フレーム層の実装。
//!
//! 高レベルの [`ideal_proto::Command`] を 16 バイトの平文フレームに変換し、
//! AES-128-ECB で 1 ブロックの暗号文にする。受信方向では通知バイト列を
//! [`Event`] として非破壊的に解釈する。
//!
//! ## 送信方向
//!
//! ```text
//! Command ──FrameCodec::encode──▶ Frame (16 bytes 平文)
//!         ──Frame::seal──────────▶ EncryptedFrame (16 bytes 暗号文) ──▶ GATT write
//! ```
//!
//! ## 受信方向
//!
//! ```text
//! GATT notify ──(任意: CipherEngine で復号)──▶ FrameCodec::decode ──▶ Event
//! ```
//!
//! 通知ペイロードのスキーマは確定していないため、`Event` は生バイトと
//! 数値としての解釈候補（u16/u32 の LE/BE）を並べるだけで、意味は主張しない。

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod codec;
pub mod error;
pub mod event;
pub mod frame;

pub use codec::FrameCodec;
pub use error::FrameError;
pub use event::{Event, Interpretations};
pub use frame::{EncryptedFrame, Frame, HexBytes};
