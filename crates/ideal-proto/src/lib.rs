//! # ideal-proto
//!
//! iDeal LED コントローラのコマンド定義とコマンドカタログ。
//!
//! ## コマンドフレームの基本構造
//!
//! すべてのコマンドは 16 バイトの平文フレームにエンコードされ、
//! AES-128-ECB で 1 ブロックとして暗号化されてから送信される。
//!
//! ```text
//! [header: u8][opcode: ASCII 2〜8 bytes][fields @ 固定オフセット][0x00 埋め...]
//!  ↑ ペイロード長に近い値（受信側は検証しない）
//! ```
//!
//! ## カタログ方式
//!
//! フレームのバイト配置はすべて [`CommandCatalog`] のテーブルで表現する。
//! 新しいコマンドを追加するときはテーブルの行を追加するだけで、
//! エンコーダ側に分岐を書く必要はない。

#![no_std]
extern crate alloc;

pub mod catalog;
pub mod command;
pub mod gatt;

pub use catalog::{
    layout_is_consistent, CommandCatalog, CommandSpec, FieldEncoding, FieldSpec, STANDARD_CATALOG,
};
pub use command::{Command, CommandKind, FieldId, VersionKind};

/// フレーム長（平文・暗号文とも AES の 1 ブロック）
pub const FRAME_LEN: usize = 16;
