//! テーブル駆動のフレームコーデック
//!
//! ## エンコード手順
//! ```text
//! 1. CommandCatalog から CommandSpec を引く
//! 2. byte 0 = header
//! 3. byte 1.. = opcode (ASCII)
//! 4. 各フィールドを offsets のすべての位置に書き込む（重複スロット）
//!      U8     : 1 byte
//!      BeU16  : 2 bytes big-endian
//!      Color5 : (v >> 3) & 0x1F
//! 5. trailer の固定値を書き込む
//! 6. 残りは 0x00
//! ```
//!
//! コーデックはカタログへの参照以外の状態を持たない。

use ideal_proto::catalog::color5;
use ideal_proto::{layout_is_consistent, Command, CommandCatalog, FieldEncoding, STANDARD_CATALOG};

use crate::error::FrameError;
use crate::event::Event;
use crate::frame::Frame;

/// Command ⇄ Frame / 通知バイト列 → Event の変換器
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    catalog: &'static CommandCatalog,
}

impl FrameCodec {
    /// 任意のカタログでコーデックを作る
    pub const fn new(catalog: &'static CommandCatalog) -> Self {
        FrameCodec { catalog }
    }

    /// 標準カタログのコーデック
    pub const fn standard() -> Self {
        FrameCodec::new(&STANDARD_CATALOG)
    }

    pub fn catalog(&self) -> &'static CommandCatalog {
        self.catalog
    }

    /// コマンドを 16 バイトの平文フレームにエンコードする
    ///
    /// 同じコマンドからは常に同じフレームが得られる。
    ///
    /// # エラー
    /// - `FrameError::UnsupportedCommand`: カタログに該当エントリがない
    /// - `FrameError::InvalidLayout`: エントリがフレーム外を指す、またはスロットが重なる
    /// - `FrameError::FieldOutOfRange`: 値がフィールドのビット幅を超える
    pub fn encode(&self, command: &Command) -> Result<Frame, FrameError> {
        let kind = command.kind();
        let spec = self
            .catalog
            .lookup(kind)
            .ok_or(FrameError::UnsupportedCommand(kind))?;
        if !layout_is_consistent(spec) {
            return Err(FrameError::InvalidLayout(kind));
        }

        let mut bytes = [0u8; Frame::LEN];
        bytes[0] = spec.header;
        bytes[1..spec.opcode_end()].copy_from_slice(spec.opcode);

        for field in spec.fields {
            // レイアウトが要求するフィールドをコマンドが持たない = テーブルの不整合
            let value = command
                .field(field.id)
                .ok_or(FrameError::UnsupportedCommand(kind))?;

            let max = field.encoding.max_value();
            if value > max {
                return Err(FrameError::FieldOutOfRange {
                    command: kind,
                    field: field.id,
                    value,
                    max,
                });
            }

            for &offset in field.offsets {
                match field.encoding {
                    FieldEncoding::U8 => bytes[offset] = value as u8,
                    FieldEncoding::BeU16 => {
                        bytes[offset..offset + 2].copy_from_slice(&(value as u16).to_be_bytes())
                    }
                    FieldEncoding::Color5 => bytes[offset] = color5(value as u8),
                }
            }
        }

        for &(offset, value) in spec.trailer {
            bytes[offset] = value;
        }

        Ok(Frame::new(bytes))
    }

    /// 通知バイト列をイベントとして解釈する
    ///
    /// 未知の形状でも失敗しない。生バイトはそのまま保持される。
    pub fn decode(&self, bytes: &[u8]) -> Event {
        Event::from_raw(bytes)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::standard()
    }
}
