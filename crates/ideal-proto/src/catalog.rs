//! コマンドカタログ（フレームのバイト配置テーブル）
//!
//! ## 登録済みコマンド
//! ```text
//! PowerSet     05 "TURN"      [5]=on
//! SetLedCount  09 "LAMPN"     [6..8]=count BE, [8..10]=count BE (重複)
//! SetColor     0F "SGLS"      [5]=model [6]=reverse [7]=speed [8]=saturation
//!                             [9..12]=RGB 5bit, [12..15]=RGB 5bit (重複), [15]=0x32
//! PaintLed     0C "GRAFFITI"  [9..11]=index BE, [11..14]=RGB 8bit
//! QueryVersion 03 "VE"        [3]=0 (PCB) / 1 (Firmware)
//! ```
//!
//! リセット・セグメント系のコマンドは動作未確認のため登録しない。

use crate::command::{CommandKind, FieldId};
use crate::FRAME_LEN;

/// フィールドのワイヤ上のエンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    /// 1 バイト（0..=255）
    U8,
    /// 2 バイト big-endian（0..=65535）
    BeU16,
    /// 8 ビット色を 5 ビットに量子化した 1 バイト（`(v >> 3) & 0x1F`）
    Color5,
}

impl FieldEncoding {
    /// 1 スロットあたりのバイト数
    pub const fn width(&self) -> usize {
        match self {
            FieldEncoding::U8 | FieldEncoding::Color5 => 1,
            FieldEncoding::BeU16 => 2,
        }
    }

    /// 受け付ける入力値の最大値
    pub const fn max_value(&self) -> u32 {
        match self {
            FieldEncoding::U8 | FieldEncoding::Color5 => u8::MAX as u32,
            FieldEncoding::BeU16 => u16::MAX as u32,
        }
    }
}

/// 8 ビット色チャンネルを 5 ビットに量子化する
pub const fn color5(value: u8) -> u8 {
    (value >> 3) & 0x1F
}

/// 1 フィールドの配置
///
/// `offsets` の各位置に同じ値を書き込む。2 つ目以降は重複スロット
/// （デバイス側のプロトコル仕様。チェックサムではない）。
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub id: FieldId,
    pub offsets: &'static [usize],
    pub encoding: FieldEncoding,
}

/// 1 コマンドのフレームレイアウト
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub kind: CommandKind,
    /// byte 0（受信側は検証しない）
    pub header: u8,
    /// byte 1 から書き込む ASCII オペコード
    pub opcode: &'static [u8],
    pub fields: &'static [FieldSpec],
    /// 固定値のバイト `(offset, value)`
    pub trailer: &'static [(usize, u8)],
}

impl CommandSpec {
    /// オペコードの直後のオフセット
    pub const fn opcode_end(&self) -> usize {
        1 + self.opcode.len()
    }

    /// オペコードを文字列として返す（ログ用）
    pub fn opcode_str(&self) -> &'static str {
        core::str::from_utf8(self.opcode).unwrap_or("?")
    }
}

/// コマンド種別 → フレームレイアウトのレジストリ
///
/// プロセス起動後は不変。標準テーブルは [`STANDARD_CATALOG`]。
#[derive(Debug, Clone, Copy)]
pub struct CommandCatalog {
    entries: &'static [CommandSpec],
}

impl CommandCatalog {
    /// 任意のテーブルからカタログを作る
    pub const fn new(entries: &'static [CommandSpec]) -> Self {
        CommandCatalog { entries }
    }

    /// 標準カタログ
    pub const fn standard() -> Self {
        CommandCatalog::new(STANDARD_ENTRIES)
    }

    /// 種別に対応するレイアウトを引く
    pub fn lookup(&self, kind: CommandKind) -> Option<&'static CommandSpec> {
        self.entries.iter().find(|spec| spec.kind == kind)
    }

    pub fn entries(&self) -> &'static [CommandSpec] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

const POWER_SET: CommandSpec = CommandSpec {
    kind: CommandKind::PowerSet,
    header: 0x05,
    opcode: b"TURN",
    fields: &[FieldSpec {
        id: FieldId::On,
        offsets: &[5],
        encoding: FieldEncoding::U8,
    }],
    trailer: &[],
};

const SET_LED_COUNT: CommandSpec = CommandSpec {
    kind: CommandKind::SetLedCount,
    header: 0x09,
    opcode: b"LAMPN",
    fields: &[FieldSpec {
        id: FieldId::LedCount,
        offsets: &[6, 8],
        encoding: FieldEncoding::BeU16,
    }],
    trailer: &[],
};

const SET_COLOR: CommandSpec = CommandSpec {
    kind: CommandKind::SetColor,
    header: 0x0F,
    opcode: b"SGLS",
    fields: &[
        FieldSpec { id: FieldId::ModelIndex, offsets: &[5], encoding: FieldEncoding::U8 },
        FieldSpec { id: FieldId::Reverse, offsets: &[6], encoding: FieldEncoding::U8 },
        FieldSpec { id: FieldId::Speed, offsets: &[7], encoding: FieldEncoding::U8 },
        FieldSpec { id: FieldId::Saturation, offsets: &[8], encoding: FieldEncoding::U8 },
        FieldSpec { id: FieldId::Red, offsets: &[9, 12], encoding: FieldEncoding::Color5 },
        FieldSpec { id: FieldId::Green, offsets: &[10, 13], encoding: FieldEncoding::Color5 },
        FieldSpec { id: FieldId::Blue, offsets: &[11, 14], encoding: FieldEncoding::Color5 },
    ],
    trailer: &[(15, 0x32)],
};

const PAINT_LED: CommandSpec = CommandSpec {
    kind: CommandKind::PaintLed,
    header: 0x0C,
    opcode: b"GRAFFITI",
    fields: &[
        FieldSpec { id: FieldId::LedIndex, offsets: &[9], encoding: FieldEncoding::BeU16 },
        FieldSpec { id: FieldId::Red, offsets: &[11], encoding: FieldEncoding::U8 },
        FieldSpec { id: FieldId::Green, offsets: &[12], encoding: FieldEncoding::U8 },
        FieldSpec { id: FieldId::Blue, offsets: &[13], encoding: FieldEncoding::U8 },
    ],
    trailer: &[],
};

const QUERY_VERSION: CommandSpec = CommandSpec {
    kind: CommandKind::QueryVersion,
    header: 0x03,
    opcode: b"VE",
    fields: &[FieldSpec {
        id: FieldId::VersionKind,
        offsets: &[3],
        encoding: FieldEncoding::U8,
    }],
    trailer: &[],
};

const STANDARD_ENTRIES: &[CommandSpec] =
    &[POWER_SET, SET_LED_COUNT, SET_COLOR, PAINT_LED, QUERY_VERSION];

/// 標準コマンドカタログ
pub static STANDARD_CATALOG: CommandCatalog = CommandCatalog::standard();

/// レイアウトがフレーム内に収まり、スロット同士が重ならないか
///
/// `FrameCodec::encode` は書き込み前にこれで行を検査する。
pub fn layout_is_consistent(spec: &CommandSpec) -> bool {
    let mut used = [false; FRAME_LEN];

    let mut claim = |offset: usize, width: usize| -> bool {
        match offset.checked_add(width) {
            Some(end) if end <= FRAME_LEN => {}
            _ => return false,
        }
        for slot in &mut used[offset..offset + width] {
            if *slot {
                return false;
            }
            *slot = true;
        }
        true
    };

    if !claim(0, spec.opcode_end()) {
        return false;
    }
    for field in spec.fields {
        for &offset in field.offsets {
            if !claim(offset, field.encoding.width()) {
                return false;
            }
        }
    }
    for &(offset, _) in spec.trailer {
        if !claim(offset, 1) {
            return false;
        }
    }
    true
}
