//! 高レベルのコマンド定義
//!
//! 各バリアントはワイヤ上にエンコードされるフィールドだけを持つ。
//! どのフィールドがどのオフセットに書かれるかは [`crate::catalog`] が決める。

use core::fmt;

/// バージョン問い合わせの対象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionKind {
    /// 基板 (PCB) バージョン
    Pcb = 0,
    /// ファームウェアバージョン
    Firmware = 1,
}

/// デバイスに送るコマンド
///
/// `count` / `index` はワイヤ上 16 ビットだが、範囲外の要求も表現できるように
/// `u32` で保持する。範囲チェックはエンコード時に行われる
/// （65536 以上は `FieldOutOfRange`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// 電源 ON/OFF（`TURN`）
    PowerSet { on: bool },
    /// 有効 LED 数の設定（`LAMPN`）
    SetLedCount { count: u32 },
    /// 色とモードの設定（`SGLS`）
    ///
    /// 色は送信時に 5 ビットへ量子化される。
    SetColor {
        r: u8,
        g: u8,
        b: u8,
        model_index: u8,
        reverse: bool,
        speed: u8,
        saturation: u8,
    },
    /// 個別 LED の塗りつぶし（`GRAFFITI`、色は 8 ビットのまま）
    PaintLed { index: u32, r: u8, g: u8, b: u8 },
    /// バージョン問い合わせ（`VE`）。応答は通知で返る
    QueryVersion { kind: VersionKind },
}

/// SGLS テンプレートのデフォルト速度
pub const DEFAULT_SPEED: u8 = 0x64;

/// SGLS テンプレートのデフォルト彩度
pub const DEFAULT_SATURATION: u8 = 0x50;

impl Command {
    /// 単色表示（model 0 / reverse なし / speed 100 / saturation 80）
    pub fn solid_color(r: u8, g: u8, b: u8) -> Self {
        Command::SetColor {
            r,
            g,
            b,
            model_index: 0,
            reverse: false,
            speed: DEFAULT_SPEED,
            saturation: DEFAULT_SATURATION,
        }
    }

    /// カタログ検索用の種別
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::PowerSet { .. } => CommandKind::PowerSet,
            Command::SetLedCount { .. } => CommandKind::SetLedCount,
            Command::SetColor { .. } => CommandKind::SetColor,
            Command::PaintLed { .. } => CommandKind::PaintLed,
            Command::QueryVersion { .. } => CommandKind::QueryVersion,
        }
    }

    /// フィールド値を数値として返す（bool は 0/1）
    ///
    /// このコマンドが持たないフィールドなら `None`。
    pub fn field(&self, id: FieldId) -> Option<u32> {
        let value = match (*self, id) {
            (Command::PowerSet { on }, FieldId::On) => on as u32,

            (Command::SetLedCount { count }, FieldId::LedCount) => count,

            (Command::SetColor { model_index, .. }, FieldId::ModelIndex) => model_index as u32,
            (Command::SetColor { reverse, .. }, FieldId::Reverse) => reverse as u32,
            (Command::SetColor { speed, .. }, FieldId::Speed) => speed as u32,
            (Command::SetColor { saturation, .. }, FieldId::Saturation) => saturation as u32,
            (Command::SetColor { r, .. }, FieldId::Red)
            | (Command::PaintLed { r, .. }, FieldId::Red) => r as u32,
            (Command::SetColor { g, .. }, FieldId::Green)
            | (Command::PaintLed { g, .. }, FieldId::Green) => g as u32,
            (Command::SetColor { b, .. }, FieldId::Blue)
            | (Command::PaintLed { b, .. }, FieldId::Blue) => b as u32,

            (Command::PaintLed { index, .. }, FieldId::LedIndex) => index,

            (Command::QueryVersion { kind }, FieldId::VersionKind) => kind as u32,

            _ => return None,
        };
        Some(value)
    }
}

/// コマンド種別（フィールドを持たない判別子）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    PowerSet,
    SetLedCount,
    SetColor,
    PaintLed,
    QueryVersion,
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::PowerSet => "PowerSet",
            CommandKind::SetLedCount => "SetLedCount",
            CommandKind::SetColor => "SetColor",
            CommandKind::PaintLed => "PaintLed",
            CommandKind::QueryVersion => "QueryVersion",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// エンコード対象のフィールド名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    On,
    LedCount,
    ModelIndex,
    Reverse,
    Speed,
    Saturation,
    Red,
    Green,
    Blue,
    LedIndex,
    VersionKind,
}

impl FieldId {
    pub fn name(&self) -> &'static str {
        match self {
            FieldId::On => "on",
            FieldId::LedCount => "count",
            FieldId::ModelIndex => "model_index",
            FieldId::Reverse => "reverse",
            FieldId::Speed => "speed",
            FieldId::Saturation => "saturation",
            FieldId::Red => "r",
            FieldId::Green => "g",
            FieldId::Blue => "b",
            FieldId::LedIndex => "index",
            FieldId::VersionKind => "kind",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
