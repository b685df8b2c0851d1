//! ideal-frame エラー型

use ideal_proto::{CommandKind, FieldId};

/// フレーム層のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// カタログに該当するレイアウトがない
    /// （またはレイアウトが要求するフィールドをコマンドが持たない）
    UnsupportedCommand(CommandKind),
    /// カタログ行がフレームに収まらない、またはスロットが重なる
    InvalidLayout(CommandKind),
    /// フィールド値がエンコーディングのビット幅に収まらない
    FieldOutOfRange {
        command: CommandKind,
        field: FieldId,
        value: u32,
        max: u32,
    },
    /// 暗号文フレームの長さが 16 バイトでない
    WrongLength { expected: usize, actual: usize },
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::UnsupportedCommand(kind) => {
                write!(f, "Unsupported command: no catalog entry for {}", kind)
            }
            FrameError::InvalidLayout(kind) => {
                write!(f, "Invalid layout: catalog entry for {} does not fit a frame", kind)
            }
            FrameError::FieldOutOfRange { command, field, value, max } => write!(
                f,
                "Field out of range: {}.{} = {} (max {})",
                command, field, value, max
            ),
            FrameError::WrongLength { expected, actual } => {
                write!(f, "Wrong frame length: {} bytes (expected {})", actual, expected)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}
