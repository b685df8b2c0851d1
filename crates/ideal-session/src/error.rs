//! ideal-session エラー型
//!
//! ```text
//! SessionError
//!  ├─ Transport(TransportError)   BLE 操作の失敗（どの操作・どのエンドポイント・どのコマンドか）
//!  ├─ Protocol(ProtocolError)     エンコード / 鍵の問題（送信前に検出）
//!  └─ State(SessionStateError)    状態遷移として不正な呼び出し
//! ```

use std::fmt;

use ideal_crypto::CryptoError;
use ideal_frame::FrameError;
use ideal_proto::{CommandKind, FieldId};
use thiserror::Error;
use uuid::Uuid;

use crate::endpoint::EndpointKind;

/// トランスポート実装が返す失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFault {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("discovery failed: {0}")]
    Discovery(String),
    #[error("write failed: {0}")]
    Write(String),
    #[error("subscribe failed: {0}")]
    Subscribe(String),
}

/// 失敗したセッション操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Attach,
    Discover,
    Probe,
    Write,
    Subscribe,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Attach => "attach",
            Operation::Discover => "discover",
            Operation::Probe => "probe",
            Operation::Write => "write",
            Operation::Subscribe => "subscribe",
        })
    }
}

/// 文脈付きのトランスポートエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed{}: {source}", context(.endpoint, .command))]
pub struct TransportError {
    pub operation: Operation,
    pub endpoint: Option<Uuid>,
    pub command: Option<CommandKind>,
    pub source: TransportFault,
}

impl TransportError {
    pub fn new(operation: Operation, source: TransportFault) -> Self {
        TransportError {
            operation,
            endpoint: None,
            command: None,
            source,
        }
    }

    pub fn at(mut self, endpoint: Uuid) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn during(mut self, command: CommandKind) -> Self {
        self.command = Some(command);
        self
    }
}

fn context(endpoint: &Option<Uuid>, command: &Option<CommandKind>) -> String {
    match (endpoint, command) {
        (Some(e), Some(c)) => format!(" ({} on {})", c, e),
        (Some(e), None) => format!(" (on {})", e),
        (None, Some(c)) => format!(" ({})", c),
        (None, None) => String::new(),
    }
}

/// エンコード・鍵に関するエラー（デバイスには何も書かれていない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unsupported command: no catalog entry for {0}")]
    UnsupportedCommand(CommandKind),
    #[error("invalid layout: catalog entry for {0} does not fit a frame")]
    InvalidLayout(CommandKind),
    #[error("field out of range: {command}.{field} = {value} (max {max})")]
    FieldOutOfRange {
        command: CommandKind,
        field: FieldId,
        value: u32,
        max: u32,
    },
    #[error("invalid key length: {0} bytes (expected 16)")]
    InvalidKeyLength(usize),
    #[error("invalid key encoding: expected base64")]
    InvalidKeyEncoding,
    #[error("wrong frame length: {actual} bytes (expected {expected})")]
    WrongFrameLength { expected: usize, actual: usize },
}

impl From<FrameError> for ProtocolError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::UnsupportedCommand(kind) => ProtocolError::UnsupportedCommand(kind),
            FrameError::InvalidLayout(kind) => ProtocolError::InvalidLayout(kind),
            FrameError::FieldOutOfRange {
                command,
                field,
                value,
                max,
            } => ProtocolError::FieldOutOfRange {
                command,
                field,
                value,
                max,
            },
            FrameError::WrongLength { expected, actual } => {
                ProtocolError::WrongFrameLength { expected, actual }
            }
        }
    }
}

impl From<CryptoError> for ProtocolError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidKeyLength(len) => ProtocolError::InvalidKeyLength(len),
            CryptoError::InvalidBase64 => ProtocolError::InvalidKeyEncoding,
        }
    }
}

/// 現在の状態では受け付けられない呼び出し
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionStateError {
    #[error("session busy: a write is already in flight")]
    SessionBusy,
    #[error("session is not attached")]
    NotAttached,
    #[error("session is closed")]
    AlreadyClosed,
    #[error("session is already attached")]
    AlreadyAttached,
    #[error("endpoint unavailable: {0}")]
    EndpointUnavailable(EndpointKind),
}

/// セッション API の統合エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    State(#[from] SessionStateError),
}

impl SessionError {
    /// 状態エラーなら取り出す
    pub fn state(&self) -> Option<SessionStateError> {
        match self {
            SessionError::State(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        SessionError::Protocol(err.into())
    }
}

impl From<CryptoError> for SessionError {
    fn from(err: CryptoError) -> Self {
        SessionError::Protocol(err.into())
    }
}
