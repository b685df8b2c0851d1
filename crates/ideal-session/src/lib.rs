//! # ideal-session
//!
//! 1 台の iDeal LED コントローラとのセッション。
//!
//! BLE そのもの（スキャン・接続・GATT 操作）は [`TransportPort`] の実装に任せ、
//! このクレートはその上で次を担当する。
//!
//! - **エンドポイント確定**: コマンド書き込みの候補 UUID を優先順に確認し、最初に書けたものを使う
//! - **送信の直列化**: 書き込みは同時に 1 つ。`send` は待ち、`try_send` は `SessionBusy`
//! - **書き込み方式**: 応答ありを試し、拒否されたら応答なしで書き直す
//! - **通知配送**: 通知を [`Event`](ideal_frame::Event) にしてハンドラへ渡す
//!
//! ## 送信の流れ
//!
//! ```text
//! DeviceSession::send(Command)
//!   └─ FrameCodec::encode ─▶ Frame ─▶ Frame::seal(CipherEngine) ─▶ EncryptedFrame
//!        └─ TransportPort::write(handle, command-write UUID, 16 bytes, with_response)
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod session;
pub mod sweep;
pub mod transport;

pub use config::{ProbeCommand, SessionConfig};
pub use endpoint::{Candidacy, EndpointKind, EndpointSet};
pub use error::{
    Operation, ProtocolError, SessionError, SessionStateError, TransportError, TransportFault,
};
pub use session::{
    AttachReport, DeviceSession, EventHandler, ProbeAttempt, ProbeOutcome, SendReport,
    SessionState, SessionStats, WriteMode,
};
pub use sweep::{CommandSweep, SweepOutcome, SweepStep};
pub use transport::{
    Capabilities, ConnectionHandle, DiscoveredCharacteristic, NotificationCallback, TransportPort,
};

pub use ideal_frame::Event;
pub use ideal_proto::{Command, VersionKind};
