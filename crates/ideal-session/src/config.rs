//! セッション設定
//!
//! デバイス定数（鍵・UUID・候補順）はコードに埋め込まず、ここで明示的に与える。
//! すべてのフィールドにデフォルトがあるため、JSON では変えたい項目だけ書けばよい。
//!
//! ```json
//! {
//!   "address": "AA:BB:CC:DD:EE:FF",
//!   "key": "NFIqW3puSSwICQqdjSoj+A==",
//!   "probe_backoff_ms": 250
//! }
//! ```

use std::time::Duration;

use ideal_crypto::CipherEngine;
use ideal_proto::{gatt, Command, VersionKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProtocolError;

/// 候補エンドポイントの確認に送るコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeCommand {
    /// ファームウェアバージョン問い合わせ（状態を変えない）
    FirmwareVersion,
    PcbVersion,
    /// 電源 ON（見た目で確認できるが状態を変える）
    PowerOn,
}

impl ProbeCommand {
    pub fn to_command(self) -> Command {
        match self {
            ProbeCommand::FirmwareVersion => Command::QueryVersion {
                kind: VersionKind::Firmware,
            },
            ProbeCommand::PcbVersion => Command::QueryVersion {
                kind: VersionKind::Pcb,
            },
            ProbeCommand::PowerOn => Command::PowerSet { on: true },
        }
    }
}

/// [`crate::DeviceSession`] の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// トランスポートに渡す接続先
    pub address: String,
    /// Base64 の鍵（省略時はデバイスファミリー共通鍵）
    pub key: Option<String>,
    /// プライマリサービス。ディスカバリ結果はこの配下だけを見る
    pub service: Uuid,
    /// コマンド書き込みの候補（優先順）
    pub command_candidates: Vec<Uuid>,
    pub notify: Uuid,
    pub data_write: Option<Uuid>,
    pub subscribe_notifications: bool,
    /// 通知を 16 バイトブロックとして復号してからイベントにする
    pub decrypt_notifications: bool,
    /// false なら常に Write Command（応答なし）で書く
    pub prefer_write_with_response: bool,
    /// 候補の確認に失敗してから次を試すまでの待ち時間
    pub probe_backoff_ms: u64,
    pub probe: ProbeCommand,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            address: String::new(),
            key: None,
            service: Uuid::from_u128(gatt::SERVICE_UUID),
            command_candidates: gatt::COMMAND_WRITE_CANDIDATES
                .iter()
                .map(|&v| Uuid::from_u128(v))
                .collect(),
            notify: Uuid::from_u128(gatt::NOTIFY_UUID),
            data_write: Some(Uuid::from_u128(gatt::DATA_WRITE_UUID)),
            subscribe_notifications: true,
            decrypt_notifications: false,
            prefer_write_with_response: true,
            probe_backoff_ms: 200,
            probe: ProbeCommand::FirmwareVersion,
        }
    }
}

impl SessionConfig {
    /// 接続先だけ指定し、残りはデフォルト
    pub fn for_address(address: impl Into<String>) -> Self {
        SessionConfig {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn probe_backoff(&self) -> Duration {
        Duration::from_millis(self.probe_backoff_ms)
    }

    /// 設定された鍵で暗号エンジンを作る
    ///
    /// # エラー
    /// - `ProtocolError::InvalidKeyEncoding`: Base64 として読めない
    /// - `ProtocolError::InvalidKeyLength`: 16 バイトでない
    pub fn cipher(&self) -> Result<CipherEngine, ProtocolError> {
        match &self.key {
            Some(key) => Ok(CipherEngine::from_base64_key(key)?),
            None => Ok(CipherEngine::device_family()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::for_address("AA:BB:CC:DD:EE:FF");
        assert_eq!(config.address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(config.command_candidates.len(), 3);
        assert_eq!(
            config.command_candidates[0].to_string(),
            "d44bc439-abfd-45a2-b575-925416129600"
        );
        assert_eq!(config.notify.to_string(), "d44bc439-abfd-45a2-b575-925416129601");
        assert_eq!(config.service.to_string(), "0000fff0-0000-1000-8000-00805f9b34fb");
        assert!(config.prefer_write_with_response);
        assert!(!config.decrypt_notifications, "通知はデフォルトで復号しない");
        assert_eq!(config.probe, ProbeCommand::FirmwareVersion);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SessionConfig::from_json(
            r#"{
                "address": "lamp-1",
                "probe_backoff_ms": 0,
                "command_candidates": ["d44bc439-abfd-45a2-b575-92541612960b"],
                "probe": "power_on"
            }"#,
        )
        .unwrap();
        assert_eq!(config.address, "lamp-1");
        assert_eq!(config.probe_backoff(), Duration::ZERO);
        assert_eq!(config.command_candidates.len(), 1);
        assert_eq!(config.probe, ProbeCommand::PowerOn);
        // 書かなかった項目はデフォルト
        assert_eq!(config.notify, Uuid::from_u128(gatt::NOTIFY_UUID));
        assert!(config.subscribe_notifications);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = SessionConfig::for_address("lamp-2");
        config.key = Some("NFIqW3puSSwICQqdjSoj+A==".into());
        config.data_write = None;
        let json = config.to_json().unwrap();
        assert_eq!(SessionConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_bad_uuid() {
        assert!(SessionConfig::from_json(r#"{"notify": "not-a-uuid"}"#).is_err());
    }

    #[test]
    fn test_cipher_from_key() {
        let mut config = SessionConfig::default();
        assert!(config.cipher().is_ok(), "鍵なしはファミリー共通鍵");

        config.key = Some("NFIqW3puSSwICQqdjSoj+A==".into());
        assert!(config.cipher().is_ok());

        config.key = Some("AAAA".into());
        assert_eq!(config.cipher().unwrap_err(), ProtocolError::InvalidKeyLength(3));

        config.key = Some("***".into());
        assert_eq!(config.cipher().unwrap_err(), ProtocolError::InvalidKeyEncoding);
    }

    #[test]
    fn test_probe_commands() {
        assert_eq!(
            ProbeCommand::PcbVersion.to_command(),
            Command::QueryVersion { kind: VersionKind::Pcb }
        );
        assert_eq!(ProbeCommand::PowerOn.to_command(), Command::PowerSet { on: true });
    }
}
