//! BLE トランスポートの抽象
//!
//! スキャン・接続・ディスカバリ・購読・書き込みは外部の責務。
//! セッションはこのトレイトだけを通してデバイスに触れる。
//! 実装はプラットフォーム側（btleplug ラッパ、モバイルのブリッジ、テスト用モック等）が提供する。

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TransportFault;

/// 接続ハンドル（トランスポートが払い出す不透明な識別子）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionHandle(pub u64);

/// キャラクタリスティックの能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub read: bool,
    pub write: bool,
    pub write_no_response: bool,
    pub notify: bool,
}

impl Capabilities {
    /// いずれかの書き込み方式を受け付けるか
    pub fn writable(&self) -> bool {
        self.write || self.write_no_response
    }
}

/// ディスカバリで見つかったキャラクタリスティック
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredCharacteristic {
    pub service: Uuid,
    pub characteristic: Uuid,
    pub capabilities: Capabilities,
}

/// 通知コールバック。トランスポートの受信コンテキストで呼ばれる
pub type NotificationCallback = Box<dyn Fn(Vec<u8>) + Send + Sync>;

/// プラットフォーム BLE API の抽象
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// アドレス（または OS が与える識別子）で接続する
    async fn attach(&self, address: &str) -> Result<ConnectionHandle, TransportFault>;

    /// 接続先のキャラクタリスティックを列挙する
    async fn discover_endpoints(
        &self,
        handle: ConnectionHandle,
    ) -> Result<Vec<DiscoveredCharacteristic>, TransportFault>;

    /// 1 回書き込む。`with_response` が true なら ATT Write Request、false なら Write Command
    async fn write(
        &self,
        handle: ConnectionHandle,
        characteristic: Uuid,
        bytes: &[u8],
        with_response: bool,
    ) -> Result<(), TransportFault>;

    /// 通知を購読する
    async fn subscribe(
        &self,
        handle: ConnectionHandle,
        characteristic: Uuid,
        callback: NotificationCallback,
    ) -> Result<(), TransportFault>;

    /// 切断する（失敗しても呼び出し側にできることはないため戻り値なし）
    async fn detach(&self, handle: ConnectionHandle);
}
