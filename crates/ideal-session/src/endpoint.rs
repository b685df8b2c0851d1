//! 論理エンドポイントと具体的な UUID の対応付け
//!
//! ```text
//! CommandWrite ─▶ 候補 [..9600, ..960b, ..960a] のうち最初に書き込めたもの
//! Notify       ─▶ ..9601
//! DataWrite    ─▶ ..960a（書き込み可能で、CommandWrite と別の場合のみ）
//! ```

use std::fmt;

use uuid::Uuid;

use crate::transport::DiscoveredCharacteristic;

/// 論理エンドポイント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    CommandWrite,
    Notify,
    DataWrite,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndpointKind::CommandWrite => "command-write",
            EndpointKind::Notify => "notify",
            EndpointKind::DataWrite => "data-write",
        })
    }
}

/// attach で確定したエンドポイント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSet {
    pub command_write: Uuid,
    /// 購読済みの通知キャラクタリスティック
    pub notify: Option<Uuid>,
    pub data_write: Option<Uuid>,
}

impl EndpointSet {
    /// 書き込み先として使える UUID
    ///
    /// `Notify` は書き込み先ではないので常に `None`。
    pub fn writable(&self, kind: EndpointKind) -> Option<Uuid> {
        match kind {
            EndpointKind::CommandWrite => Some(self.command_write),
            EndpointKind::DataWrite => self.data_write,
            EndpointKind::Notify => None,
        }
    }
}

/// 候補に対するディスカバリ結果の判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidacy {
    /// 書き込み可能として広告されている
    Advertised,
    /// ディスカバリに出てこない（ディスカバリが不完全な場合があるため試す）
    Unlisted,
    /// 広告されているが書き込み能力がない。試さない
    NotWritable,
}

impl Candidacy {
    pub fn should_probe(&self) -> bool {
        !matches!(self, Candidacy::NotWritable)
    }
}

/// 指定サービス配下のキャラクタリスティックだけを残す
///
/// 別サービスに同じ UUID があっても候補判定には使わない。
pub fn in_service(
    discovered: Vec<DiscoveredCharacteristic>,
    service: Uuid,
) -> Vec<DiscoveredCharacteristic> {
    discovered.into_iter().filter(|c| c.service == service).collect()
}

/// UUID でディスカバリ結果を引く
pub fn find(discovered: &[DiscoveredCharacteristic], uuid: Uuid) -> Option<&DiscoveredCharacteristic> {
    discovered.iter().find(|c| c.characteristic == uuid)
}

/// 候補を優先順のまま判定する
pub fn plan_candidates(
    candidates: &[Uuid],
    discovered: &[DiscoveredCharacteristic],
) -> Vec<(Uuid, Candidacy)> {
    candidates
        .iter()
        .map(|&uuid| {
            let candidacy = match find(discovered, uuid) {
                Some(c) if c.capabilities.writable() => Candidacy::Advertised,
                Some(_) => Candidacy::NotWritable,
                None => Candidacy::Unlisted,
            };
            (uuid, candidacy)
        })
        .collect()
}

/// データ書き込みエンドポイントを決める
///
/// 書き込み可能として広告されていて、コマンド書き込みと別の UUID の場合だけ採用する。
pub fn resolve_data_write(
    data_write: Option<Uuid>,
    command_write: Uuid,
    discovered: &[DiscoveredCharacteristic],
) -> Option<Uuid> {
    let uuid = data_write?;
    if uuid == command_write {
        return None;
    }
    find(discovered, uuid)
        .filter(|c| c.capabilities.writable())
        .map(|c| c.characteristic)
}

/// 通知の購読を試みるべきか
///
/// 通知能力なしと明示的に広告されている場合だけ見送る。
pub fn should_subscribe(notify: Uuid, discovered: &[DiscoveredCharacteristic]) -> bool {
    find(discovered, notify).map_or(true, |c| c.capabilities.notify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Capabilities;
    use ideal_proto::gatt;

    fn uuid(v: u128) -> Uuid {
        Uuid::from_u128(v)
    }

    fn characteristic(v: u128, capabilities: Capabilities) -> DiscoveredCharacteristic {
        DiscoveredCharacteristic {
            service: uuid(gatt::SERVICE_UUID),
            characteristic: uuid(v),
            capabilities,
        }
    }

    const WRITE: Capabilities = Capabilities {
        read: false,
        write: true,
        write_no_response: true,
        notify: false,
    };

    const READ_ONLY: Capabilities = Capabilities {
        read: true,
        write: false,
        write_no_response: false,
        notify: false,
    };

    #[test]
    fn test_plan_keeps_priority_order() {
        let candidates: Vec<Uuid> = gatt::COMMAND_WRITE_CANDIDATES.iter().map(|&v| uuid(v)).collect();
        let discovered = vec![
            characteristic(gatt::DATA_WRITE_UUID, WRITE),
            characteristic(gatt::COMMAND_WRITE_UUID, READ_ONLY),
        ];

        let plan = plan_candidates(&candidates, &discovered);
        assert_eq!(
            plan,
            vec![
                (uuid(gatt::COMMAND_WRITE_UUID), Candidacy::NotWritable),
                (uuid(gatt::COMMAND_WRITE_ALT_B_UUID), Candidacy::Unlisted),
                (uuid(gatt::DATA_WRITE_UUID), Candidacy::Advertised),
            ]
        );
        assert!(!plan[0].1.should_probe(), "書き込み不可と広告された候補は試さない");
        assert!(plan[1].1.should_probe());
    }

    #[test]
    fn test_data_write_resolution() {
        let discovered = vec![characteristic(gatt::DATA_WRITE_UUID, WRITE)];
        let data = Some(uuid(gatt::DATA_WRITE_UUID));

        assert_eq!(
            resolve_data_write(data, uuid(gatt::COMMAND_WRITE_UUID), &discovered),
            data
        );
        // コマンド書き込みと同じなら別エンドポイントとして扱わない
        assert_eq!(
            resolve_data_write(data, uuid(gatt::DATA_WRITE_UUID), &discovered),
            None
        );
        // 広告されていなければ採用しない
        assert_eq!(resolve_data_write(data, uuid(gatt::COMMAND_WRITE_UUID), &[]), None);
        assert_eq!(resolve_data_write(None, uuid(gatt::COMMAND_WRITE_UUID), &discovered), None);
    }

    #[test]
    fn test_in_service_drops_foreign_characteristics() {
        let foreign = DiscoveredCharacteristic {
            service: uuid(0x0000_180a_0000_1000_8000_00805f9b34fb),
            characteristic: uuid(gatt::COMMAND_WRITE_UUID),
            capabilities: READ_ONLY,
        };
        let own = characteristic(gatt::COMMAND_WRITE_UUID, WRITE);

        let scoped = in_service(vec![foreign, own.clone()], uuid(gatt::SERVICE_UUID));
        assert_eq!(scoped, vec![own]);
        assert_eq!(
            plan_candidates(&[uuid(gatt::COMMAND_WRITE_UUID)], &scoped),
            vec![(uuid(gatt::COMMAND_WRITE_UUID), Candidacy::Advertised)]
        );
    }

    #[test]
    fn test_should_subscribe() {
        let notify = uuid(gatt::NOTIFY_UUID);
        assert!(should_subscribe(notify, &[]), "未掲載なら試す");
        assert!(!should_subscribe(notify, &[characteristic(gatt::NOTIFY_UUID, READ_ONLY)]));
        let mut caps = READ_ONLY;
        caps.notify = true;
        assert!(should_subscribe(notify, &[characteristic(gatt::NOTIFY_UUID, caps)]));
    }

    #[test]
    fn test_endpoint_set_writable() {
        let set = EndpointSet {
            command_write: uuid(gatt::COMMAND_WRITE_UUID),
            notify: Some(uuid(gatt::NOTIFY_UUID)),
            data_write: None,
        };
        assert_eq!(set.writable(EndpointKind::CommandWrite), Some(uuid(gatt::COMMAND_WRITE_UUID)));
        assert_eq!(set.writable(EndpointKind::DataWrite), None);
        assert_eq!(set.writable(EndpointKind::Notify), None);
    }
}
