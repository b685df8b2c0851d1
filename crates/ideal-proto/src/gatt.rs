//! GATT 識別子（128 ビット UUID を `u128` で保持する）
//!
//! コマンド書き込みキャラクタリスティックは個体・ファームウェアによって
//! 末尾が異なるものが観測されている。いずれも同じ論理エンドポイントの候補として扱う。

/// プライマリサービス `0000fff0-0000-1000-8000-00805f9b34fb`
pub const SERVICE_UUID: u128 = 0x0000_fff0_0000_1000_8000_00805f9b34fb;

/// コマンド書き込み `d44bc439-abfd-45a2-b575-925416129600`
pub const COMMAND_WRITE_UUID: u128 = 0xd44b_c439_abfd_45a2_b575_925416129600;

/// コマンド書き込みの別系統（末尾 `0b`）
pub const COMMAND_WRITE_ALT_B_UUID: u128 = 0xd44b_c439_abfd_45a2_b575_92541612960b;

/// データ書き込み（末尾 `0a`）。コマンド書き込みの最終候補も兼ねる
pub const DATA_WRITE_UUID: u128 = 0xd44b_c439_abfd_45a2_b575_92541612960a;

/// 通知 `d44bc439-abfd-45a2-b575-925416129601`
pub const NOTIFY_UUID: u128 = 0xd44b_c439_abfd_45a2_b575_925416129601;

/// コマンド書き込み候補（優先順）
pub const COMMAND_WRITE_CANDIDATES: [u128; 3] =
    [COMMAND_WRITE_UUID, COMMAND_WRITE_ALT_B_UUID, DATA_WRITE_UUID];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_share_family_prefix() {
        // 末尾 1 バイト以外は同じファミリー
        for uuid in COMMAND_WRITE_CANDIDATES {
            assert_eq!(uuid >> 8, COMMAND_WRITE_UUID >> 8);
        }
        assert_eq!(NOTIFY_UUID >> 16, COMMAND_WRITE_UUID >> 16);
    }

    #[test]
    fn test_primary_candidate_first() {
        assert_eq!(COMMAND_WRITE_CANDIDATES[0], COMMAND_WRITE_UUID);
    }
}
