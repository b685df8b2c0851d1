//! LampCodec wasm-bindgen エクスポート
//!
//! Web Bluetooth 側（JS）が接続と GATT 操作を持ち、こちらはフレームの
//! 生成（エンコード + 暗号化）と通知の解釈だけを担当する。
//!
//! ## 内部アーキテクチャ
//!
//! ```text
//! LampCodec
//!   ├── FrameCodec   (ideal-frame)  - Command → 16 バイト平文
//!   └── CipherEngine (ideal-crypto) - AES-128-ECB
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::Serialize;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use ideal_crypto::{CipherEngine, CryptoError};
use ideal_frame::{Event, FrameCodec, FrameError, HexBytes};
use ideal_proto::{gatt, Command, VersionKind};

/// フレーム生成器
///
/// 状態を持たないため、1 つのインスタンスを何度でも使い回せる。
#[wasm_bindgen]
pub struct LampCodec {
    codec: FrameCodec,
    cipher: CipherEngine,
}

#[wasm_bindgen]
impl LampCodec {
    /// # 引数
    /// - `key_base64`: 鍵の上書き（省略時はデバイスファミリー共通鍵）
    ///
    /// # エラー
    /// - Base64 デコード失敗
    /// - 鍵長が 16 バイト以外
    #[wasm_bindgen(constructor)]
    pub fn new(key_base64: Option<String>) -> Result<LampCodec, JsError> {
        Self::with_key(key_base64.as_deref()).map_err(to_js)
    }

    /// 電源 ON/OFF
    #[wasm_bindgen(js_name = "powerFrame")]
    pub fn power_frame(&self, on: bool) -> Result<Vec<u8>, JsError> {
        self.frame(Command::PowerSet { on })
    }

    /// 有効 LED 数（0〜65535）
    #[wasm_bindgen(js_name = "ledCountFrame")]
    pub fn led_count_frame(&self, count: u32) -> Result<Vec<u8>, JsError> {
        self.frame(Command::SetLedCount { count })
    }

    /// 色とモード（色は 5 ビットに量子化される）
    #[wasm_bindgen(js_name = "colorFrame")]
    #[allow(clippy::too_many_arguments)]
    pub fn color_frame(
        &self,
        r: u8,
        g: u8,
        b: u8,
        model_index: u8,
        reverse: bool,
        speed: u8,
        saturation: u8,
    ) -> Result<Vec<u8>, JsError> {
        self.frame(Command::SetColor {
            r,
            g,
            b,
            model_index,
            reverse,
            speed,
            saturation,
        })
    }

    /// 単色（model 0 / speed 100 / saturation 80）
    #[wasm_bindgen(js_name = "solidColorFrame")]
    pub fn solid_color_frame(&self, r: u8, g: u8, b: u8) -> Result<Vec<u8>, JsError> {
        self.frame(Command::solid_color(r, g, b))
    }

    /// 個別 LED（色は 8 ビットのまま）
    #[wasm_bindgen(js_name = "paintFrame")]
    pub fn paint_frame(&self, index: u32, r: u8, g: u8, b: u8) -> Result<Vec<u8>, JsError> {
        self.frame(Command::PaintLed { index, r, g, b })
    }

    /// バージョン問い合わせ（`firmware` が false なら基板バージョン）
    #[wasm_bindgen(js_name = "versionFrame")]
    pub fn version_frame(&self, firmware: bool) -> Result<Vec<u8>, JsError> {
        let kind = if firmware {
            VersionKind::Firmware
        } else {
            VersionKind::Pcb
        };
        self.frame(Command::QueryVersion { kind })
    }

    /// 通知を JSON で解釈する
    ///
    /// ```json
    /// {"len":4,"hex":"01 02 03 04","plaintext":null,
    ///  "u16_le":513,"u16_be":258,"u32_le":67305985,"u32_be":16909060}
    /// ```
    #[wasm_bindgen(js_name = "decodeNotification")]
    pub fn decode_notification(&self, bytes: &[u8], decrypt: bool) -> Result<String, JsError> {
        serde_json::to_string(&self.notification(bytes, decrypt)).map_err(to_js)
    }
}

impl LampCodec {
    /// JS を介さずに作る（native テスト用）
    pub fn with_key(key_base64: Option<&str>) -> Result<LampCodec, CryptoError> {
        let cipher = match key_base64 {
            Some(key) => CipherEngine::from_base64_key(key)?,
            None => CipherEngine::device_family(),
        };
        Ok(LampCodec {
            codec: FrameCodec::standard(),
            cipher,
        })
    }

    /// コマンドを暗号文フレームにする
    pub fn encrypt_command(&self, command: &Command) -> Result<[u8; 16], FrameError> {
        Ok(self.codec.encode(command)?.seal(&self.cipher).into_bytes())
    }

    /// 通知の解釈結果
    pub fn notification(&self, bytes: &[u8], decrypt: bool) -> NotificationView {
        let event = if decrypt {
            Event::decrypt_with(bytes, &self.cipher)
        } else {
            self.codec.decode(bytes)
        };
        NotificationView::from(&event)
    }

    fn frame(&self, command: Command) -> Result<Vec<u8>, JsError> {
        self.encrypt_command(&command)
            .map(|bytes| bytes.to_vec())
            .map_err(to_js)
    }
}

/// `decodeNotification` の JSON 形
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationView {
    pub len: usize,
    pub hex: String,
    pub plaintext: Option<String>,
    pub u16_le: Option<u16>,
    pub u16_be: Option<u16>,
    pub u32_le: Option<u32>,
    pub u32_be: Option<u32>,
}

impl From<&Event> for NotificationView {
    fn from(event: &Event) -> Self {
        let i = event.interpretations();
        NotificationView {
            len: event.len(),
            hex: HexBytes(event.raw()).to_string(),
            plaintext: event.plaintext().map(|p| HexBytes(p).to_string()),
            u16_le: i.u16_le,
            u16_be: i.u16_be,
            u32_le: i.u32_le,
            u32_be: i.u32_be,
        }
    }
}

/// GATT 構成の JSON 形
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GattProfile {
    pub service: String,
    /// コマンド書き込み候補（優先順）
    pub command_write: Vec<String>,
    pub notify: String,
    pub data_write: String,
}

impl GattProfile {
    pub fn standard() -> Self {
        GattProfile {
            service: uuid_string(gatt::SERVICE_UUID),
            command_write: gatt::COMMAND_WRITE_CANDIDATES
                .iter()
                .map(|&v| uuid_string(v))
                .collect(),
            notify: uuid_string(gatt::NOTIFY_UUID),
            data_write: uuid_string(gatt::DATA_WRITE_UUID),
        }
    }
}

/// Web Bluetooth の `requestDevice` / `getCharacteristic` に渡す UUID 一覧（JSON）
#[wasm_bindgen(js_name = "gattProfile")]
pub fn gatt_profile() -> Result<String, JsError> {
    serde_json::to_string(&GattProfile::standard()).map_err(to_js)
}

/// `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`（小文字、Web Bluetooth の表記）
fn uuid_string(v: u128) -> String {
    Uuid::from_u128(v).hyphenated().to_string()
}

fn to_js(err: impl core::fmt::Display) -> JsError {
    JsError::new(&alloc::format!("{}", err))
}
