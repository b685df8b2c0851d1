//! # ideal-wasm
//!
//! wasm-bindgen エクスポート：Web Bluetooth で接続するブラウザ / Node.js から呼び出す公開 API。
//!
//! 接続・書き込み・通知購読は JS 側の Web Bluetooth が行い、
//! こちらは 16 バイトの暗号文フレームを作ることと通知の解釈だけを担当する。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { LampCodec, gattProfile, init_panic_hook } from '../ideal-wasm-pkg/ideal_wasm';
//!
//! init_panic_hook();
//!
//! const profile = JSON.parse(gattProfile());
//! const device = await navigator.bluetooth.requestDevice({
//!     filters: [{ services: [profile.service] }],
//! });
//! const server = await device.gatt.connect();
//! const service = await server.getPrimaryService(profile.service);
//! const command = await service.getCharacteristic(profile.command_write[0]);
//!
//! const lamp = new LampCodec();          // 鍵の上書きは new LampCodec("base64...")
//! await command.writeValueWithResponse(lamp.powerFrame(true));
//! await command.writeValueWithResponse(lamp.solidColorFrame(255, 0, 0));
//!
//! const notify = await service.getCharacteristic(profile.notify);
//! notify.addEventListener('characteristicvaluechanged', (e) => {
//!     const bytes = new Uint8Array(e.target.value.buffer);
//!     console.log(JSON.parse(lamp.decodeNotification(bytes, false)));
//! });
//! await notify.startNotifications();
//! ```

extern crate alloc;

use wasm_bindgen::prelude::*;

pub mod lamp;

pub use lamp::{gatt_profile, GattProfile, LampCodec, NotificationView};

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Base64 鍵を 16 バイトの Uint8Array に変換するユーティリティ
///
/// 鍵の上書き設定を検証する用途。実際の使用では `LampCodec` のコンストラクタに渡す。
///
/// # エラー
/// - Base64 デコード失敗
/// - 鍵長が 16 バイト以外
#[wasm_bindgen(js_name = "decodeBase64Key")]
pub fn decode_base64_key(key_b64: &str) -> Result<js_sys::Uint8Array, JsError> {
    let key = ideal_crypto::decode_base64_key(key_b64)
        .map_err(|e| JsError::new(&alloc::format!("{}", e)))?;
    let arr = js_sys::Uint8Array::new_with_length(16);
    arr.copy_from(&key);
    Ok(arr)
}
