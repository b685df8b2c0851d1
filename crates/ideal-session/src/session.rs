//! デバイスセッション状態機械
//!
//! ```text
//!            attach()            send()/try_send()
//!   Idle ─────────────▶ Attached ◀──────────▶ Busy
//!    │                     │                    │
//!    └──────── close() ────┴──── close() ───────┘ (書き込み完了を待つ)
//!                          ▼
//!                        Closed
//! ```
//!
//! - 書き込みは tokio の `Mutex` で直列化する（同時に 1 つだけ）。
//!   `send` はロックを待ち、`try_send` は待たずに `SessionBusy` を返す。
//! - 通知は送信ロックに触れず、トランスポートのコールバック上でハンドラに渡す。
//!   ハンドラスロットは `parking_lot::RwLock` で守られ、`close()` は実行中の
//!   ハンドラが戻るのを待ってからスロットを空にする。
//! - 書き込みは再送しない。失敗はそのまま呼び出し側に返す。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ideal_crypto::CipherEngine;
use ideal_frame::{EncryptedFrame, Event, FrameCodec};
use ideal_proto::Command;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::endpoint::{self, Candidacy, EndpointKind, EndpointSet};
use crate::error::{Operation, SessionError, SessionStateError, TransportError, TransportFault};
use crate::transport::{ConnectionHandle, DiscoveredCharacteristic, NotificationCallback, TransportPort};

/// セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Attached,
    /// 書き込み中
    Busy,
    Closed,
}

/// 実際に使われた書き込み方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    WithResponse,
    WithoutResponse,
}

/// 候補 1 つ分の確認結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Accepted(WriteMode),
    Rejected(TransportFault),
    /// 書き込み能力なしと広告されていたため試していない
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub characteristic: Uuid,
    pub candidacy: Candidacy,
    pub outcome: ProbeOutcome,
}

/// attach の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachReport {
    pub handle: ConnectionHandle,
    pub endpoints: EndpointSet,
    /// 採用された候補の位置（設定の `command_candidates` 内）
    pub candidate_index: usize,
    /// 試した順の記録
    pub attempts: Vec<ProbeAttempt>,
}

/// 送信 1 回分の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    /// 成功した送信の通し番号（1 始まり）
    pub seq: u64,
    pub command: Command,
    pub endpoint: Uuid,
    pub write_mode: WriteMode,
    /// 実際に書き込んだ暗号文
    pub frame: EncryptedFrame,
}

/// 累計カウンタのスナップショット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub frames_sent: u64,
    pub events_delivered: u64,
    /// ハンドラ未登録のため捨てた通知
    pub events_dropped: u64,
}

/// 通知ハンドラ
///
/// トランスポートの受信コンテキストで呼ばれる。ハンドラの中から
/// `set_event_handler` / `clear_event_handler` を呼ぶとデッドロックする。
pub type EventHandler = Box<dyn Fn(Event) + Send + Sync>;

struct HandlerSlot {
    handler: Option<EventHandler>,
    closed: bool,
}

#[derive(Default)]
struct Counters {
    frames_sent: AtomicU64,
    events_delivered: AtomicU64,
    events_dropped: AtomicU64,
}

/// attach 済みの接続
struct Link {
    handle: ConnectionHandle,
    endpoints: EndpointSet,
}

struct Status {
    state: SessionState,
    endpoints: Option<EndpointSet>,
}

/// Busy の間だけ生きるガード（送信 future が途中で破棄されても Attached に戻す）
struct BusyGuard<'a>(&'a Mutex<Status>);

impl<'a> BusyGuard<'a> {
    fn enter(status: &'a Mutex<Status>) -> Self {
        status.lock().state = SessionState::Busy;
        BusyGuard(status)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut status = self.0.lock();
        if status.state == SessionState::Busy {
            status.state = SessionState::Attached;
        }
    }
}

/// 1 台のデバイスとのセッション
pub struct DeviceSession {
    transport: Arc<dyn TransportPort>,
    config: SessionConfig,
    cipher: CipherEngine,
    codec: FrameCodec,
    /// 書き込みの直列化ロック（中身は attach 済みの接続）
    link: tokio::sync::Mutex<Option<Link>>,
    status: Mutex<Status>,
    handler: Arc<RwLock<HandlerSlot>>,
    counters: Arc<Counters>,
    next_seq: AtomicU64,
}

impl DeviceSession {
    /// セッションを作る（まだ接続しない）
    ///
    /// # エラー
    /// - `ProtocolError::InvalidKeyEncoding` / `InvalidKeyLength`: 設定の鍵が不正
    pub fn new(transport: Arc<dyn TransportPort>, config: SessionConfig) -> Result<Self, SessionError> {
        let cipher = config.cipher()?;
        Ok(DeviceSession {
            transport,
            config,
            cipher,
            codec: FrameCodec::standard(),
            link: tokio::sync::Mutex::new(None),
            status: Mutex::new(Status {
                state: SessionState::Idle,
                endpoints: None,
            }),
            handler: Arc::new(RwLock::new(HandlerSlot {
                handler: None,
                closed: false,
            })),
            counters: Arc::new(Counters::default()),
            next_seq: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.status.lock().state
    }

    /// attach 済みならエンドポイントを返す
    pub fn endpoints(&self) -> Option<EndpointSet> {
        self.status.lock().endpoints
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frames_sent: self.counters.frames_sent.load(Ordering::Relaxed),
            events_delivered: self.counters.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.counters.events_dropped.load(Ordering::Relaxed),
        }
    }

    /// 接続してコマンド書き込みエンドポイントを確定する
    ///
    /// 候補を優先順に 1 つずつ確認コマンドで試し、最初に受け付けたものを採用する。
    /// 失敗した場合はトランスポートを切断して `Idle` のまま戻る（再度 attach できる）。
    ///
    /// # エラー
    /// - `SessionStateError::AlreadyAttached` / `AlreadyClosed`: `Idle` でない
    /// - `TransportError { operation: Attach | Discover | Probe | Subscribe, .. }`
    pub async fn attach(&self) -> Result<AttachReport, SessionError> {
        let mut link = self.link.lock().await;
        match self.state() {
            SessionState::Idle => {}
            SessionState::Closed => return Err(SessionStateError::AlreadyClosed.into()),
            SessionState::Attached | SessionState::Busy => {
                return Err(SessionStateError::AlreadyAttached.into())
            }
        }

        info!(address = %self.config.address, "attaching");
        let handle = self
            .transport
            .attach(&self.config.address)
            .await
            .map_err(|fault| TransportError::new(Operation::Attach, fault))?;

        match self.bind(handle).await {
            Ok(report) => {
                *link = Some(Link {
                    handle,
                    endpoints: report.endpoints,
                });
                {
                    let mut status = self.status.lock();
                    status.state = SessionState::Attached;
                    status.endpoints = Some(report.endpoints);
                }
                info!(
                    command_write = %report.endpoints.command_write,
                    candidate = report.candidate_index,
                    data_write = ?report.endpoints.data_write,
                    notify = ?report.endpoints.notify,
                    "attached"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, "attach failed, detaching");
                self.transport.detach(handle).await;
                Err(err)
            }
        }
    }

    async fn bind(&self, handle: ConnectionHandle) -> Result<AttachReport, SessionError> {
        let discovered = self
            .transport
            .discover_endpoints(handle)
            .await
            .map_err(|fault| TransportError::new(Operation::Discover, fault))?;
        let total = discovered.len();
        let discovered = endpoint::in_service(discovered, self.config.service);
        debug!(
            total,
            in_service = discovered.len(),
            service = %self.config.service,
            "discovered characteristics"
        );

        let (candidate_index, command_write, attempts) = self.probe(handle, &discovered).await?;
        let data_write =
            endpoint::resolve_data_write(self.config.data_write, command_write, &discovered);

        let notify = if self.config.subscribe_notifications
            && endpoint::should_subscribe(self.config.notify, &discovered)
        {
            self.transport
                .subscribe(handle, self.config.notify, self.notification_callback())
                .await
                .map_err(|fault| {
                    TransportError::new(Operation::Subscribe, fault).at(self.config.notify)
                })?;
            Some(self.config.notify)
        } else {
            None
        };

        Ok(AttachReport {
            handle,
            endpoints: EndpointSet {
                command_write,
                notify,
                data_write,
            },
            candidate_index,
            attempts,
        })
    }

    /// コマンド書き込み候補を順に試す
    async fn probe(
        &self,
        handle: ConnectionHandle,
        discovered: &[DiscoveredCharacteristic],
    ) -> Result<(usize, Uuid, Vec<ProbeAttempt>), SessionError> {
        let command = self.config.probe.to_command();
        let frame = self.codec.encode(&command)?.seal(&self.cipher);
        let backoff = self.config.probe_backoff();

        let plan = endpoint::plan_candidates(&self.config.command_candidates, discovered);
        let mut attempts = Vec::with_capacity(plan.len());
        let mut last_fault = None;

        for (index, (uuid, candidacy)) in plan.into_iter().enumerate() {
            if !candidacy.should_probe() {
                debug!(%uuid, "skipping candidate advertised without write capability");
                attempts.push(ProbeAttempt {
                    characteristic: uuid,
                    candidacy,
                    outcome: ProbeOutcome::Skipped,
                });
                continue;
            }

            if last_fault.is_some() && !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }

            match self.write_frame(handle, uuid, &frame).await {
                Ok(mode) => {
                    attempts.push(ProbeAttempt {
                        characteristic: uuid,
                        candidacy,
                        outcome: ProbeOutcome::Accepted(mode),
                    });
                    return Ok((index, uuid, attempts));
                }
                Err(fault) => {
                    warn!(%uuid, %fault, "candidate rejected probe");
                    attempts.push(ProbeAttempt {
                        characteristic: uuid,
                        candidacy,
                        outcome: ProbeOutcome::Rejected(fault.clone()),
                    });
                    last_fault = Some(fault);
                }
            }
        }

        let fault = last_fault.unwrap_or_else(|| {
            TransportFault::Write("no writable command endpoint candidate".into())
        });
        Err(TransportError::new(Operation::Probe, fault)
            .during(command.kind())
            .into())
    }

    /// 書き込み方式の方針に従って 1 フレーム書く
    ///
    /// 応答ありが拒否された場合だけ応答なしで書き直す。それ以上は試さない。
    async fn write_frame(
        &self,
        handle: ConnectionHandle,
        characteristic: Uuid,
        frame: &EncryptedFrame,
    ) -> Result<WriteMode, TransportFault> {
        let bytes = frame.as_bytes();
        if !self.config.prefer_write_with_response {
            self.transport.write(handle, characteristic, bytes, false).await?;
            return Ok(WriteMode::WithoutResponse);
        }

        match self.transport.write(handle, characteristic, bytes, true).await {
            Ok(()) => Ok(WriteMode::WithResponse),
            Err(fault) => {
                warn!(%characteristic, %fault, "write with response rejected, falling back to write without response");
                self.transport.write(handle, characteristic, bytes, false).await?;
                Ok(WriteMode::WithoutResponse)
            }
        }
    }

    /// コマンド書き込みエンドポイントへ送る（書き込み中なら順番を待つ）
    pub async fn send(&self, command: Command) -> Result<SendReport, SessionError> {
        self.send_to(EndpointKind::CommandWrite, command).await
    }

    /// 指定した論理エンドポイントへ送る
    ///
    /// # エラー
    /// - `SessionStateError::EndpointUnavailable`: エンドポイントが確定していない
    pub async fn send_to(
        &self,
        kind: EndpointKind,
        command: Command,
    ) -> Result<SendReport, SessionError> {
        let link = self.link.lock().await;
        self.transmit(link.as_ref(), kind, command).await
    }

    /// 書き込み中なら待たずに `SessionBusy` を返す
    pub async fn try_send(&self, command: Command) -> Result<SendReport, SessionError> {
        self.try_send_to(EndpointKind::CommandWrite, command).await
    }

    pub async fn try_send_to(
        &self,
        kind: EndpointKind,
        command: Command,
    ) -> Result<SendReport, SessionError> {
        let link = self
            .link
            .try_lock()
            .map_err(|_| SessionStateError::SessionBusy)?;
        self.transmit(link.as_ref(), kind, command).await
    }

    async fn transmit(
        &self,
        link: Option<&Link>,
        kind: EndpointKind,
        command: Command,
    ) -> Result<SendReport, SessionError> {
        let link = link.ok_or_else(|| self.not_ready())?;
        let endpoint = link
            .endpoints
            .writable(kind)
            .ok_or(SessionStateError::EndpointUnavailable(kind))?;

        let frame = self.codec.encode(&command)?;
        let sealed = frame.seal(&self.cipher);
        debug!(command = %command.kind(), %endpoint, plaintext = %frame, "sending frame");

        let result = {
            let _busy = BusyGuard::enter(&self.status);
            self.write_frame(link.handle, endpoint, &sealed).await
        };
        let write_mode = result.map_err(|fault| {
            TransportError::new(Operation::Write, fault)
                .at(endpoint)
                .during(command.kind())
        })?;

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.counters.frames_sent.fetch_add(1, Ordering::Relaxed);
        Ok(SendReport {
            seq,
            command,
            endpoint,
            write_mode,
            frame: sealed,
        })
    }

    fn not_ready(&self) -> SessionStateError {
        match self.state() {
            SessionState::Closed => SessionStateError::AlreadyClosed,
            _ => SessionStateError::NotAttached,
        }
    }

    /// 通知ハンドラを登録する（既存のものは置き換える）
    ///
    /// # エラー
    /// - `SessionStateError::AlreadyClosed`: close 済み
    pub fn set_event_handler<F>(&self, handler: F) -> Result<(), SessionStateError>
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        let mut slot = self.handler.write();
        if slot.closed {
            return Err(SessionStateError::AlreadyClosed);
        }
        slot.handler = Some(Box::new(handler));
        Ok(())
    }

    /// 通知ハンドラを外す（実行中のハンドラが戻るまで待つ）
    pub fn clear_event_handler(&self) {
        self.handler.write().handler = None;
    }

    fn notification_callback(&self) -> NotificationCallback {
        let slot = Arc::clone(&self.handler);
        let counters = Arc::clone(&self.counters);
        let codec = self.codec;
        let cipher = self
            .config
            .decrypt_notifications
            .then(|| self.cipher.clone());

        Box::new(move |bytes: Vec<u8>| {
            let event = match &cipher {
                Some(cipher) => Event::decrypt_with(&bytes, cipher),
                None => codec.decode(&bytes),
            };
            debug!(%event, "notification");

            let slot = slot.read();
            match &slot.handler {
                Some(handler) => {
                    handler(event);
                    counters.events_delivered.fetch_add(1, Ordering::Relaxed);
                }
                None => {
                    counters.events_dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
        })
    }

    /// セッションを閉じる
    ///
    /// 書き込み中ならその完了を待ち、ハンドラを外してから切断する。
    /// 戻った後にハンドラが呼ばれることはない。2 回目以降は何もしない。
    pub async fn close(&self) {
        let mut link = self.link.lock().await;
        if self.state() == SessionState::Closed {
            return;
        }

        {
            let mut slot = self.handler.write();
            slot.closed = true;
            slot.handler = None;
        }

        if let Some(link) = link.take() {
            self.transport.detach(link.handle).await;
        }

        let mut status = self.status.lock();
        status.state = SessionState::Closed;
        status.endpoints = None;
        info!(address = %self.config.address, "session closed");
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("address", &self.config.address)
            .field("state", &self.state())
            .field("endpoints", &self.endpoints())
            .finish_non_exhaustive()
    }
}
