//! 診断用のコマンドスイープ
//!
//! ラベル付きのコマンド列を順に送り、1 コマンドにつき 1 つの結果を返す。
//! 失敗は握りつぶさず結果に残す。続けても意味のない状態エラー
//! （close 済み・未接続）の場合だけ途中で止める。

use std::time::Duration;

use ideal_proto::command::{DEFAULT_SATURATION, DEFAULT_SPEED};
use ideal_proto::Command;
use tracing::{info, warn};

use crate::error::{SessionError, SessionStateError};
use crate::session::{DeviceSession, SendReport};

/// スイープの 1 手
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepStep {
    pub label: String,
    pub command: Command,
}

/// 1 手分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepOutcome {
    pub label: String,
    pub command: Command,
    pub result: Result<SendReport, SessionError>,
}

impl SweepOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// コマンドスイープ
#[derive(Debug, Clone, Default)]
pub struct CommandSweep {
    steps: Vec<SweepStep>,
    pause: Duration,
}

impl CommandSweep {
    /// `pause` は各送信の間に挟む待ち時間（目視確認用）
    pub fn new(pause: Duration) -> Self {
        CommandSweep {
            steps: Vec::new(),
            pause,
        }
    }

    pub fn step(mut self, label: impl Into<String>, command: Command) -> Self {
        self.steps.push(SweepStep {
            label: label.into(),
            command,
        });
        self
    }

    /// SGLS の model index を順に試す（白、その他はデフォルト）
    pub fn model_indices(pause: Duration, indices: impl IntoIterator<Item = u8>) -> Self {
        indices.into_iter().fold(Self::new(pause), |sweep, model_index| {
            let command = Command::SetColor {
                r: 255,
                g: 255,
                b: 255,
                model_index,
                reverse: false,
                speed: DEFAULT_SPEED,
                saturation: DEFAULT_SATURATION,
            };
            sweep.step(format!("model {}", model_index), command)
        })
    }

    /// LED を 1 つずつ同じ色で塗る（有効 LED 数の上限を目で探す）
    pub fn paint_range(
        pause: Duration,
        leds: impl IntoIterator<Item = u32>,
        (r, g, b): (u8, u8, u8),
    ) -> Self {
        leds.into_iter().fold(Self::new(pause), |sweep, index| {
            sweep.step(format!("led {}", index), Command::PaintLed { index, r, g, b })
        })
    }

    pub fn steps(&self) -> &[SweepStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 順に送信する
    ///
    /// 途中で止まった場合、結果の数はステップ数より少ない（最後の結果が止まった原因）。
    pub async fn run(&self, session: &DeviceSession) -> Vec<SweepOutcome> {
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }

            let result = session.send(step.command).await;
            let stop = match &result {
                Ok(report) => {
                    info!(label = %step.label, seq = report.seq, "sweep step sent");
                    false
                }
                Err(err) => {
                    warn!(label = %step.label, error = %err, "sweep step failed");
                    matches!(
                        err.state(),
                        Some(SessionStateError::AlreadyClosed | SessionStateError::NotAttached)
                    )
                }
            };

            outcomes.push(SweepOutcome {
                label: step.label.clone(),
                command: step.command,
                result,
            });
            if stop {
                break;
            }
        }

        outcomes
    }
}
