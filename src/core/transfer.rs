//! Simulated transfer engine
//!
//! Drives a single download's lifecycle (preparing -> downloading ->
//! paused/downloading -> complete) with timer ticks and randomized progress
//! increments. No bytes move: the engine exists so the UI has a believable
//! transfer to render. Each transfer owns its state exclusively and its ticks
//! run strictly sequentially on one task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::models::{
    AppError, AppResult, DownloadHistoryEntry, TransferSnapshot, TransferStatus, VideoDescriptor,
    VideoFormat,
};

/// Progress increment drawn each tick, in percentage points.
const PROGRESS_INCREMENT_MIN: f64 = 1.0;
const PROGRESS_INCREMENT_MAX: f64 = 6.0;

/// Display-only speed range in bytes per second. Drawn independently of the
/// simulated byte delta each tick.
const SPEED_MIN_BPS: f64 = 512.0 * 1024.0;
const SPEED_MAX_BPS: f64 = 4.0 * 1024.0 * 1024.0;

/// Events emitted by a transfer. Each lifecycle transition fires exactly once.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum TransferEvent {
    TransferStarted {
        transfer_id: String,
    },
    TransferProgress {
        transfer_id: String,
        snapshot: TransferSnapshot,
    },
    TransferPaused {
        transfer_id: String,
    },
    TransferResumed {
        transfer_id: String,
    },
    TransferCompleted {
        transfer_id: String,
        snapshot: TransferSnapshot,
    },
    TransferCancelled {
        transfer_id: String,
    },
}

/// Channel for communication between the transfer engine and UI
pub type EventSender = mpsc::UnboundedSender<TransferEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<TransferEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Wall-clock pacing of the simulated transfer. The simulated clock itself
/// counts ticks (one tick = one simulated second), so shrinking these values
/// speeds a transfer up without changing its arithmetic.
#[derive(Debug, Clone)]
pub struct TransferTiming {
    /// Delay before `Preparing` gives way to `Downloading`
    pub prepare_delay: Duration,
    /// Interval between progress ticks
    pub tick_interval: Duration,
    /// Delay between reaching 100% and the completion notification
    pub complete_delay: Duration,
}

impl Default for TransferTiming {
    fn default() -> Self {
        Self {
            prepare_delay: Duration::from_secs(3),
            tick_interval: Duration::from_secs(1),
            complete_delay: Duration::from_millis(1500),
        }
    }
}

impl TransferTiming {
    /// Millisecond-scale pacing for tests and demos.
    pub fn fast() -> Self {
        Self {
            prepare_delay: Duration::from_millis(20),
            tick_interval: Duration::from_millis(10),
            complete_delay: Duration::from_millis(15),
        }
    }
}

/// Mutable transfer state, owned by the engine and guarded by one lock.
#[derive(Debug)]
struct TransferState {
    status: TransferStatus,
    progress_percent: f64,
    downloaded_bytes: u64,
    elapsed_seconds: u64,
    eta_seconds: Option<u64>,
    speed_bps: f64,
}

impl TransferState {
    fn new() -> Self {
        Self {
            status: TransferStatus::Preparing,
            progress_percent: 0.0,
            downloaded_bytes: 0,
            elapsed_seconds: 0,
            eta_seconds: None,
            speed_bps: 0.0,
        }
    }

    fn snapshot(&self, transfer_id: &str, total_bytes: u64) -> TransferSnapshot {
        TransferSnapshot {
            transfer_id: transfer_id.to_string(),
            status: self.status,
            progress_percent: self.progress_percent,
            total_bytes,
            downloaded_bytes: self.downloaded_bytes,
            elapsed_seconds: self.elapsed_seconds,
            eta_seconds: self.eta_seconds,
            speed_bps: self.speed_bps,
        }
    }
}

/// A single simulated download.
///
/// One active transfer per instance; ticks are strictly sequential because a
/// single spawned task owns the loop, and pause/cancel abort that task so no
/// late callback can mutate a discarded transfer.
pub struct SimulatedTransfer {
    id: String,
    descriptor: VideoDescriptor,
    format: VideoFormat,
    timing: TransferTiming,
    state: Arc<RwLock<TransferState>>,
    event_sender: EventSender,
    ticker: Option<JoinHandle<()>>,
    cancelled: bool,
}

impl SimulatedTransfer {
    /// Create a transfer in the `Preparing` state. Nothing runs until
    /// [`start`](Self::start) is called.
    pub fn new(
        descriptor: VideoDescriptor,
        format: VideoFormat,
        timing: TransferTiming,
        event_sender: EventSender,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            descriptor,
            format,
            timing,
            state: Arc::new(RwLock::new(TransferState::new())),
            event_sender,
            ticker: None,
            cancelled: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn descriptor(&self) -> &VideoDescriptor {
        &self.descriptor
    }

    pub fn format(&self) -> &VideoFormat {
        &self.format
    }

    /// Begin the transfer: after the prepare delay the state machine enters
    /// `Downloading` and starts ticking.
    pub async fn start(&mut self) -> AppResult<()> {
        self.ensure_not_cancelled()?;

        // Idempotent: a ticker already running means start was already issued
        if self.ticker.is_some() {
            return Ok(());
        }

        {
            let state = self.state.read().await;
            if state.status != TransferStatus::Preparing {
                return Err(AppError::Transfer(format!(
                    "Transfer {} cannot be started from status: {:?}",
                    self.id, state.status
                )));
            }
        }

        info!("🚀 Preparing transfer {} ({})", self.id, self.descriptor.title);
        self.spawn_ticker(true);
        Ok(())
    }

    /// Pause a downloading transfer, freezing progress and derived fields.
    pub async fn pause(&mut self) -> AppResult<()> {
        self.ensure_not_cancelled()?;

        // Holding the write lock across the abort keeps the ticker from
        // mutating state after the status flips to Paused.
        let mut state = self.state.write().await;
        if state.status != TransferStatus::Downloading {
            return Err(AppError::Transfer(format!(
                "Transfer {} cannot be paused from status: {:?}",
                self.id, state.status
            )));
        }

        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        state.status = TransferStatus::Paused;
        drop(state);

        self.emit(TransferEvent::TransferPaused {
            transfer_id: self.id.clone(),
        });
        info!("⏸️ Paused transfer {}", self.id);
        Ok(())
    }

    /// Resume a paused transfer. Progress and elapsed time continue from the
    /// frozen values; the pause itself costs no simulated time.
    pub async fn resume(&mut self) -> AppResult<()> {
        self.ensure_not_cancelled()?;

        {
            let mut state = self.state.write().await;
            if state.status != TransferStatus::Paused {
                return Err(AppError::Transfer(format!(
                    "Transfer {} cannot be resumed from status: {:?}",
                    self.id, state.status
                )));
            }
            state.status = TransferStatus::Downloading;
        }

        self.emit(TransferEvent::TransferResumed {
            transfer_id: self.id.clone(),
        });
        self.spawn_ticker(false);
        info!("▶️ Resumed transfer {}", self.id);
        Ok(())
    }

    /// Cancel the transfer from any non-terminal state. Pending ticks are
    /// cleared before this returns, so no callback can resurrect the state;
    /// repeated cancels are a no-op.
    pub async fn cancel(&mut self) -> AppResult<()> {
        if self.cancelled {
            return Ok(());
        }

        let state = self.state.write().await;
        if state.status == TransferStatus::Complete {
            return Err(AppError::Transfer(format!(
                "Transfer {} is already complete",
                self.id
            )));
        }

        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        self.cancelled = true;
        drop(state);

        self.emit(TransferEvent::TransferCancelled {
            transfer_id: self.id.clone(),
        });
        info!("🚫 Cancelled transfer {}", self.id);
        Ok(())
    }

    /// Current state of the transfer.
    pub async fn snapshot(&self) -> TransferSnapshot {
        let state = self.state.read().await;
        state.snapshot(&self.id, self.format.file_size)
    }

    /// History record for a finished transfer; `None` until terminal.
    pub async fn history_entry(&self) -> Option<DownloadHistoryEntry> {
        let state = self.state.read().await;
        if state.status != TransferStatus::Complete {
            return None;
        }

        Some(DownloadHistoryEntry {
            id: Uuid::new_v4().to_string(),
            title: self.descriptor.title.clone(),
            thumbnail_url: self.descriptor.thumbnail_url.clone(),
            url: self.descriptor.url.clone(),
            format: self.format.quality.clone(),
            download_date: Utc::now(),
            file_path: None,
            file_size: Some(self.format.file_size),
            duration_seconds: self.descriptor.duration_seconds,
        })
    }

    fn ensure_not_cancelled(&self) -> AppResult<()> {
        if self.cancelled {
            return Err(AppError::Transfer(format!(
                "Transfer {} was cancelled",
                self.id
            )));
        }
        Ok(())
    }

    fn emit(&self, event: TransferEvent) {
        // A dropped receiver only matters to the UI side
        let _ = self.event_sender.send(event);
    }

    fn spawn_ticker(&mut self, announce_start: bool) {
        let transfer_id = self.id.clone();
        let state = Arc::clone(&self.state);
        let events = self.event_sender.clone();
        let total_bytes = self.format.file_size;
        let timing = self.timing.clone();

        let handle = tokio::spawn(async move {
            Self::run_ticks(transfer_id, state, events, total_bytes, timing, announce_start)
                .await;
        });
        self.ticker = Some(handle);
    }

    /// Tick loop owned by the spawned task. Each iteration sleeps, then updates
    /// state under the write lock, so ticks never overlap.
    async fn run_ticks(
        transfer_id: String,
        state: Arc<RwLock<TransferState>>,
        events: EventSender,
        total_bytes: u64,
        timing: TransferTiming,
        announce_start: bool,
    ) {
        if announce_start {
            tokio::time::sleep(timing.prepare_delay).await;
            {
                // Notify inside the lock block: pause/cancel hold this lock
                // while aborting, so an event is either fully sent before the
                // abort or never sent at all.
                let mut state = state.write().await;
                if state.status != TransferStatus::Preparing {
                    return;
                }
                state.status = TransferStatus::Downloading;
                let _ = events.send(TransferEvent::TransferStarted {
                    transfer_id: transfer_id.clone(),
                });
            }
            info!("🔄 Transfer {} downloading", transfer_id);
        }

        loop {
            tokio::time::sleep(timing.tick_interval).await;

            let finished_snapshot = {
                let mut state = state.write().await;
                if state.status != TransferStatus::Downloading {
                    debug!("Tick for {} skipped, status {:?}", transfer_id, state.status);
                    return;
                }

                let mut rng = rand::thread_rng();
                let increment = rng.gen_range(PROGRESS_INCREMENT_MIN..=PROGRESS_INCREMENT_MAX);
                state.progress_percent = (state.progress_percent + increment).min(100.0);
                state.downloaded_bytes =
                    ((state.progress_percent / 100.0) * total_bytes as f64) as u64;
                // Speed is cosmetic and unrelated to the simulated byte delta
                state.speed_bps = rng.gen_range(SPEED_MIN_BPS..=SPEED_MAX_BPS);
                state.elapsed_seconds += 1;

                // Linear extrapolation from the average historical rate;
                // volatile near zero progress by construction.
                state.eta_seconds = if state.progress_percent > 0.0 {
                    let remaining = (100.0 - state.progress_percent)
                        * (state.elapsed_seconds as f64 / state.progress_percent);
                    Some(remaining.round() as u64)
                } else {
                    None
                };

                let finished = state.progress_percent >= 100.0;
                if finished {
                    state.status = TransferStatus::Complete;
                    state.downloaded_bytes = total_bytes;
                }

                let snapshot = state.snapshot(&transfer_id, total_bytes);
                let _ = events.send(TransferEvent::TransferProgress {
                    transfer_id: transfer_id.clone(),
                    snapshot: snapshot.clone(),
                });

                finished.then_some(snapshot)
            };

            if let Some(snapshot) = finished_snapshot {
                // Let the terminal UI state render before the completion toast
                tokio::time::sleep(timing.complete_delay).await;
                let _ = events.send(TransferEvent::TransferCompleted {
                    transfer_id: transfer_id.clone(),
                    snapshot,
                });
                info!("✅ Transfer {} complete", transfer_id);
                return;
            }
        }
    }
}

impl Drop for SimulatedTransfer {
    fn drop(&mut self) {
        // Idempotent teardown: never leave an orphaned ticker mutating state
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}
