//! In-process progress tracking for link-check batches.
//!
//! Every batch registers a `BatchProgress` under its token. The orchestrator
//! bumps `completed` once per finished domain; SSE endpoints poll it on a
//! timer through [`ProgressHub::watch`].
//!
//! # Usage
//!
//! Producer (orchestrator):
//!   let progress = hub.begin(batch_id, domains.len()).await;
//!   let _guard = progress.completion_guard(); // counts the domain on drop
//!
//! Consumer (SSE endpoint):
//!   let updates = hub.watch(WatchTarget::Batch(batch_id), options).await;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

/// Point-in-time view of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    /// No batch to report on.
    pub fn idle() -> Self {
        Self {
            completed: 0,
            total: 0,
        }
    }

    /// Rounded completion percentage; 0 when idle.
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let ratio = self.completed.min(self.total) as f64 / self.total as f64;
        (ratio * 100.0).round() as u8
    }

    pub fn is_done(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Body of one SSE progress message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressMessage {
    pub percentage: u8,
}

impl From<ProgressSnapshot> for ProgressMessage {
    fn from(snapshot: ProgressSnapshot) -> Self {
        Self {
            percentage: snapshot.percentage(),
        }
    }
}

/// Counters for one running batch.
#[derive(Debug)]
pub struct BatchProgress {
    id: Uuid,
    total: usize,
    completed: AtomicUsize,
    started_at: DateTime<Utc>,
    finished_at: OnceLock<DateTime<Utc>>,
}

impl BatchProgress {
    fn new(id: Uuid, total: usize) -> Self {
        Self {
            id,
            total,
            completed: AtomicUsize::new(0),
            started_at: Utc::now(),
            finished_at: OnceLock::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at.get().copied()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed.load(Ordering::SeqCst).min(self.total),
            total: self.total,
        }
    }

    /// Count one more domain as finished.
    pub fn mark_completed(&self) {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if completed >= self.total {
            let _ = self.finished_at.set(Utc::now());
        }
    }

    /// Guard that counts one domain as finished when dropped, however the
    /// domain's work ended.
    pub fn completion_guard(self: &Arc<Self>) -> CompletionGuard {
        CompletionGuard {
            progress: Arc::clone(self),
        }
    }
}

/// Marks one domain complete on drop.
pub struct CompletionGuard {
    progress: Arc<BatchProgress>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.progress.mark_completed();
    }
}

/// Which batch a progress stream follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    /// A specific batch token. The batch may not be registered yet.
    Batch(Uuid),
    /// Whatever batch starts most recently (tokenless clients).
    Latest,
}

/// Timing for a progress stream.
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    /// How often the batch state is read
    pub interval: Duration,
    /// How long a stream may wait without any batch to follow
    pub idle_timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// Registry of batch progress, keyed by batch token.
///
/// Thread-safe, cloneable.
#[derive(Clone)]
pub struct ProgressHub {
    batches: Arc<RwLock<HashMap<Uuid, Arc<BatchProgress>>>>,
    latest: Arc<RwLock<Option<Uuid>>>,
    retention: Duration,
}

impl ProgressHub {
    /// Create a hub that keeps finished batches for 10 minutes.
    pub fn new() -> Self {
        Self::with_retention(Duration::from_secs(600))
    }

    /// Create a hub that keeps finished batches for `retention`.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            batches: Arc::new(RwLock::new(HashMap::new())),
            latest: Arc::new(RwLock::new(None)),
            retention,
        }
    }

    /// Register a batch at `{completed: 0, total}` and make it the latest.
    ///
    /// Reusing a token restarts that token's progress.
    pub async fn begin(&self, id: Uuid, total: usize) -> Arc<BatchProgress> {
        self.cleanup().await;

        let progress = Arc::new(BatchProgress::new(id, total));
        self.batches.write().await.insert(id, Arc::clone(&progress));
        *self.latest.write().await = Some(id);

        tracing::debug!(batch_id = %id, total, "Batch progress registered");
        progress
    }

    pub async fn snapshot(&self, id: Uuid) -> Option<ProgressSnapshot> {
        self.batches.read().await.get(&id).map(|p| p.snapshot())
    }

    /// Most recently started batch, if it is still tracked.
    pub async fn latest(&self) -> Option<(Uuid, ProgressSnapshot)> {
        let id = (*self.latest.read().await)?;
        self.snapshot(id).await.map(|snapshot| (id, snapshot))
    }

    /// Number of tracked batches (running or recently finished).
    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.batches.read().await.is_empty()
    }

    /// Drop finished batches older than the retention window (housekeeping).
    pub async fn cleanup(&self) {
        let retention = chrono::Duration::from_std(self.retention)
            .unwrap_or_else(|_| chrono::Duration::days(1));
        let cutoff = Utc::now() - retention;

        let mut batches = self.batches.write().await;
        batches.retain(|_, progress| match progress.finished_at() {
            Some(finished_at) => finished_at > cutoff,
            None => true,
        });
    }

    /// Subscribe to a batch's progress.
    ///
    /// The stream reads the batch every `options.interval` and yields a
    /// snapshot whenever the percentage changes (the first reading always).
    /// It ends right after yielding the completed state. While there is no
    /// batch to follow it yields one idle snapshot, then ends once
    /// `options.idle_timeout` passes. Dropping the stream stops the timer.
    ///
    /// `WatchTarget::Latest` ignores a latest batch that had already finished
    /// when the stream opened and waits for the next one.
    pub async fn watch(
        &self,
        target: WatchTarget,
        options: WatchOptions,
    ) -> impl Stream<Item = ProgressSnapshot> + Send + 'static {
        let skip = match target {
            WatchTarget::Latest => self
                .latest()
                .await
                .filter(|(_, snapshot)| snapshot.is_done())
                .map(|(id, _)| id),
            WatchTarget::Batch(_) => None,
        };

        let mut ticker = tokio::time::interval(options.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let watch = Watch {
            hub: self.clone(),
            target,
            skip,
            pinned: None,
            ticker,
            idle_deadline: Instant::now() + options.idle_timeout,
            last: None,
            finished: false,
        };

        stream::unfold(watch, |mut watch| async move {
            watch.next().await.map(|snapshot| (snapshot, watch))
        })
    }
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new()
    }
}

struct Watch {
    hub: ProgressHub,
    target: WatchTarget,
    skip: Option<Uuid>,
    pinned: Option<Uuid>,
    ticker: Interval,
    idle_deadline: Instant,
    last: Option<u8>,
    finished: bool,
}

impl Watch {
    async fn resolve(&mut self) -> Option<ProgressSnapshot> {
        match self.target {
            WatchTarget::Batch(id) => self.hub.snapshot(id).await,
            WatchTarget::Latest => {
                if let Some(id) = self.pinned {
                    return self.hub.snapshot(id).await;
                }
                let (id, snapshot) = self.hub.latest().await?;
                if Some(id) == self.skip {
                    return None;
                }
                self.pinned = Some(id);
                Some(snapshot)
            }
        }
    }

    async fn next(&mut self) -> Option<ProgressSnapshot> {
        if self.finished {
            return None;
        }

        loop {
            self.ticker.tick().await;

            match self.resolve().await {
                Some(snapshot) => {
                    let percentage = snapshot.percentage();
                    if snapshot.is_done() {
                        self.finished = true;
                        self.last = Some(percentage);
                        return Some(snapshot);
                    }
                    if self.last != Some(percentage) {
                        self.last = Some(percentage);
                        return Some(snapshot);
                    }
                }
                None => {
                    if Instant::now() >= self.idle_deadline {
                        return None;
                    }
                    if self.last.is_none() {
                        self.last = Some(0);
                        return Some(ProgressSnapshot::idle());
                    }
                }
            }
        }
    }
}
