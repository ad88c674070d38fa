//! Position acquisition
//!
//! Fixes arrive minutes apart and each request is single-shot: the provider
//! resolves with at most one fix per call, and the tracker issues the next
//! request only after the previous one completed, so at most one is ever in
//! flight. The latest fix is published through a watch channel; consumers
//! read it without blocking the sample/layout hot path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use peaksight_core::geo::GeoPosition;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::settings::ACCURACY_WARNING_M;

/// Interval between position renewals.
pub const RENEWAL_INTERVAL: Duration = Duration::from_secs(60);

/// One resolved position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub position: GeoPosition,
    pub accuracy_m: f32,
}

/// Display-only quality of the current fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    /// No fix received yet this session
    NoFix,
    /// Fix accuracy worse than the warning threshold
    Inaccurate,
    Good,
}

/// Classify a fix for the status readout. Never an error: a stale or
/// missing fix is a warning state, layout proceeds regardless.
pub fn position_status(fix: Option<&PositionFix>) -> PositionStatus {
    match fix {
        None => PositionStatus::NoFix,
        Some(f) if f.accuracy_m > ACCURACY_WARNING_M => PositionStatus::Inaccurate,
        Some(_) => PositionStatus::Good,
    }
}

/// Source of single-shot position fixes.
#[async_trait]
pub trait PositionProvider: Send + Sync + 'static {
    /// Resolve at most one fix. The caller re-requests on its own schedule.
    async fn request_fix(&self) -> Result<PositionFix, SessionError>;
}

/// Background renewal task publishing the latest fix.
///
/// Requests immediately on start, then every renewal interval. `stop`
/// cancels the task; suspend/resume cycles must stop the old tracker before
/// starting a new one so timers never accumulate across activations.
pub struct PositionTracker {
    rx: watch::Receiver<Option<PositionFix>>,
    task: Option<JoinHandle<()>>,
}

impl PositionTracker {
    pub fn start(provider: Arc<dyn PositionProvider>) -> Self {
        Self::start_with_interval(provider, RENEWAL_INTERVAL)
    }

    pub fn start_with_interval(provider: Arc<dyn PositionProvider>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            loop {
                match provider.request_fix().await {
                    Ok(fix) => {
                        debug!(
                            "position fix {:.5},{:.5} \u{b1}{:.0}m",
                            fix.position.lat_deg, fix.position.lon_deg, fix.accuracy_m
                        );
                        if tx.send(Some(fix)).is_err() {
                            // All receivers gone
                            return;
                        }
                    }
                    Err(e) => warn!("position request failed: {}", e),
                }
                tokio::time::sleep(interval).await;
            }
        });
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Most recent fix, if any arrived this session.
    pub fn latest(&self) -> Option<PositionFix> {
        *self.rx.borrow()
    }

    /// A receiver for callers that want to await changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<PositionFix>> {
        self.rx.clone()
    }

    /// Cancel the renewal task.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PositionTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
