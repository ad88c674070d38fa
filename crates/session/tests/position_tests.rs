//! Position tracker tests: renewal cadence, single in-flight request,
//! cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use peaksight_core::geo::GeoPosition;
use peaksight_session::{PositionFix, PositionProvider, PositionTracker, SessionError};

struct MockProvider {
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl MockProvider {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            requests: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay,
        })
    }
}

#[async_trait]
impl PositionProvider for MockProvider {
    async fn request_fix(&self) -> Result<PositionFix, SessionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(PositionFix {
            position: GeoPosition::with_altitude(54.6013, -3.1347, 80.0),
            accuracy_m: 30.0,
        })
    }
}

#[tokio::test]
async fn test_tracker_publishes_and_renews() {
    let provider = MockProvider::new(Duration::from_millis(1));
    let mut tracker =
        PositionTracker::start_with_interval(provider.clone(), Duration::from_millis(10));

    let mut rx = tracker.subscribe();
    rx.changed().await.unwrap();
    let fix = tracker.latest().unwrap();
    assert!((fix.accuracy_m - 30.0).abs() < 0.001);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(
        provider.requests.load(Ordering::SeqCst) >= 3,
        "Expected repeated renewals"
    );
    tracker.stop();
}

#[tokio::test]
async fn test_at_most_one_request_in_flight() {
    // Slow provider, aggressive interval: requests must still serialize
    let provider = MockProvider::new(Duration::from_millis(20));
    let mut tracker =
        PositionTracker::start_with_interval(provider.clone(), Duration::from_millis(1));

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 1);
    tracker.stop();
}

#[tokio::test]
async fn test_stop_cancels_renewal() {
    let provider = MockProvider::new(Duration::from_millis(1));
    let mut tracker =
        PositionTracker::start_with_interval(provider.clone(), Duration::from_millis(5));

    tokio::time::sleep(Duration::from_millis(20)).await;
    tracker.stop();
    assert!(!tracker.is_running());

    tokio::time::sleep(Duration::from_millis(10)).await;
    let after_stop = provider.requests.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(
        provider.requests.load(Ordering::SeqCst),
        after_stop,
        "No requests may complete after stop"
    );
}

#[tokio::test]
async fn test_latest_is_none_before_first_fix() {
    let provider = MockProvider::new(Duration::from_millis(50));
    let mut tracker =
        PositionTracker::start_with_interval(provider, Duration::from_millis(100));
    assert!(tracker.latest().is_none());
    tracker.stop();
}
