//! Arbitration of competing "move the map camera" requests.
//!
//! Several parts of the app want to recentre the map: the first GPS fix,
//! map initialisation, the user tapping a point, a search result, and the
//! user panning by hand. The arbiter decides which request wins.
//!
//! # Rule
//!
//! ```text
//! accept(source, now) = source.priority >= owner.priority
//!                    || now - owner.claimed_at > timeout
//! ```
//!
//! An accepted request becomes the new owner. A lower-priority source can
//! still win once the owner's claim has gone stale, so a one-off high
//! priority event (e.g. the first GPS fix) never locks the camera forever.
//! A manual gesture ([`CameraMoveArbiter::mark_manual`]) always wins.
//!
//! # Example
//!
//! ```
//! use luopan::camera::{CameraMoveArbiter, MoveSource};
//!
//! let arbiter = CameraMoveArbiter::new();
//! assert!(arbiter.request(MoveSource::GpsAutoLocate, 0));
//! assert!(arbiter.request(MoveSource::MapInit, 1_000));
//! assert!(!arbiter.request(MoveSource::GpsAutoLocate, 1_500));
//! assert!(arbiter.request(MoveSource::GpsAutoLocate, 4_001));
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default staleness timeout for a camera claim.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3_000);

/// Origin of a camera move request, ordered by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveSource {
    /// Automatic recentre on a GPS fix.
    GpsAutoLocate,
    /// Initial camera placement when the map loads.
    MapInit,
    /// The user selected a survey point.
    UserPointSelect,
    /// A search result was chosen.
    SearchResult,
    /// The user panned or zoomed by hand.
    UserManual,
}

impl MoveSource {
    /// Priority (higher wins).
    pub fn priority(self) -> u8 {
        match self {
            MoveSource::GpsAutoLocate => 1,
            MoveSource::MapInit => 2,
            MoveSource::UserPointSelect => 3,
            MoveSource::SearchResult => 4,
            MoveSource::UserManual => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveSource::GpsAutoLocate => "gps_auto_locate",
            MoveSource::MapInit => "map_init",
            MoveSource::UserPointSelect => "user_point_select",
            MoveSource::SearchResult => "search_result",
            MoveSource::UserManual => "user_manual",
        }
    }
}

impl fmt::Display for MoveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to move the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraMoveRequest {
    pub source: MoveSource,
    /// Milliseconds on the caller's monotonic clock.
    pub timestamp_ms: u64,
}

impl CameraMoveRequest {
    pub fn new(source: MoveSource, timestamp_ms: u64) -> Self {
        Self {
            source,
            timestamp_ms,
        }
    }
}

/// Owner state: both fields are always read and written together.
#[derive(Debug, Clone, Copy)]
struct Owner {
    source: MoveSource,
    timestamp_ms: u64,
    /// False until the first accepted request; the initial `MapInit` owner
    /// is a placeholder that any request replaces.
    claimed: bool,
}

/// Priority + timeout arbiter for camera moves.
///
/// Thread-safe via an internal mutex; callers on any thread may submit
/// requests.
pub struct CameraMoveArbiter {
    timeout_ms: u64,
    epoch: Instant,
    owner: Mutex<Owner>,
}

impl fmt::Debug for CameraMoveArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = *self.owner.lock();
        f.debug_struct("CameraMoveArbiter")
            .field("timeout_ms", &self.timeout_ms)
            .field("source", &owner.source)
            .field("timestamp_ms", &owner.timestamp_ms)
            .finish()
    }
}

impl Default for CameraMoveArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraMoveArbiter {
    /// Create an arbiter with the default 3 s timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create an arbiter with a custom staleness timeout. A zero timeout
    /// would make every claim stale at once, so it falls back to the default.
    pub fn with_timeout(timeout: Duration) -> Self {
        let timeout = if timeout.is_zero() { DEFAULT_TIMEOUT } else { timeout };
        Self {
            timeout_ms: timeout.as_millis().min(u64::MAX as u128) as u64,
            epoch: Instant::now(),
            owner: Mutex::new(Owner {
                source: MoveSource::MapInit,
                timestamp_ms: 0,
                claimed: false,
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Submit a request at `now_ms`; returns whether the caller may move.
    pub fn request(&self, source: MoveSource, now_ms: u64) -> bool {
        let mut owner = self.owner.lock();

        let outranks = source.priority() >= owner.source.priority();
        let stale = !owner.claimed || now_ms.saturating_sub(owner.timestamp_ms) > self.timeout_ms;
        let accepted = outranks || stale;

        if accepted {
            tracing::trace!(
                source = %source,
                previous = %owner.source,
                now_ms,
                stale,
                "Camera move accepted"
            );
            *owner = Owner {
                source,
                timestamp_ms: now_ms,
                claimed: true,
            };
        } else {
            tracing::trace!(
                source = %source,
                owner = %owner.source,
                age_ms = now_ms.saturating_sub(owner.timestamp_ms),
                "Camera move rejected"
            );
        }

        accepted
    }

    /// Submit a [`CameraMoveRequest`].
    pub fn submit(&self, request: CameraMoveRequest) -> bool {
        self.request(request.source, request.timestamp_ms)
    }

    /// Submit a request stamped with the arbiter's own monotonic clock.
    pub fn request_now(&self, source: MoveSource) -> bool {
        self.request(source, self.now_ms())
    }

    /// Record a manual pan/zoom; always takes ownership.
    pub fn mark_manual(&self, now_ms: u64) {
        let mut owner = self.owner.lock();
        *owner = Owner {
            source: MoveSource::UserManual,
            timestamp_ms: now_ms,
            claimed: true,
        };
        tracing::trace!(now_ms, "Camera marked as manually moved");
    }

    /// [`mark_manual`](Self::mark_manual) stamped with the arbiter's clock.
    pub fn mark_manual_now(&self) {
        self.mark_manual(self.now_ms());
    }

    /// Current owner as `(source, timestamp_ms)`.
    pub fn current(&self) -> (MoveSource, u64) {
        let owner = self.owner.lock();
        (owner.source, owner.timestamp_ms)
    }

    /// Milliseconds since this arbiter was created.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis().min(u64::MAX as u128) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_initial_state() {
        let arbiter = CameraMoveArbiter::new();
        assert_eq!(arbiter.current(), (MoveSource::MapInit, 0));
        assert_eq!(arbiter.timeout(), Duration::from_millis(3_000));
    }

    #[test]
    fn test_priority_order() {
        let order = [
            MoveSource::GpsAutoLocate,
            MoveSource::MapInit,
            MoveSource::UserPointSelect,
            MoveSource::SearchResult,
            MoveSource::UserManual,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].priority() < pair[1].priority());
        }
    }

    #[test]
    fn test_documented_sequence() {
        let arbiter = CameraMoveArbiter::new();
        assert!(arbiter.request(MoveSource::GpsAutoLocate, 0));
        assert!(arbiter.request(MoveSource::MapInit, 1_000));
        assert!(!arbiter.request(MoveSource::GpsAutoLocate, 1_500));
        assert!(arbiter.request(MoveSource::GpsAutoLocate, 4_001));
        assert_eq!(arbiter.current(), (MoveSource::GpsAutoLocate, 4_001));
    }

    #[test]
    fn test_timeout_boundary_is_exclusive() {
        let arbiter = CameraMoveArbiter::new();
        assert!(arbiter.request(MoveSource::SearchResult, 1_000));
        assert!(!arbiter.request(MoveSource::UserPointSelect, 4_000));
        assert!(arbiter.request(MoveSource::UserPointSelect, 4_001));
    }

    #[test]
    fn test_equal_priority_overrides() {
        let arbiter = CameraMoveArbiter::new();
        assert!(arbiter.request(MoveSource::UserPointSelect, 100));
        assert!(arbiter.request(MoveSource::UserPointSelect, 200));
        assert_eq!(arbiter.current(), (MoveSource::UserPointSelect, 200));
    }

    #[test]
    fn test_rejected_request_keeps_owner() {
        let arbiter = CameraMoveArbiter::new();
        assert!(arbiter.request(MoveSource::SearchResult, 100));
        assert!(!arbiter.request(MoveSource::GpsAutoLocate, 200));
        assert_eq!(arbiter.current(), (MoveSource::SearchResult, 100));
    }

    #[test]
    fn test_mark_manual_always_wins() {
        let arbiter = CameraMoveArbiter::new();
        arbiter.mark_manual(500);
        assert_eq!(arbiter.current(), (MoveSource::UserManual, 500));
        assert!(!arbiter.request(MoveSource::SearchResult, 1_000));
        assert!(arbiter.request(MoveSource::SearchResult, 3_501));
    }

    #[test]
    fn test_clock_going_backwards_does_not_expire() {
        let arbiter = CameraMoveArbiter::new();
        assert!(arbiter.request(MoveSource::SearchResult, 10_000));
        assert!(!arbiter.request(MoveSource::GpsAutoLocate, 5_000));
    }

    #[test]
    fn test_custom_timeout() {
        let arbiter = CameraMoveArbiter::with_timeout(Duration::from_millis(100));
        assert!(arbiter.submit(CameraMoveRequest::new(MoveSource::SearchResult, 0)));
        assert!(arbiter.submit(CameraMoveRequest::new(MoveSource::GpsAutoLocate, 101)));
    }

    #[test]
    fn test_zero_timeout_keeps_arbitration() {
        let arbiter = CameraMoveArbiter::with_timeout(Duration::ZERO);
        assert_eq!(arbiter.timeout(), DEFAULT_TIMEOUT);
        assert!(arbiter.request(MoveSource::SearchResult, 0));
        assert!(!arbiter.request(MoveSource::GpsAutoLocate, 1));
    }

    #[test]
    fn test_request_now_uses_own_clock() {
        let arbiter = CameraMoveArbiter::new();
        assert!(arbiter.request_now(MoveSource::SearchResult));
        assert!(!arbiter.request_now(MoveSource::GpsAutoLocate));
    }

    #[test]
    fn test_concurrent_requests_serialize() {
        let arbiter = Arc::new(CameraMoveArbiter::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let arbiter = Arc::clone(&arbiter);
                thread::spawn(move || {
                    for t in 0..100u64 {
                        let source = if (i + t) % 2 == 0 {
                            MoveSource::SearchResult
                        } else {
                            MoveSource::UserPointSelect
                        };
                        arbiter.request(source, t);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let (source, _) = arbiter.current();
        assert!(matches!(
            source,
            MoveSource::SearchResult | MoveSource::UserPointSelect
        ));
    }
}
