//! User interaction signals and the subscription interface the tracker
//! listens on.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A single user interaction or presence change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivitySignal {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
    FocusGained,
    FocusLost,
    PageVisible,
    PageHidden,
}

impl ActivitySignal {
    /// Signals that mean the user left: activity is treated as stale at once.
    pub fn forces_idle(&self) -> bool {
        matches!(self, ActivitySignal::FocusLost | ActivitySignal::PageHidden)
    }
}

pub type SignalHandler = Arc<dyn Fn(ActivitySignal) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Something the tracker can subscribe to for activity signals.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, handler: SignalHandler) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, SignalHandler)>>,
}

/// In-process fan-out of activity signals.
///
/// Clones share subscribers, so one clone can be handed to an input
/// listener thread while the tracker subscribes through another.
#[derive(Clone, Default)]
pub struct SignalBus {
    inner: Arc<BusInner>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `signal` to every current subscriber.
    pub fn emit(&self, signal: ActivitySignal) {
        // Handlers run outside the lock so they may unsubscribe.
        let handlers: Vec<SignalHandler> = self.inner.handlers.lock().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            handler(signal);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.lock().len()
    }
}

impl EventSource for SignalBus {
    fn subscribe(&self, handler: SignalHandler) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.handlers.lock().push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.handlers.lock().retain(|(sid, _)| *sid != id);
    }
}
