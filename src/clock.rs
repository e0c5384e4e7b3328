use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock milliseconds since the unix epoch
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Production time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Hand-driven time source for tests and replays.
/// Clones share the same underlying instant.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Elapsed-time tracker for one play-through. Holds no timers; elapsed
/// time is derived from the recorded start instant on demand.
#[derive(Clone)]
pub struct SessionClock {
    source: Arc<dyn TimeSource>,
    started_at_ms: Option<u64>,
    running: bool,
    frozen_ms: u64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::with_source(Arc::new(SystemTimeSource))
    }

    pub fn with_source(source: Arc<dyn TimeSource>) -> Self {
        Self {
            source,
            started_at_ms: None,
            running: false,
            frozen_ms: 0,
        }
    }

    /// No-op while running
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.started_at_ms = Some(self.source.now_ms());
        self.frozen_ms = 0;
        self.running = true;
    }

    /// Freeze and return elapsed milliseconds
    pub fn stop(&mut self) -> u64 {
        if self.running {
            self.frozen_ms = self.live_elapsed();
            self.running = false;
        }
        self.frozen_ms
    }

    pub fn reset(&mut self) {
        self.started_at_ms = None;
        self.running = false;
        self.frozen_ms = 0;
    }

    pub fn elapsed_ms(&self) -> u64 {
        if self.running {
            self.live_elapsed()
        } else {
            self.frozen_ms
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    fn live_elapsed(&self) -> u64 {
        match self.started_at_ms {
            Some(start) => self.source.now_ms().saturating_sub(start),
            None => 0,
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClock")
            .field("started_at_ms", &self.started_at_ms)
            .field("running", &self.running)
            .field("elapsed_ms", &self.elapsed_ms())
            .finish()
    }
}
