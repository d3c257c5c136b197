use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Snapshot of a backend's usage counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Successful writes.
    pub entries: u64,
    /// Successful reads.
    pub reads: u64,
}

/// Process-lifetime counters owned by one backend.
///
/// Counting only happens when profiling is enabled. Counters are never reset.
#[derive(Debug, Default)]
pub struct StatsCounter {
    profiling: bool,
    entries: AtomicU64,
    reads: AtomicU64,
}

impl StatsCounter {
    pub fn new(profiling: bool) -> Self {
        Self {
            profiling,
            ..Default::default()
        }
    }

    pub fn record_entry(&self) {
        if self.profiling {
            self.entries.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_read(&self) {
        if self.profiling {
            self.reads.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> Stats {
        Stats {
            entries: self.entries.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn disabled_profiling_counts_nothing() {
        let counter = StatsCounter::new(false);
        counter.record_entry();
        counter.record_read();
        assert_eq!(counter.snapshot(), Stats::default());
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let counter = Arc::new(StatsCounter::new(true));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.record_entry();
                        counter.record_read();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(
            counter.snapshot(),
            Stats {
                entries: 8000,
                reads: 8000
            }
        );
    }
}
