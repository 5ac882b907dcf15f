use std::collections::VecDeque;
use std::time::Instant;

/// Pages-per-minute over the most recent arrivals
#[derive(Debug, Clone)]
pub struct ScanRate {
    arrivals: VecDeque<Instant>,
    window: usize,
}

impl Default for ScanRate {
    fn default() -> Self {
        Self::new(20)
    }
}

impl ScanRate {
    pub fn new(window: usize) -> Self {
        Self {
            arrivals: VecDeque::with_capacity(window),
            window: window.max(2),
        }
    }

    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    pub fn record_at(&mut self, at: Instant) {
        if self.arrivals.len() == self.window {
            self.arrivals.pop_front();
        }
        self.arrivals.push_back(at);
    }

    /// `None` until two scans arrived, or while they span under a second
    pub fn pages_per_minute(&self) -> Option<f64> {
        let (first, last) = (self.arrivals.front()?, self.arrivals.back()?);
        let elapsed = last.duration_since(*first).as_secs_f64();
        if self.arrivals.len() < 2 || elapsed < 1.0 {
            return None;
        }
        Some((self.arrivals.len() - 1) as f64 / elapsed * 60.0)
    }

    pub fn reset(&mut self) {
        self.arrivals.clear();
    }
}
