//! Evaluation timing against a per-frame budget
//!
//! The generator runs once per animation frame, so its cost has to stay
//! well inside a frame. `FrameBudget` keeps a rolling window of evaluation
//! times and reports whether the window stays within budget.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Budget of one frame at 60 fps
pub const FRAME_BUDGET_60FPS: Duration = Duration::from_micros(16_667);

/// Statistics over the retained evaluation window
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BudgetStats {
    pub avg_ms: f32,
    pub min_ms: f32,
    pub max_ms: f32,
    pub samples: usize,
    pub over_budget: usize,
}

/// Rolling record of evaluation durations
pub struct FrameBudget {
    budget: Duration,
    window: usize,
    history: VecDeque<Duration>,
    total_samples: u64,
}

impl FrameBudget {
    /// Create a budget tracker keeping the last `window` samples
    pub fn new(budget: Duration, window: usize) -> Self {
        Self {
            budget,
            window: window.max(1),
            history: VecDeque::with_capacity(window.max(1)),
            total_samples: 0,
        }
    }

    /// Run `f`, recording how long it took
    pub fn measure<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(start.elapsed());
        out
    }

    /// Record one evaluation duration
    pub fn record(&mut self, elapsed: Duration) {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(elapsed);
        self.total_samples += 1;
    }

    /// Total samples recorded since creation (including evicted ones)
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// True when every retained sample fits inside the budget
    pub fn within_budget(&self) -> bool {
        self.history.iter().all(|d| *d <= self.budget)
    }

    /// Summary of the retained window
    pub fn stats(&self) -> BudgetStats {
        if self.history.is_empty() {
            return BudgetStats {
                avg_ms: 0.0,
                min_ms: 0.0,
                max_ms: 0.0,
                samples: 0,
                over_budget: 0,
            };
        }

        let mut total = 0.0f32;
        let mut min_ms = f32::INFINITY;
        let mut max_ms = 0.0f32;
        let mut over_budget = 0;

        for d in &self.history {
            let ms = d.as_secs_f32() * 1000.0;
            total += ms;
            min_ms = min_ms.min(ms);
            max_ms = max_ms.max(ms);
            if *d > self.budget {
                over_budget += 1;
            }
        }

        BudgetStats {
            avg_ms: total / self.history.len() as f32,
            min_ms,
            max_ms,
            samples: self.history.len(),
            over_budget,
        }
    }
}

impl Default for FrameBudget {
    fn default() -> Self {
        Self::new(FRAME_BUDGET_60FPS, 120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let budget = FrameBudget::default();
        let stats = budget.stats();
        assert_eq!(stats.samples, 0);
        assert!(budget.within_budget());
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut budget = FrameBudget::new(Duration::from_millis(10), 2);
        budget.record(Duration::from_millis(50));
        budget.record(Duration::from_millis(1));
        budget.record(Duration::from_millis(3));

        let stats = budget.stats();
        assert_eq!(stats.samples, 2);
        assert_eq!(budget.total_samples(), 3);
        assert!(budget.within_budget(), "the 50ms sample should have been evicted");
        assert!((stats.max_ms - 3.0).abs() < 0.01);
        assert!((stats.min_ms - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_over_budget_counted() {
        let mut budget = FrameBudget::new(Duration::from_millis(10), 8);
        budget.record(Duration::from_millis(5));
        budget.record(Duration::from_millis(20));
        assert!(!budget.within_budget());
        assert_eq!(budget.stats().over_budget, 1);
    }

    #[test]
    fn test_measure_returns_value() {
        let mut budget = FrameBudget::default();
        let v = budget.measure(|| 41 + 1);
        assert_eq!(v, 42);
        assert_eq!(budget.stats().samples, 1);
    }
}
