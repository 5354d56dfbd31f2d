//! Frame pacing
//!
//! The pipeline runs once per captured frame at a fixed target rate,
//! independent of any display refresh. The pacer schedules the next tick no
//! sooner than one frame interval after the previous tick began, and keeps
//! simple timing statistics for diagnostics.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// Default frame-processing rate in frames per second
pub const DEFAULT_FPS: u32 = 15;

/// Cooperative fixed-rate tick scheduler
#[derive(Debug)]
pub struct FramePacer {
    frame_budget: Duration,
    deadline_misses: u64,
    worst_case: Duration,
    total_ticks: u64,
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            frame_budget: Duration::from_millis(1000 / fps as u64),
            deadline_misses: 0,
            worst_case: Duration::ZERO,
            total_ticks: 0,
        }
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// Ticks whose work overran the frame budget
    pub fn deadline_misses(&self) -> u64 {
        self.deadline_misses
    }

    /// Longest observed tick duration
    pub fn worst_case(&self) -> Duration {
        self.worst_case
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Run `tick_fn` repeatedly until it breaks.
    ///
    /// Each tick's work is synchronous and completes before the next tick is
    /// scheduled; there are never overlapping invocations. When a tick
    /// finishes under budget, the remainder of the interval is slept away.
    /// Breaking halts pacing immediately; releasing the camera or other
    /// capture resources is the caller's concern.
    pub fn run<F>(&mut self, mut tick_fn: F)
    where
        F: FnMut() -> ControlFlow<()>,
    {
        loop {
            let tick_start = Instant::now();
            let flow = tick_fn();
            let elapsed = tick_start.elapsed();

            if elapsed > self.frame_budget {
                self.deadline_misses += 1;
            }
            if elapsed > self.worst_case {
                self.worst_case = elapsed;
            }
            self.total_ticks += 1;

            if flow.is_break() {
                return;
            }

            if elapsed < self.frame_budget {
                std::thread::sleep(self.frame_budget - elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_stops_on_break() {
        let mut pacer = FramePacer::new(1000);
        let mut ticks = 0;

        pacer.run(|| {
            ticks += 1;
            if ticks == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(ticks, 3);
        assert_eq!(pacer.total_ticks(), 3);
    }

    #[test]
    fn test_overrunning_tick_counts_as_deadline_miss() {
        let mut pacer = FramePacer::new(1000); // 1 ms budget
        let mut first = true;

        pacer.run(|| {
            if first {
                first = false;
                std::thread::sleep(Duration::from_millis(5));
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });

        assert_eq!(pacer.deadline_misses(), 1);
        assert!(pacer.worst_case() >= Duration::from_millis(5));
    }

    #[test]
    fn test_default_budget_targets_fifteen_hz() {
        let pacer = FramePacer::default();
        assert_eq!(pacer.frame_budget(), Duration::from_millis(66));
    }
}
