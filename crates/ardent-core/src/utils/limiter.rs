// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Frame-rate limiting for the engine's loop threads.

use std::thread;
use std::time::{Duration, Instant};

/// Paces a loop to a fixed number of ticks per second.
///
/// The update thread, every render pipeline thread and the platform event pump each
/// own one. A loop calls [`start`](Limiter::start) once, then
/// [`end_tick`](Limiter::end_tick) at the end of every iteration; `end_tick` sleeps
/// for whatever is left of the tick period. A rate of `0` disables pacing.
#[derive(Debug, Clone)]
pub struct Limiter {
    rate: f64,
    tick_start: Instant,
    last_delta: Duration,
    ticks: u64,
}

impl Limiter {
    /// Creates a limiter targeting `rate` ticks per second.
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.max(0.0),
            tick_start: Instant::now(),
            last_delta: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Marks the beginning of the first tick.
    pub fn start(&mut self) {
        self.tick_start = Instant::now();
        self.ticks = 0;
    }

    /// Ends the current tick, sleeping until the tick period is over.
    pub fn end_tick(&mut self) {
        if let Some(period) = self.period() {
            let spent = self.tick_start.elapsed();
            if spent < period {
                thread::sleep(period - spent);
            }
        }
        let now = Instant::now();
        self.last_delta = now - self.tick_start;
        self.tick_start = now;
        self.ticks += 1;
    }

    /// Changes the target rate. Takes effect on the next `end_tick`.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate.max(0.0);
    }

    /// The target rate in ticks per second (`0` means unlimited).
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Duration of a tick, or `None` when unlimited.
    pub fn period(&self) -> Option<Duration> {
        (self.rate > 0.0).then(|| Duration::from_secs_f64(1.0 / self.rate))
    }

    /// Wall-clock duration of the last completed tick.
    pub fn delta(&self) -> Duration {
        self.last_delta
    }

    /// Number of ticks completed since `start`.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paces_ticks_to_the_rate() {
        let mut limiter = Limiter::new(50.0);
        limiter.start();
        let begin = Instant::now();
        for _ in 0..5 {
            limiter.end_tick();
        }
        // 5 ticks at 50 Hz are at least 100ms.
        assert!(begin.elapsed() >= Duration::from_millis(95));
        assert_eq!(limiter.ticks(), 5);
        assert!(limiter.delta() >= Duration::from_millis(15));
    }

    #[test]
    fn zero_rate_is_unlimited() {
        let mut limiter = Limiter::new(0.0);
        assert!(limiter.period().is_none());
        limiter.start();
        let begin = Instant::now();
        for _ in 0..100 {
            limiter.end_tick();
        }
        assert!(begin.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn negative_rates_clamp_to_unlimited() {
        let mut limiter = Limiter::new(-3.0);
        assert_eq!(limiter.rate(), 0.0);
        limiter.set_rate(120.0);
        assert_eq!(limiter.period(), Some(Duration::from_secs_f64(1.0 / 120.0)));
    }
}
