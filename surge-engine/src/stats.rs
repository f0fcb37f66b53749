//! Per-run statistics aggregation
//!
//! Every counter and the throughput history of a run sit behind a single
//! mutex, so a snapshot can never observe a total without the matching
//! success or failure increment. Completion handlers, the tick task and
//! pollers all go through the same lock; none of them holds it across an
//! await point.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use surge_core::{RpsSample, RunSnapshot};
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug)]
struct RunState {
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    current_tick_requests: u64,
    history: VecDeque<RpsSample>,
    tick_opened: Instant,
}

/// Counters and bounded throughput history for one run
#[derive(Debug)]
pub struct StatsAggregator {
    state: Mutex<RunState>,
    capacity: usize,
    tick_millis: u64,
    in_flight: AtomicU64,
    idle: Notify,
}

impl StatsAggregator {
    /// Create an aggregator sampling once per second
    pub fn new(capacity: usize) -> Self {
        Self::with_tick_interval(capacity, Duration::from_secs(1))
    }

    /// Create an aggregator for a custom tick interval
    ///
    /// Samples are always expressed per second: with a 500ms tick the
    /// number of completions in the tick is doubled.
    pub fn with_tick_interval(capacity: usize, tick_interval: Duration) -> Self {
        Self {
            state: Mutex::new(RunState {
                started_at: Utc::now(),
                ended_at: None,
                total_requests: 0,
                successful_requests: 0,
                failed_requests: 0,
                current_tick_requests: 0,
                history: VecDeque::with_capacity(capacity.min(1024)),
                tick_opened: Instant::now(),
            }),
            capacity: capacity.max(1),
            tick_millis: (tick_interval.as_millis() as u64).max(1),
            in_flight: AtomicU64::new(0),
            idle: Notify::new(),
        }
    }

    /// Record the outcome of one resolved call
    pub fn record_outcome(&self, success: bool) {
        let mut state = self.state.lock();
        state.total_requests += 1;
        if success {
            state.successful_requests += 1;
        } else {
            state.failed_requests += 1;
        }
        state.current_tick_requests += 1;
    }

    /// Close the current tick and append its throughput to the history
    ///
    /// `elapsed_seconds` below the newest sample is raised to it, keeping the
    /// series non-decreasing.
    pub fn roll_tick(&self, elapsed_seconds: u64) -> RpsSample {
        let mut state = self.state.lock();
        let rps = state.current_tick_requests * 1000 / self.tick_millis;
        self.roll_locked(&mut state, elapsed_seconds, rps)
    }

    /// Roll whatever the unfinished tick collected, if anything
    ///
    /// Used at finalization so completions that landed after the last full
    /// tick still show up in the history. The sample is placed one second
    /// after the newest one and its rate is taken over the time the tick was
    /// actually open.
    pub fn flush_partial_tick(&self) -> Option<RpsSample> {
        let open_for = self.state.lock().tick_opened.elapsed();
        self.flush_partial_tick_over(open_for)
    }

    /// [`flush_partial_tick`](Self::flush_partial_tick) with an explicit
    /// length for the unfinished tick
    pub fn flush_partial_tick_over(&self, open_for: Duration) -> Option<RpsSample> {
        let mut state = self.state.lock();
        if state.current_tick_requests == 0 {
            return None;
        }
        let next = state
            .history
            .back()
            .map(|sample| sample.elapsed_seconds + 1)
            .unwrap_or(1);

        // Rounded, so a tick that ran a few millis long does not lose a request
        let millis = (open_for.as_millis() as u64).max(1);
        let rps = (state.current_tick_requests * 1000 + millis / 2) / millis;
        Some(self.roll_locked(&mut state, next, rps))
    }

    fn roll_locked(&self, state: &mut RunState, elapsed_seconds: u64, rps: u64) -> RpsSample {
        let floor = state
            .history
            .back()
            .map(|sample| sample.elapsed_seconds)
            .unwrap_or(0);

        let sample = RpsSample {
            elapsed_seconds: elapsed_seconds.max(floor),
            requests_per_second: rps,
        };
        state.current_tick_requests = 0;
        state.tick_opened = Instant::now();

        if state.history.len() == self.capacity {
            state.history.pop_front();
        }
        state.history.push_back(sample);
        sample
    }

    /// Stamp the end of the run
    pub fn finish(&self, ended_at: DateTime<Utc>) {
        self.state.lock().ended_at = Some(ended_at);
    }

    /// Consistent point-in-time copy of the run state
    pub fn snapshot(&self) -> RunSnapshot {
        let state = self.state.lock();
        RunSnapshot {
            started_at: state.started_at,
            ended_at: state.ended_at,
            total_requests: state.total_requests,
            successful_requests: state.successful_requests,
            failed_requests: state.failed_requests,
            current_tick_requests: state.current_tick_requests,
            history: state.history.iter().copied().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn call_started(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn call_finished(&self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }

    /// Calls launched but not yet resolved
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Resolve once no call is in flight
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}
