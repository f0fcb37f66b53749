//! Run lifecycle: Idle <-> Running
//!
//! The controller state is one mutex-guarded enum. Finalizing a run means
//! taking it out of that enum under the lock, which makes the transition
//! happen at most once per run: a manual stop, the deadline task and a
//! shutdown race for the same `Running` value and only the first one gets it.
//! The background tasks carry the id of the run they were spawned for and do
//! nothing once the active run has a different id or there is none.
//!
//! Reaching the deadline stops the ticks at once but finalizes only after the
//! calls still in flight have resolved, at most one request timeout later.
//! Until then the run is still reported as running. `stop` and `shutdown`
//! finalize immediately.

use crate::dispatch::Dispatcher;
use crate::reports::ReportStore;
use crate::settings::EngineSettings;
use crate::stats::StatsAggregator;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use surge_core::{
    EngineError, LifecycleError, Report, RunId, RunSnapshot, StopReason, TestConfig,
    TestConfigRequest,
};
use surge_http::RequestSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Statistics returned by [`TestController::poll_status`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RunStats {
    /// Counters of the active run
    Live(RunSnapshot),
    /// The most recent stored report while idle
    Finished(Report),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub is_running: bool,
    pub stats: Option<RunStats>,
    pub elapsed_seconds: f64,
}

struct ActiveRun {
    id: RunId,
    config: Arc<TestConfig>,
    stats: Arc<StatsAggregator>,
    started: Instant,
    /// Set when the deadline is reached and the run is draining
    stopped: Option<(Instant, DateTime<Utc>)>,
    tick_task: Option<JoinHandle<()>>,
    deadline_task: Option<JoinHandle<()>>,
}

impl ActiveRun {
    fn cancel_tasks(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            handle.abort();
        }
        // Aborting from inside the deadline task only takes effect at its
        // next await, after finalization has completed
        if let Some(handle) = self.deadline_task.take() {
            handle.abort();
        }
    }
}

enum ControllerState {
    Idle,
    Running(ActiveRun),
}

struct ControllerInner {
    state: Mutex<ControllerState>,
    reports: ReportStore,
    dispatcher: Dispatcher,
    settings: EngineSettings,
}

/// Owns at most one load test run
#[derive(Clone)]
pub struct TestController {
    inner: Arc<ControllerInner>,
}

impl TestController {
    pub fn new(sender: Arc<dyn RequestSender>, settings: EngineSettings) -> Self {
        let dispatcher = Dispatcher::new(sender, settings.request_timeout);
        Self {
            inner: Arc::new(ControllerInner {
                state: Mutex::new(ControllerState::Idle),
                reports: ReportStore::new(settings.report_capacity),
                dispatcher,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    /// Validate `request` and start a run
    pub fn start(&self, request: TestConfigRequest) -> Result<RunId, EngineError> {
        // Lifecycle is checked first so a busy controller reports AlreadyRunning
        if self.is_running() {
            return Err(LifecycleError::AlreadyRunning.into());
        }
        let config = TestConfig::from_request(request, self.inner.settings.limits)?;
        self.start_with_config(config)
    }

    /// Start a run from an already validated configuration
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_with_config(&self, config: TestConfig) -> Result<RunId, EngineError> {
        let mut state = self.inner.state.lock();
        if matches!(*state, ControllerState::Running(_)) {
            return Err(LifecycleError::AlreadyRunning.into());
        }

        let id = RunId::new();
        let config = Arc::new(config);
        let stats = Arc::new(StatsAggregator::with_tick_interval(
            self.inner.settings.history_capacity,
            self.inner.settings.tick_interval,
        ));

        info!(
            "Starting load test {}: {} {} with {} concurrent requests for {}s",
            id,
            config.method(),
            config.url(),
            config.concurrency(),
            config.duration_secs()
        );

        let tick_task = tokio::spawn(run_ticks(Arc::clone(&self.inner), id));
        let deadline_task = tokio::spawn(run_deadline(
            Arc::clone(&self.inner),
            id,
            config.duration(),
        ));

        *state = ControllerState::Running(ActiveRun {
            id,
            config,
            stats,
            started: Instant::now(),
            stopped: None,
            tick_task: Some(tick_task),
            deadline_task: Some(deadline_task),
        });

        Ok(id)
    }

    /// Stop the active run
    ///
    /// Returns the finalized report, or `None` when the run completed no
    /// request and was discarded.
    pub fn stop(&self) -> Result<Option<Report>, EngineError> {
        let run = self
            .inner
            .take_run(None)
            .ok_or(LifecycleError::NotRunning)?;
        Ok(self.inner.finalize(run, StopReason::Manual))
    }

    /// Finalize any active run because the process is going away
    pub fn shutdown(&self) -> Option<Report> {
        let run = self.inner.take_run(None)?;
        self.inner.finalize(run, StopReason::Shutdown)
    }

    pub fn poll_status(&self) -> StatusView {
        {
            let state = self.inner.state.lock();
            if let ControllerState::Running(run) = &*state {
                let until = run.stopped.map(|(at, _)| at).unwrap_or_else(Instant::now);
                return StatusView {
                    is_running: true,
                    stats: Some(RunStats::Live(run.stats.snapshot())),
                    elapsed_seconds: until.duration_since(run.started).as_secs_f64(),
                };
            }
        }

        match self.inner.reports.latest() {
            Some(report) => StatusView {
                is_running: false,
                elapsed_seconds: report.test_duration_seconds,
                stats: Some(RunStats::Finished(report)),
            },
            None => StatusView {
                is_running: false,
                stats: None,
                elapsed_seconds: 0.0,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.inner.state.lock(), ControllerState::Running(_))
    }

    /// Id of the active run, if any
    pub fn active_run(&self) -> Option<RunId> {
        match &*self.inner.state.lock() {
            ControllerState::Running(run) => Some(run.id),
            ControllerState::Idle => None,
        }
    }

    /// Stored reports, most recent first
    pub fn reports(&self) -> Vec<Report> {
        self.inner.reports.list()
    }

    pub fn report_store(&self) -> &ReportStore {
        &self.inner.reports
    }
}

impl std::fmt::Debug for TestController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestController")
            .field("active_run", &self.active_run())
            .field("reports", &self.inner.reports.len())
            .finish()
    }
}

impl ControllerInner {
    /// Move the active run out, leaving the controller idle
    ///
    /// With `expected` set, only a run with that id is taken.
    fn take_run(&self, expected: Option<RunId>) -> Option<ActiveRun> {
        let mut state = self.state.lock();
        match &*state {
            ControllerState::Running(run) if expected.is_none_or(|id| id == run.id) => {}
            _ => return None,
        }
        match std::mem::replace(&mut *state, ControllerState::Idle) {
            ControllerState::Running(run) => Some(run),
            ControllerState::Idle => None,
        }
    }

    fn finalize(&self, mut run: ActiveRun, reason: StopReason) -> Option<Report> {
        run.cancel_tasks();

        let (ended, ended_at) = run.stopped.unwrap_or_else(|| (Instant::now(), Utc::now()));
        run.stats.flush_partial_tick();
        run.stats.finish(ended_at);
        let report = Report::finalize(
            run.id,
            &run.config,
            run.stats.snapshot(),
            ended.duration_since(run.started),
            reason,
        );

        info!(
            "Load test {} finished ({}): {} requests, {:.1}% success, {:.2} avg rps, {} still in flight",
            report.id,
            reason,
            report.total_requests,
            report.success_percent(),
            report.average_rps,
            run.stats.in_flight()
        );

        if report.is_empty() {
            info!("Load test {} completed no requests, report discarded", report.id);
            return None;
        }

        self.reports.append(report.clone());
        Some(report)
    }

    /// Stop the ticks of run `id` and mark the moment its duration ran out
    ///
    /// Returns the run's aggregator so the caller can wait for it to drain.
    fn begin_drain(&self, id: RunId) -> Option<Arc<StatsAggregator>> {
        let mut state = self.state.lock();
        match &mut *state {
            ControllerState::Running(run) if run.id == id => {
                if let Some(handle) = run.tick_task.take() {
                    handle.abort();
                }
                run.stopped = Some((Instant::now(), Utc::now()));
                Some(Arc::clone(&run.stats))
            }
            _ => None,
        }
    }

    /// Handle tick number `tick` of run `id`; `false` once the run is gone
    fn on_tick(&self, id: RunId, tick: u64) -> bool {
        let state = self.state.lock();
        let run = match &*state {
            ControllerState::Running(run) if run.id == id && run.stopped.is_none() => run,
            _ => return false,
        };

        let offset = self.settings.tick_interval.saturating_mul(tick as u32);
        if tick > 0 {
            let sample = run.stats.roll_tick(offset.as_secs());
            debug!(
                "Run {} tick {}: {} rps, {} in flight",
                id,
                tick,
                sample.requests_per_second,
                run.stats.in_flight()
            );
        }

        // Firing under the lock means no batch can start after finalization
        if offset < run.config.duration() {
            self.dispatcher.fire_batch(&run.config, &run.stats);
        }
        true
    }
}

async fn run_ticks(inner: Arc<ControllerInner>, id: RunId) {
    let mut ticker = tokio::time::interval(inner.settings.tick_interval);
    let mut tick: u64 = 0;
    loop {
        ticker.tick().await;
        if !inner.on_tick(id, tick) {
            break;
        }
        tick += 1;
    }
}

async fn run_deadline(inner: Arc<ControllerInner>, id: RunId, duration: std::time::Duration) {
    tokio::time::sleep(duration).await;
    let Some(stats) = inner.begin_drain(id) else {
        return;
    };

    let pending = stats.in_flight();
    if pending > 0 {
        debug!(
            "Run {} reached its deadline, waiting for {} calls in flight",
            id, pending
        );
        let grace = inner.settings.request_timeout;
        if tokio::time::timeout(grace, stats.wait_idle()).await.is_err() {
            warn!(
                "Run {}: {} calls still unresolved after {:?}, finalizing without them",
                id,
                stats.in_flight(),
                grace
            );
        }
    }

    // A manual stop or shutdown during the drain has already finalized
    if let Some(run) = inner.take_run(Some(id)) {
        inner.finalize(run, StopReason::Deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use surge_core::ConfigError;
    use surge_http::{HttpError, RequestSpec, ResponseSummary};

    /// Completes every call after `delay`
    struct ScriptedSender {
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedSender {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl RequestSender for ScriptedSender {
        async fn send(&self, _request: &RequestSpec) -> Result<ResponseSummary, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(ResponseSummary {
                status: 200,
                latency: self.delay,
            })
        }
    }

    /// Never answers; only the dispatch timeout resolves its calls
    struct HangingSender;

    #[async_trait::async_trait]
    impl RequestSender for HangingSender {
        async fn send(&self, _request: &RequestSpec) -> Result<ResponseSummary, HttpError> {
            std::future::pending().await
        }
    }

    /// Refuses every call after a short delay
    struct RefusingSender;

    #[async_trait::async_trait]
    impl RequestSender for RefusingSender {
        async fn send(&self, _request: &RequestSpec) -> Result<ResponseSummary, HttpError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err(HttpError::ConfigError("connection refused".to_string()))
        }
    }

    fn request(concurrency: i64, duration: i64) -> TestConfigRequest {
        TestConfigRequest {
            url: Some("https://example.test/ok".to_string()),
            method: Some("GET".to_string()),
            concurrency: Some(concurrency),
            duration: Some(duration),
            body: None,
        }
    }

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 0.01
    }

    fn controller(sender: Arc<ScriptedSender>) -> TestController {
        TestController::new(sender, EngineSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_completes_at_deadline() {
        let sender = ScriptedSender::new(Duration::from_millis(100));
        let controller = controller(sender.clone());

        controller.start(request(5, 2)).unwrap();
        assert!(controller.is_running());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!controller.is_running());
        assert_eq!(sender.calls(), 10);

        let reports = controller.reports();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.total_requests, 10);
        assert_eq!(report.successful_requests, 10);
        assert_eq!(report.success_rate, 1.0);
        assert_eq!(report.stop_reason, StopReason::Deadline);
        assert!(approx(report.test_duration_seconds, 2.0));
        assert!(approx(report.average_rps, 5.0));

        let rps: Vec<u64> = report.history.iter().map(|s| s.requests_per_second).collect();
        assert_eq!(rps, vec![5, 5]);
        let elapsed: Vec<u64> = report.history.iter().map(|s| s.elapsed_seconds).collect();
        assert_eq!(elapsed, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_rejected() {
        let controller = controller(ScriptedSender::new(Duration::from_millis(10)));

        let first = controller.start(request(2, 10)).unwrap();
        let err = controller.start(request(3, 5)).unwrap_err();
        assert_eq!(err, EngineError::Lifecycle(LifecycleError::AlreadyRunning));
        assert_eq!(controller.active_run(), Some(first));

        // Even an invalid request reports the lifecycle conflict
        let err = controller.start(request(0, 5)).unwrap_err();
        assert_eq!(err.code(), "ALREADY_RUNNING");

        controller.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_rejected() {
        let controller = controller(ScriptedSender::new(Duration::from_millis(10)));
        let err = controller.stop().unwrap_err();
        assert_eq!(err, EngineError::Lifecycle(LifecycleError::NotRunning));
        assert!(controller.reports().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_creates_no_run() {
        let sender = ScriptedSender::new(Duration::from_millis(10));
        let controller = controller(sender.clone());

        let err = controller.start(request(0, 2)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config(ConfigError::NonPositive {
                field: "concurrency",
                ..
            })
        ));
        assert!(!controller.is_running());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(sender.calls(), 0);
        assert!(controller.reports().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_stop_finalizes_once() {
        let sender = ScriptedSender::new(Duration::from_millis(100));
        let controller = controller(sender.clone());

        controller.start(request(5, 10)).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let report = controller.stop().unwrap().unwrap();
        assert_eq!(report.total_requests, 5);
        assert_eq!(report.stop_reason, StopReason::Manual);
        assert!(approx(report.test_duration_seconds, 0.5));
        assert_eq!(report.history.len(), 1);
        // Five completions in the half second the tick was open
        assert_eq!(report.history[0].requests_per_second, 10);

        // Neither the tick task nor the deadline may act afterwards
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(sender.calls(), 5);
        assert_eq!(controller.reports().len(), 1);
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_deadline_does_not_stop_next_run() {
        let controller = controller(ScriptedSender::new(Duration::from_millis(10)));

        controller.start(request(1, 2)).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        controller.stop().unwrap();

        let second = controller.start(request(1, 10)).unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(controller.active_run(), Some(second));

        tokio::time::sleep(Duration::from_secs(8)).await;
        assert!(!controller.is_running());
        assert_eq!(controller.reports()[0].stop_reason, StopReason::Deadline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_run_is_discarded() {
        // Calls take longer than the time before stop
        let controller = controller(ScriptedSender::new(Duration::from_millis(800)));

        controller.start(request(3, 10)).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(controller.stop().unwrap().is_none());
        assert!(controller.reports().is_empty());
        assert!(controller.poll_status().stats.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_store_keeps_last_three_runs() {
        let controller = controller(ScriptedSender::new(Duration::from_millis(10)));

        for concurrency in 1..=4 {
            controller.start(request(concurrency, 1)).unwrap();
            tokio::time::sleep(Duration::from_millis(1500)).await;
            assert!(!controller.is_running());
        }

        let reports = controller.reports();
        let order: Vec<u32> = reports.iter().map(|r| r.concurrency).collect();
        assert_eq!(order, vec![4, 3, 2]);
        let totals: Vec<u64> = reports.iter().map(|r| r.total_requests).collect();
        assert_eq!(totals, vec![4, 3, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_status_during_and_after_run() {
        let controller = controller(ScriptedSender::new(Duration::from_millis(100)));

        let idle = controller.poll_status();
        assert!(!idle.is_running);
        assert!(idle.stats.is_none());
        assert_eq!(idle.elapsed_seconds, 0.0);

        controller.start(request(4, 3)).unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let live = controller.poll_status();
        assert!(live.is_running);
        assert!(approx(live.elapsed_seconds, 1.5));
        match live.stats {
            Some(RunStats::Live(snapshot)) => {
                assert_eq!(snapshot.total_requests, 8);
                assert!(snapshot.is_consistent());
                assert_eq!(snapshot.history.len(), 1);
                assert!(snapshot.ended_at.is_none());
            }
            other => panic!("expected live stats, got {:?}", other),
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
        let done = controller.poll_status();
        assert!(!done.is_running);
        assert!(approx(done.elapsed_seconds, 3.0));
        match done.stats {
            Some(RunStats::Finished(report)) => assert_eq!(report.total_requests, 12),
            other => panic!("expected finished report, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_finalizes_active_run() {
        let controller = controller(ScriptedSender::new(Duration::from_millis(100)));
        assert!(controller.shutdown().is_none());

        controller.start(request(2, 30)).unwrap();
        tokio::time::sleep(Duration::from_millis(1200)).await;

        let report = controller.shutdown().unwrap();
        assert_eq!(report.stop_reason, StopReason::Shutdown);
        assert_eq!(report.total_requests, 4);
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_target_is_reported_after_timeouts() {
        let controller = TestController::new(Arc::new(HangingSender), EngineSettings::default());

        controller.start(request(5, 2)).unwrap();

        // Deadline passed, calls still pending on their 5s timeout
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(controller.is_running());
        let status = controller.poll_status();
        assert!(approx(status.elapsed_seconds, 2.0));

        tokio::time::sleep(Duration::from_secs(8)).await;
        assert!(!controller.is_running());

        let reports = controller.reports();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.total_requests, 10);
        assert_eq!(report.failed_requests, report.total_requests);
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.stop_reason, StopReason::Deadline);
        assert!(approx(report.test_duration_seconds, 2.0));
        // Late failures are flushed into the history, none left pending
        assert_eq!(report.current_tick_requests, 0);
        assert!(report.history.iter().any(|s| s.requests_per_second > 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failures_still_produce_report() {
        let controller = TestController::new(Arc::new(RefusingSender), EngineSettings::default());

        controller.start(request(3, 2)).unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!controller.is_running());

        let reports = controller.reports();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.total_requests, 6);
        assert_eq!(report.successful_requests, 0);
        assert_eq!(report.failed_requests, 6);
        assert_eq!(report.success_rate, 0.0);
        assert!(!report.history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_drain_finalizes_immediately() {
        let controller = TestController::new(Arc::new(HangingSender), EngineSettings::default());

        controller.start(request(2, 1)).unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(controller.is_running());

        // Nothing has resolved yet, so the run is discarded
        assert!(controller.stop().unwrap().is_none());
        assert!(!controller.is_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(controller.reports().is_empty());
    }
}
