//! Batch dispatch of load requests

use crate::stats::StatsAggregator;
use std::sync::Arc;
use std::time::Duration;
use surge_core::TestConfig;
use surge_http::RequestSender;
use tracing::{debug, trace};

/// Fires batches of calls without waiting for them
///
/// Each call runs in its own task, bounded only by `request_timeout`, and
/// records exactly one outcome. Nothing limits how many calls are in flight:
/// when the target is slower than the tick cadence, batches pile up.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn RequestSender>,
    request_timeout: Duration,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn RequestSender>, request_timeout: Duration) -> Self {
        Self {
            sender,
            request_timeout,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Launch `concurrency` calls for `config`, returning immediately
    ///
    /// Must be called from within a tokio runtime.
    pub fn fire_batch(&self, config: &TestConfig, stats: &Arc<StatsAggregator>) -> u32 {
        let request = Arc::new(config.request_spec());
        let batch = config.concurrency();

        for _ in 0..batch {
            let sender = Arc::clone(&self.sender);
            let stats = Arc::clone(stats);
            let request = Arc::clone(&request);
            let timeout = self.request_timeout;

            stats.call_started();
            tokio::spawn(async move {
                let success = match tokio::time::timeout(timeout, sender.send(&request)).await {
                    Ok(Ok(response)) => {
                        trace!(
                            "{} {} -> {} in {:?}",
                            request.method,
                            request.url,
                            response.status,
                            response.latency
                        );
                        true
                    }
                    Ok(Err(e)) => {
                        debug!("Request to {} failed: {}", request.url, e);
                        false
                    }
                    Err(_) => {
                        debug!("Request to {} timed out after {:?}", request.url, timeout);
                        false
                    }
                };
                stats.record_outcome(success);
                stats.call_finished();
            });
        }

        batch
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
