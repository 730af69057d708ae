use crate::model::{Payload, ResourceTab};
use crate::source::DataSource;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval, timeout};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub dashboard: Duration,
    pub resources: Duration,
    pub ping: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            dashboard: Duration::from_secs(60),
            resources: Duration::from_secs(30),
            ping: Duration::from_secs(10),
        }
    }
}

impl PollIntervals {
    pub fn for_target(&self, target: PollTarget) -> Duration {
        match target {
            PollTarget::Tab(ResourceTab::Dashboard) => self.dashboard,
            PollTarget::Tab(_) => self.resources,
            PollTarget::Ping => self.ping,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollTarget {
    Tab(ResourceTab),
    Ping,
}

#[derive(Debug)]
pub enum PollEvent {
    Fetched {
        tab: ResourceTab,
        result: Result<Payload, String>,
    },
    Ping(Result<(), String>),
    ScanFinished(Result<(), String>),
}

/// One repeating task per subscribed target; every task fetches immediately,
/// then on its interval, and never overlaps its own requests.
pub struct Poller {
    source: Arc<dyn DataSource>,
    intervals: PollIntervals,
    fetch_timeout: Duration,
    tx: mpsc::UnboundedSender<PollEvent>,
    tasks: HashMap<PollTarget, JoinHandle<()>>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn DataSource>,
        intervals: PollIntervals,
        request_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<PollEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = Self {
            source,
            intervals,
            fetch_timeout: request_timeout + Duration::from_secs(1),
            tx,
            tasks: HashMap::new(),
        };
        (poller, rx)
    }

    pub fn intervals(&self) -> PollIntervals {
        self.intervals
    }

    pub fn is_subscribed(&self, target: PollTarget) -> bool {
        self.tasks.contains_key(&target)
    }

    /// (Re)starts polling `target`. An existing task is dropped first, so this
    /// doubles as "refresh now".
    pub fn subscribe(&mut self, target: PollTarget) {
        self.unsubscribe(target);
        let period = self.intervals.for_target(target);
        let handle = spawn_poll_task(
            self.source.clone(),
            target,
            period,
            self.fetch_timeout,
            self.tx.clone(),
        );
        self.tasks.insert(target, handle);
    }

    pub fn unsubscribe(&mut self, target: PollTarget) {
        if let Some(task) = self.tasks.remove(&target) {
            task.abort();
        }
    }

    /// Applies new intervals and restarts every running task with them.
    pub fn set_intervals(&mut self, intervals: PollIntervals) {
        if intervals == self.intervals {
            return;
        }
        self.intervals = intervals;
        let targets = self.tasks.keys().copied().collect::<Vec<_>>();
        for target in targets {
            self.subscribe(target);
        }
    }

    pub fn trigger_scan(&self) {
        info!("scan requested");
        let source = self.source.clone();
        let tx = self.tx.clone();
        let limit = self.fetch_timeout;
        tokio::spawn(async move {
            let result = match timeout(limit, source.trigger_scan()).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(error)) => Err(compact_error(&error)),
                Err(_) => Err("scan request timed out".to_string()),
            };
            let _ = tx.send(PollEvent::ScanFinished(result));
        });
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

fn spawn_poll_task(
    source: Arc<dyn DataSource>,
    target: PollTarget,
    period: Duration,
    limit: Duration,
    tx: mpsc::UnboundedSender<PollEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let event = poll_once(source.as_ref(), target, limit).await;
            if tx.send(event).is_err() {
                debug!("poll receiver closed, stopping {target:?}");
                break;
            }
        }
    })
}

async fn poll_once(source: &dyn DataSource, target: PollTarget, limit: Duration) -> PollEvent {
    match target {
        PollTarget::Tab(tab) => {
            let result = match timeout(limit, source.fetch(tab)).await {
                Ok(Ok(payload)) => Ok(payload),
                Ok(Err(error)) => {
                    warn!("refresh failed for {}: {error:#}", tab.title());
                    Err(compact_error(&error))
                }
                Err(_) => Err(format!("refresh timed out for {}", tab.title())),
            };
            PollEvent::Fetched { tab, result }
        }
        PollTarget::Ping => {
            let result = match timeout(limit, source.ping()).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(error)) => Err(compact_error(&error)),
                Err(_) => Err("health check timed out".to_string()),
            };
            PollEvent::Ping(result)
        }
    }
}

pub fn compact_error(error: &anyhow::Error) -> String {
    let mut out = Vec::new();
    for (index, cause) in error.chain().enumerate() {
        if index == 0 {
            out.push(cause.to_string());
        } else if index <= 2 {
            out.push(format!("caused by: {cause}"));
        } else {
            break;
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{PollEvent, PollIntervals, PollTarget, Poller, compact_error};
    use crate::model::ResourceTab;
    use crate::source::MockSource;
    use anyhow::anyhow;
    use std::sync::Arc;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn intervals_pick_per_target() {
        let intervals = PollIntervals::default();
        assert_eq!(
            intervals.for_target(PollTarget::Tab(ResourceTab::Dashboard)),
            Duration::from_secs(60)
        );
        assert_eq!(
            intervals.for_target(PollTarget::Tab(ResourceTab::Logs)),
            Duration::from_secs(30)
        );
        assert_eq!(intervals.for_target(PollTarget::Ping), Duration::from_secs(10));
    }

    #[test]
    fn compact_error_keeps_two_causes() {
        let error = anyhow!("root").context("middle").context("outer").context("top");
        assert_eq!(
            compact_error(&error),
            "top\ncaused by: outer\ncaused by: middle"
        );
    }

    #[tokio::test]
    async fn subscribe_fetches_immediately() {
        let source = Arc::new(MockSource::new(Duration::ZERO));
        let (mut poller, mut rx) = Poller::new(source, PollIntervals::default(), TIMEOUT);
        poller.subscribe(PollTarget::Tab(ResourceTab::Volumes));
        assert!(poller.is_subscribed(PollTarget::Tab(ResourceTab::Volumes)));

        match rx.recv().await {
            Some(PollEvent::Fetched { tab, result }) => {
                assert_eq!(tab, ResourceTab::Volumes);
                assert_eq!(result.unwrap().record_count(), Some(2));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        poller.unsubscribe(PollTarget::Tab(ResourceTab::Volumes));
        assert!(!poller.is_subscribed(PollTarget::Tab(ResourceTab::Volumes)));
    }

    #[tokio::test]
    async fn ping_and_scan_report_back() {
        let source = Arc::new(MockSource::new(Duration::ZERO));
        let (mut poller, mut rx) = Poller::new(source, PollIntervals::default(), TIMEOUT);
        poller.subscribe(PollTarget::Ping);
        assert!(matches!(rx.recv().await, Some(PollEvent::Ping(Ok(())))));

        poller.unsubscribe(PollTarget::Ping);
        poller.trigger_scan();
        assert!(matches!(rx.recv().await, Some(PollEvent::ScanFinished(Ok(())))));
    }

    #[tokio::test]
    async fn new_intervals_keep_subscriptions() {
        let source = Arc::new(MockSource::new(Duration::ZERO));
        let (mut poller, _rx) = Poller::new(source, PollIntervals::default(), TIMEOUT);
        poller.subscribe(PollTarget::Ping);

        let faster = PollIntervals {
            ping: Duration::from_secs(2),
            ..PollIntervals::default()
        };
        poller.set_intervals(faster);
        assert_eq!(poller.intervals(), faster);
        assert!(poller.is_subscribed(PollTarget::Ping));
    }
}
