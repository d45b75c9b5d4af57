//! Daily timers: report fan-out to every group and the retention sweep.
//!
//! Each timer is an independent tokio task that sleeps until the next UTC occurrence
//! of its time of day, runs its job and re-arms. A failing job never stops its timer.

use crate::domain::schedule::next_daily_occurrence;
use crate::domain::{ReportOutcome, ScheduleConfig};
use crate::ports::ChatTransport;
use crate::usecases::message_store::MessageStore;
use crate::usecases::report_service::ReportService;
use chrono::{DateTime, NaiveTime, Utc};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Pause between two chats of one fan-out.
pub const FANOUT_DELAY: Duration = Duration::from_secs(2);

/// Result of one pass over all groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutSummary {
    pub sent: usize,
    /// Groups with no messages in the last 24h.
    pub skipped: usize,
    pub failed: usize,
}

pub struct ReportScheduler {
    transport: Arc<dyn ChatTransport>,
    reports: Arc<ReportService>,
    store: Arc<MessageStore>,
    schedule: ScheduleConfig,
    fanout_delay: Duration,
    scheduled: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ReportScheduler {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        reports: Arc<ReportService>,
        store: Arc<MessageStore>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            transport,
            reports,
            store,
            schedule,
            fanout_delay: FANOUT_DELAY,
            scheduled: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Arm the report and cleanup timers. Returns `false` if they were already armed.
    pub fn start_scheduling(self: &Arc<Self>) -> bool {
        if self.scheduled.swap(true, Ordering::SeqCst) {
            info!("daily reports already scheduled");
            return false;
        }

        let report_job = Arc::clone(self);
        let report_timer = spawn_daily(self.schedule.report_time, move || {
            let scheduler = Arc::clone(&report_job);
            async move {
                info!("starting scheduled daily reports");
                let summary = scheduler.send_reports_to_all_groups().await;
                info!(
                    sent = summary.sent,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "scheduled daily reports finished"
                );
            }
        });

        let cleanup_job = Arc::clone(self);
        let cleanup_timer = spawn_daily(self.schedule.cleanup_time(), move || {
            let scheduler = Arc::clone(&cleanup_job);
            async move {
                scheduler.run_cleanup().await;
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        tasks.push(report_timer);
        tasks.push(cleanup_timer);

        info!(
            report_time = %self.schedule.report_time_label(),
            cleanup_time = %self.schedule.cleanup_time_label(),
            retention_days = self.schedule.retention_days,
            "daily reports scheduled (UTC)"
        );
        true
    }

    /// Cancel both timers. A later `start_scheduling` re-arms them.
    pub fn stop_scheduling(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
        if self.scheduled.swap(false, Ordering::SeqCst) {
            info!("daily report scheduling stopped");
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.load(Ordering::SeqCst)
    }

    /// Number of armed timers.
    #[cfg(test)]
    pub fn timer_count(&self) -> usize {
        self.tasks
            .lock()
            .map(|t| t.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Deliver the daily report to every group, one chat at a time.
    ///
    /// Failures are contained per chat: logged, counted and never reported to the chat.
    pub async fn send_reports_to_all_groups(&self) -> FanOutSummary {
        let mut summary = FanOutSummary::default();

        let groups = match self.transport.group_chats().await {
            Ok(chats) => chats,
            Err(e) => {
                error!(error = %e, "failed to list group chats");
                return summary;
            }
        };
        let groups: Vec<_> = groups.into_iter().filter(|c| c.is_group()).collect();
        info!(count = groups.len(), "sending reports to groups");

        for (i, chat) in groups.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.fanout_delay).await;
            }
            match self.reports.deliver_daily_report(&chat.id).await {
                Ok(ReportOutcome::Sent { .. }) => summary.sent += 1,
                Ok(ReportOutcome::NoMessages) => summary.skipped += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        chat_id = %chat.id,
                        title = %chat.title,
                        error = %e,
                        "failed to send report to group"
                    );
                }
            }
        }
        summary
    }

    /// Delete messages past the retention horizon. Returns the number removed.
    pub async fn run_cleanup(&self) -> u64 {
        let days = self.schedule.retention_days;
        info!(retention_days = days, "starting message cleanup");
        self.store.purge_older_than(days).await
    }
}

/// Spawn a task running `job` every day at `at` (UTC).
fn spawn_daily<F, Fut>(at: NaiveTime, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut after = Utc::now();
        loop {
            let next = next_daily_occurrence(after, at);
            tokio::time::sleep(until(next)).await;
            job().await;
            // Never re-fire the same occurrence, even if the clock lags the timer.
            after = next.max(Utc::now());
        }
    })
}

fn until(at: DateTime<Utc>) -> Duration {
    (at - Utc::now()).to_std().unwrap_or_else(|_| {
        warn!(%at, "scheduled time already passed, running now");
        Duration::ZERO
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockBackend;
    use crate::domain::{Chat, ChatKind};
    use crate::test_support::{InMemoryRepo, RecordingTransport};
    use crate::usecases::report_composer::ReportComposer;
    use chrono::{Duration as ChronoDuration, Timelike};

    fn group(id: &str) -> Chat {
        Chat {
            id: id.into(),
            title: format!("Team {}", id),
            kind: ChatKind::Supergroup,
        }
    }

    fn scheduler(
        repo: Arc<InMemoryRepo>,
        transport: Arc<RecordingTransport>,
        schedule: ScheduleConfig,
    ) -> Arc<ReportScheduler> {
        let store = Arc::new(MessageStore::new(repo));
        let composer = Arc::new(ReportComposer::new(Arc::new(MockBackend::new())));
        let reports = Arc::new(ReportService::new(
            store.clone(),
            composer,
            transport.clone(),
        ));
        Arc::new(ReportScheduler::new(transport, reports, store, schedule))
    }

    #[tokio::test(start_paused = true)]
    async fn fan_out_contains_failures_and_paces_chats() {
        let repo = Arc::new(InMemoryRepo::new());
        for id in ["G1", "G2", "G3"] {
            repo.seed(id, "worked on the release", Utc::now());
        }
        let transport = Arc::new(
            RecordingTransport::new()
                .with_groups(vec![group("G1"), group("G2"), group("G3")])
                .failing_sends_to("G2"),
        );
        let s = scheduler(repo, transport.clone(), ScheduleConfig::default());

        let started = tokio::time::Instant::now();
        let summary = s.send_reports_to_all_groups().await;
        let elapsed = started.elapsed();

        assert_eq!(
            summary,
            FanOutSummary {
                sent: 2,
                skipped: 0,
                failed: 1
            }
        );
        assert_eq!(transport.sent_to("G1").len(), 1);
        assert_eq!(transport.sent_to("G3").len(), 1);
        assert!(transport.sent_to("G2").is_empty());
        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_groups_and_non_groups_are_skipped() {
        let repo = Arc::new(InMemoryRepo::new());
        repo.seed("G1", "hello", Utc::now());
        repo.seed("DM", "hello", Utc::now());
        let dm = Chat {
            id: "DM".into(),
            title: "Alice".into(),
            kind: ChatKind::Private,
        };
        let transport = Arc::new(
            RecordingTransport::new().with_groups(vec![group("G1"), group("QUIET"), dm]),
        );
        let s = scheduler(repo, transport.clone(), ScheduleConfig::default());

        let summary = s.send_reports_to_all_groups().await;
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.skipped, 1);
        assert!(transport.sent_to("DM").is_empty());
    }

    #[tokio::test]
    async fn start_scheduling_is_idempotent() {
        let s = scheduler(
            Arc::new(InMemoryRepo::new()),
            Arc::new(RecordingTransport::new()),
            ScheduleConfig::default(),
        );
        assert!(s.start_scheduling());
        assert!(!s.start_scheduling());
        assert_eq!(s.timer_count(), 2);

        s.stop_scheduling();
        assert!(!s.is_scheduled());
        assert!(s.start_scheduling());
        assert_eq!(s.timer_count(), 2);
        s.stop_scheduling();
    }

    #[tokio::test(start_paused = true)]
    async fn timers_fire_at_configured_times() {
        let repo = Arc::new(InMemoryRepo::new());
        repo.seed("G1", "standup notes", Utc::now());
        repo.seed("G1", "ancient", Utc::now() - ChronoDuration::days(30));
        let transport = Arc::new(RecordingTransport::new().with_groups(vec![group("G1")]));

        let soon = (Utc::now() + ChronoDuration::minutes(2)).time();
        let report_time = soon.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap();
        let schedule = ScheduleConfig {
            report_time,
            cleanup_offset_minutes: 1,
            retention_days: 14,
        };
        let s = scheduler(repo.clone(), transport.clone(), schedule);
        assert!(s.start_scheduling());

        tokio::time::sleep(Duration::from_secs(5 * 60)).await;

        assert_eq!(transport.sent_to("G1").len(), 1);
        assert_eq!(repo.texts("G1"), vec!["standup notes"]);
        s.stop_scheduling();
    }

    #[tokio::test]
    async fn cleanup_reports_removed_count() {
        let repo = Arc::new(InMemoryRepo::new());
        repo.seed("G1", "old", Utc::now() - ChronoDuration::days(15));
        repo.seed("G1", "new", Utc::now());
        let s = scheduler(
            repo,
            Arc::new(RecordingTransport::new()),
            ScheduleConfig::default(),
        );
        assert_eq!(s.run_cleanup().await, 1);
    }
}
