use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::source::TokenSource;
use super::{now_millis, AuthToken};
use crate::config::SessionConfig;
use crate::error::Error;
use crate::utils::log_throttle::LogThrottle;

const SKIP_LOG_WINDOW: Duration = Duration::from_secs(60);

/// What a single refresh attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new grant was stored.
    Refreshed,
    /// The source handed back a grant that expires no later than the current one.
    Stale,
    /// The token is still outside the expiry margin.
    Fresh,
    /// Another refresh holds the guard.
    InFlight,
    /// The session is failed; nothing is attempted until [`SessionManager::reset`].
    FailStopped,
    /// The fetch was cancelled and the state left untouched.
    Cancelled,
    /// The fetch failed and the session is now failed.
    Failed { status: Option<u16> },
}

/// Owner of the session's [`AuthToken`].
///
/// Readers either take a snapshot or subscribe; the refresh loop started by
/// [`SessionManager::start`] is the only writer. Refreshes are sequenced by an
/// async guard, so at most one fetch is outstanding at a time.
pub struct SessionManager {
    source: Arc<dyn TokenSource>,
    config: SessionConfig,
    state: watch::Sender<AuthToken>,
    refresh_guard: tokio::sync::Mutex<()>,
    task: Mutex<Option<JoinHandle<()>>>,
    throttle: LogThrottle,
}

impl SessionManager {
    pub fn new(source: Arc<dyn TokenSource>, config: SessionConfig) -> Arc<Self> {
        let (state, _) = watch::channel(AuthToken {
            expires_at: now_millis(),
            ..AuthToken::default()
        });
        Arc::new(Self {
            source,
            config,
            state,
            refresh_guard: tokio::sync::Mutex::new(()),
            task: Mutex::new(None),
            throttle: LogThrottle::new(SKIP_LOG_WINDOW),
        })
    }

    /// Change notifications for the token record.
    pub fn subscribe(&self) -> watch::Receiver<AuthToken> {
        self.state.subscribe()
    }

    /// Current record; an expired token is reported as empty.
    pub fn get_snapshot(&self) -> AuthToken {
        self.state.borrow().view_at(now_millis())
    }

    /// Bearer token for CRM calls, when the session is usable.
    pub fn access_token(&self) -> Option<String> {
        let snapshot = self.get_snapshot();
        snapshot
            .is_ready(now_millis())
            .then_some(snapshot.access_token)
    }

    /// One loop iteration: refresh when the token is empty or inside the margin.
    pub async fn tick(&self) -> RefreshOutcome {
        self.run_refresh(false).await
    }

    /// Refresh regardless of expiry. Still honours the fail-stop state and the in-flight guard.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.run_refresh(true).await
    }

    async fn run_refresh(&self, force: bool) -> RefreshOutcome {
        let Ok(_guard) = self.refresh_guard.try_lock() else {
            debug!(event_name = "session.refresh.in_flight", event_domain = "session", "refresh already running");
            return RefreshOutcome::InFlight;
        };

        let current = self.state.borrow().clone();
        let now = now_millis();
        if current.error {
            if let Some(suppressed_count) = self.throttle.should_emit("session.refresh.fail_stopped") {
                debug!(
                    event_name = "session.refresh.fail_stopped",
                    event_domain = "session",
                    suppressed_count,
                    "session failed, not refreshing"
                );
            }
            return RefreshOutcome::FailStopped;
        }
        if !force && !current.needs_refresh(now, self.config.expiry_margin()) {
            return RefreshOutcome::Fresh;
        }

        match self.source.fetch().await {
            Ok(grant) if !current.access_token.is_empty() && grant.expires_at <= current.expires_at => {
                if let Some(suppressed_count) = self.throttle.should_emit("session.refresh.stale") {
                    warn!(
                        event_name = "session.refresh.stale",
                        event_domain = "session",
                        expires_at = grant.expires_at,
                        suppressed_count,
                        "source returned a grant that does not extend the session"
                    );
                }
                RefreshOutcome::Stale
            }
            Ok(grant) => {
                let lifetime = grant.lifetime(now_millis());
                if lifetime <= self.config.expiry_margin() {
                    warn!(
                        event_name = "session.refresh.short_lifetime",
                        event_domain = "session",
                        lifetime_ms = lifetime,
                        margin_ms = self.config.expiry_margin(),
                        "token lifetime does not exceed the expiry margin; it will refresh on every tick"
                    );
                }
                info!(
                    event_name = "session.refresh.succeeded",
                    event_domain = "session",
                    expires_at = grant.expires_at,
                    "session token refreshed"
                );
                self.state.send_replace(AuthToken::from_grant(grant));
                RefreshOutcome::Refreshed
            }
            Err(Error::Cancelled) => {
                debug!(event_name = "session.refresh.cancelled", event_domain = "session", "refresh cancelled");
                RefreshOutcome::Cancelled
            }
            Err(e) => {
                let status = e.status();
                warn!(
                    event_name = "session.refresh.failed",
                    event_domain = "session",
                    status = status.map(u64::from),
                    "session token refresh failed: {}",
                    e
                );
                self.source.invalidate();
                self.state
                    .send_replace(AuthToken::failed(status, current.expires_at));
                RefreshOutcome::Failed { status }
            }
        }
    }

    /// Starts the refresh loop. Returns `false` if it is already running.
    ///
    /// The loop ends on [`SessionManager::stop`], once the session fails, or
    /// when the manager is dropped.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut task = self.lock_task();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let manager: Weak<Self> = Arc::downgrade(self);
        let period = self.config.refresh_interval();
        let first = Instant::now() + self.config.initial_delay();
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                match manager.tick().await {
                    RefreshOutcome::FailStopped | RefreshOutcome::Failed { .. } => {
                        info!(
                            event_name = "session.loop.stopped",
                            event_domain = "session",
                            "refresh loop stopped after failure"
                        );
                        break;
                    }
                    _ => {}
                }
            }
        }));
        info!(
            event_name = "session.loop.started",
            event_domain = "session",
            interval_ms = period.as_millis() as u64,
            "refresh loop started"
        );
        true
    }

    /// Cancels the loop. A fetch in progress is dropped before it writes anything.
    pub fn stop(&self) {
        if let Some(handle) = self.lock_task().take() {
            handle.abort();
            debug!(event_name = "session.loop.cancelled", event_domain = "session", "refresh loop cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Clears a failed session so the loop may run again, as a remount would.
    ///
    /// Waits for a refresh in flight, so its result cannot overwrite the reset.
    pub async fn reset(&self) {
        let _guard = self.refresh_guard.lock().await;
        self.state.send_replace(AuthToken {
            expires_at: now_millis(),
            ..AuthToken::default()
        });
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::TokenGrant;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Hands out grants valid for `lifetime_ms`, optionally waiting for a release signal.
    struct FakeSource {
        calls: AtomicUsize,
        lifetime_ms: i64,
        fail_with: Option<u16>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeSource {
        fn ok(lifetime_ms: i64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                lifetime_ms,
                fail_with: None,
                gate: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl TokenSource for FakeSource {
        async fn fetch(&self) -> Result<TokenGrant> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(status) = self.fail_with {
                return Err(Error::Status {
                    status,
                    message: "rejected".into(),
                });
            }
            Ok(TokenGrant {
                id: "me".into(),
                access_token: format!("token-{}", n),
                expires_at: now_millis() + self.lifetime_ms,
                language: Some("en".into()),
            })
        }
    }

    /// Always hands out the same grant.
    struct FixedSource {
        calls: AtomicUsize,
        expires_at: i64,
    }

    #[async_trait::async_trait]
    impl TokenSource for FixedSource {
        async fn fetch(&self) -> Result<TokenGrant> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TokenGrant {
                id: "me".into(),
                access_token: "fixed".into(),
                expires_at: self.expires_at,
                language: None,
            })
        }
    }

    fn config(margin_ms: u64) -> SessionConfig {
        SessionConfig {
            refresh_interval_ms: 10,
            expiry_margin_ms: margin_ms,
            ..SessionConfig::default()
        }
    }

    #[tokio::test]
    async fn empty_token_is_refreshed_on_first_tick() {
        let source = Arc::new(FakeSource::ok(60_000));
        let manager = SessionManager::new(source.clone(), config(1_000));

        assert_eq!(manager.tick().await, RefreshOutcome::Refreshed);
        let snapshot = manager.get_snapshot();
        assert_eq!(snapshot.access_token, "token-0");
        assert_eq!(snapshot.language.as_deref(), Some("en"));
        assert!(!snapshot.error);

        assert_eq!(manager.tick().await, RefreshOutcome::Fresh);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn token_inside_margin_is_refreshed() {
        // lifetime shorter than the margin: every tick refreshes
        let source = Arc::new(FakeSource::ok(500));
        let manager = SessionManager::new(source.clone(), config(1_000));

        assert_eq!(manager.tick().await, RefreshOutcome::Refreshed);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(manager.tick().await, RefreshOutcome::Refreshed);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn grant_that_does_not_extend_the_session_is_not_stored() {
        let expires_at = now_millis() + 500;
        let source = Arc::new(FixedSource {
            calls: AtomicUsize::new(0),
            expires_at,
        });
        let manager = SessionManager::new(source.clone(), config(1_000));

        assert_eq!(manager.tick().await, RefreshOutcome::Refreshed);
        assert_eq!(manager.tick().await, RefreshOutcome::Stale);
        assert_eq!(manager.refresh().await, RefreshOutcome::Stale);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        let snapshot = manager.get_snapshot();
        assert_eq!(snapshot.expires_at, expires_at);
        assert!(!snapshot.error);
    }

    #[tokio::test]
    async fn reset_waits_for_the_refresh_in_flight() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(FakeSource {
            gate: Some(gate.clone()),
            ..FakeSource::ok(60_000)
        });
        let manager = SessionManager::new(source.clone(), config(1_000));

        let refresh = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.tick().await })
        };
        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }
        let reset = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.reset().await })
        };
        tokio::task::yield_now().await;
        assert!(!reset.is_finished());

        gate.notify_one();
        assert_eq!(refresh.await.unwrap(), RefreshOutcome::Refreshed);
        reset.await.unwrap();
        assert_eq!(manager.get_snapshot().access_token, "");
    }

    #[tokio::test]
    async fn concurrent_ticks_start_exactly_one_refresh() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(FakeSource {
            gate: Some(gate.clone()),
            ..FakeSource::ok(60_000)
        });
        let manager = SessionManager::new(source.clone(), config(1_000));

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.tick().await })
        };
        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(manager.tick().await, RefreshOutcome::InFlight);
        assert_eq!(manager.refresh().await, RefreshOutcome::InFlight);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), RefreshOutcome::Refreshed);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failure_is_terminal_until_reset() {
        let source = Arc::new(FakeSource {
            fail_with: Some(401),
            ..FakeSource::ok(60_000)
        });
        let manager = SessionManager::new(source.clone(), config(1_000));

        assert_eq!(
            manager.tick().await,
            RefreshOutcome::Failed { status: Some(401) }
        );
        let snapshot = manager.get_snapshot();
        assert!(snapshot.error);
        assert_eq!(snapshot.access_token, "");
        assert_eq!(snapshot.status, Some(401));
        assert_eq!(snapshot.failure(), Some(crate::session::SessionFailure::Unauthorized));

        assert_eq!(manager.tick().await, RefreshOutcome::FailStopped);
        assert_eq!(manager.refresh().await, RefreshOutcome::FailStopped);
        assert_eq!(source.calls(), 1);

        manager.reset().await;
        assert!(!manager.get_snapshot().error);
        assert_eq!(
            manager.tick().await,
            RefreshOutcome::Failed { status: Some(401) }
        );
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn subscribers_observe_refreshes() {
        let source = Arc::new(FakeSource::ok(60_000));
        let manager = SessionManager::new(source, config(1_000));
        let mut changes = manager.subscribe();

        assert!(manager.start());
        changes.changed().await.unwrap();
        assert_eq!(changes.borrow().access_token, "token-0");
        assert_eq!(manager.access_token().as_deref(), Some("token-0"));
        manager.stop();
    }

    #[tokio::test]
    async fn start_is_idempotent_and_stop_cancels() {
        let source = Arc::new(FakeSource::ok(60_000));
        let manager = SessionManager::new(source.clone(), config(1_000));

        assert!(manager.start());
        assert!(!manager.start());
        assert!(manager.is_running());

        manager.stop();
        tokio::task::yield_now().await;
        assert!(!manager.is_running());

        let calls = source.calls();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn loop_stops_after_failure() {
        let source = Arc::new(FakeSource {
            fail_with: Some(500),
            ..FakeSource::ok(60_000)
        });
        let manager = SessionManager::new(source.clone(), config(1_000));
        let mut changes = manager.subscribe();

        manager.start();
        changes.changed().await.unwrap();
        assert!(changes.borrow().error);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(source.calls(), 1);
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn stopping_mid_fetch_leaves_state_untouched() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(FakeSource {
            gate: Some(gate.clone()),
            ..FakeSource::ok(60_000)
        });
        let manager = SessionManager::new(source.clone(), config(1_000));
        let before = manager.get_snapshot();

        manager.start();
        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }
        manager.stop();
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let after = manager.get_snapshot();
        assert_eq!(after.access_token, before.access_token);
        assert!(!after.error);
    }
}
