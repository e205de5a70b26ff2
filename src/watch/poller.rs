// The polling loop.
//
// One watcher per account per process. The loop only suspends on the fetch
// and on the inter-cycle sleep. Shutdown is a `watch` channel flipped to
// `true` by the binary's Ctrl-C handler; it is observed between cycles, so
// an in-flight fetch always finishes.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::detector::{detect, NewPostEvent, WatchState};
use crate::classify::account::{inspect_account, AccountReport};
use crate::classify::status::StatusFlag;
use crate::error::{ClassificationError, WatchError};
use crate::twitter::traits::PlatformClient;

/// Loop timing and sample size, resolved from config by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    pub interval: Duration,
    /// Posts fetched per cycle, also used for the start-time sensitivity sample.
    pub sample_size: usize,
}

/// Something the caller should surface.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    NewPost(NewPostEvent),
    /// The sampled timeline contains sensitive posts. Reported once per watch.
    SensitiveContent,
}

/// Sleep for `interval` unless shutdown is requested first.
/// Returns `true` when the caller should stop.
pub async fn sleep_or_shutdown(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    let signalled = tokio::select! {
        _ = &mut sleep => return false,
        signalled = async { shutdown.wait_for(|stop| *stop).await.is_ok() } => signalled,
    };

    if !signalled {
        // Sender gone: nobody can ask us to stop any more, finish the nap.
        sleep.await;
    }
    signalled
}

/// Forward the first interrupt to the shutdown flag, then wait for another.
///
/// Returns `true` when a second interrupt arrives: the user does not want to
/// wait for an in-flight request (rate-limit waits can run for minutes) and
/// the caller should exit at once. Returns `false` if no interrupt can be
/// received.
pub async fn relay_interrupts<F, Fut>(mut next_interrupt: F, shutdown: watch::Sender<bool>) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    info!("Interrupt received, stopping after the current cycle");
    let _ = shutdown.send(true);

    next_interrupt().await.is_ok()
}

/// Classify `handle`, retrying transient failures every `settings.interval`.
///
/// Returns `Ok(None)` if shutdown arrives while retrying. Rejected lookups
/// abort; banned and missing accounts come back as a report for the caller
/// to display before refusing to watch.
pub async fn classify_until_settled<P>(
    client: &P,
    handle: &str,
    settings: &WatchSettings,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<Option<AccountReport>, WatchError>
where
    P: PlatformClient + ?Sized,
{
    loop {
        match inspect_account(client, handle, settings.sample_size).await {
            Ok(report) => return Ok(Some(report)),
            Err(ClassificationError::Rejected(problem)) => {
                return Err(WatchError::Rejected {
                    handle: handle.to_string(),
                    problem,
                })
            }
            Err(e @ ClassificationError::Transient(_)) => {
                warn!(
                    handle = handle,
                    error = %e,
                    retry_secs = settings.interval.as_secs(),
                    "Classification failed, retrying"
                );
                if sleep_or_shutdown(settings.interval, shutdown).await {
                    return Ok(None);
                }
            }
        }
    }
}

/// Polls one account for new posts.
pub struct Watcher<'a, P: ?Sized> {
    client: &'a P,
    handle: String,
    user_id: String,
    settings: WatchSettings,
    state: WatchState,
    sensitive_reported: bool,
}

impl<'a, P> Watcher<'a, P>
where
    P: PlatformClient + ?Sized,
{
    /// Gate on the start-time classification. Banned and missing accounts
    /// are refused; the loop never runs for them.
    pub fn begin(
        client: &'a P,
        report: AccountReport,
        settings: WatchSettings,
    ) -> Result<Self, WatchError> {
        let handle = report.handle.clone();
        // The account display already mentioned a sensitive sample.
        let sensitive_reported = report.status.has(StatusFlag::Sensitive);
        let profile = report.into_watchable()?;

        info!(
            handle = %handle,
            user_id = %profile.id,
            interval_secs = settings.interval.as_secs(),
            "Starting watch"
        );

        Ok(Self {
            client,
            handle,
            user_id: profile.id,
            settings,
            state: WatchState::new(),
            sensitive_reported,
        })
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Run one cycle: fetch, detect, report.
    ///
    /// A failed fetch is logged and treated as an empty timeline.
    pub async fn poll_once(&mut self) -> Vec<WatchEvent> {
        let posts = match self
            .client
            .fetch_recent_posts(&self.user_id, self.settings.sample_size)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                warn!(handle = %self.handle, error = %e, "Post fetch failed; treating cycle as empty");
                Vec::new()
            }
        };

        let mut events = Vec::new();

        if !self.sensitive_reported && posts.iter().any(|p| p.sensitive) {
            self.sensitive_reported = true;
            events.push(WatchEvent::SensitiveContent);
        }

        if let Some(event) = detect(&mut self.state, &posts) {
            info!(handle = %self.handle, post_id = %event.post.id, "New post detected");
            events.push(WatchEvent::NewPost(event));
        } else {
            debug!(handle = %self.handle, fetched = posts.len(), "No new posts");
        }

        events
    }

    /// Poll until shutdown. Never fails: every error inside a cycle is
    /// logged and the loop carries on after the normal sleep.
    ///
    /// Returns the number of completed cycles.
    pub async fn run<F>(&mut self, shutdown: &mut watch::Receiver<bool>, mut on_event: F) -> u64
    where
        F: FnMut(&WatchEvent),
    {
        let mut cycles = 0u64;

        loop {
            if *shutdown.borrow() {
                break;
            }

            for event in self.poll_once().await {
                on_event(&event);
            }
            cycles += 1;

            if sleep_or_shutdown(self.settings.interval, shutdown).await {
                break;
            }
        }

        info!(handle = %self.handle, cycles = cycles, "Stopped watching");
        cycles
    }
}
